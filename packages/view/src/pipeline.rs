//! End-to-end view loading: fetch, filter, build, compose.

use std::sync::Arc;

use parking_map_config::MapConfig;
use parking_map_geography::filter_zones;
use parking_map_source::{
    progress::ProgressCallback,
    socrata::{IncidentFetcher, IncidentQuery},
    zones::{ZoneSource, load_zones},
};
use parking_map_view_models::ComposedView;

use crate::{ViewError, compose::MapComposer, markers::build_markers};

/// Builds the incident query described by `config`.
#[must_use]
pub fn incident_query(config: &MapConfig) -> IncidentQuery {
    IncidentQuery {
        api_url: config.incidents.api_url.clone(),
        complaint_column: config.incidents.complaint_column.clone(),
        complaint_type: config.incidents.complaint_type.clone(),
        zip_column: config.incidents.zip_column.clone(),
        zones: config.zones.codes.clone(),
        limit: config.incidents.limit,
    }
}

/// Loads zones and incidents and composes the map view.
///
/// Zones are loaded first, then incidents; the two fetches run in
/// sequence. Any fetch failure aborts the load and nothing is composed.
///
/// # Errors
///
/// Returns [`ViewError`] if either fetch fails or the configuration
/// cannot be turned into a composer.
pub async fn load_view(
    config: &MapConfig,
    client: &reqwest::Client,
    progress: Arc<dyn ProgressCallback>,
) -> Result<ComposedView, ViewError> {
    let composer = MapComposer::from_config(config)?;
    progress.set_total(3);

    progress.set_message("Loading zone polygons".to_string());
    let source = ZoneSource::parse(&config.zones.source);
    let zones = load_zones(client, &source, &config.zones.property).await?;
    progress.inc(1);

    progress.set_message("Fetching incidents".to_string());
    let fetcher = IncidentFetcher::new(client.clone(), incident_query(config));
    let incidents = fetcher.fetch().await?;
    progress.inc(1);

    progress.set_message("Building map layers".to_string());
    let total_zones = zones.len();
    let zones = filter_zones(&config.zones.codes, zones);
    log::info!("Kept {}/{total_zones} zone features", zones.len());

    let markers = build_markers(&incidents);
    log::info!(
        "Built {}/{} incident markers",
        markers.len(),
        incidents.len()
    );

    let view = composer.compose(&zones, markers);
    progress.inc(1);
    progress.finish(format!(
        "Composed map with {} zones and {} markers",
        zones.len(),
        view.markers().len()
    ));

    Ok(view)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use parking_map_source::{FetchError, progress::null_progress, test_server::serve_once};

    const ZONES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"zcta": "10001"},
             "geometry": {"type": "Polygon", "coordinates": [[[-74.0, 40.7], [-73.9, 40.7], [-73.9, 40.8], [-74.0, 40.7]]]}},
            {"type": "Feature", "properties": {"zcta": "10002"},
             "geometry": {"type": "Polygon", "coordinates": [[[-74.0, 40.6], [-73.9, 40.6], [-73.9, 40.7], [-74.0, 40.6]]]}},
            {"type": "Feature", "properties": {"zcta": "10011"},
             "geometry": {"type": "Polygon", "coordinates": [[[-74.0, 40.5], [-73.9, 40.5], [-73.9, 40.6], [-74.0, 40.5]]]}}
        ]
    }"#;

    const INCIDENTS: &str = r#"[
        {"agency_name": "NYPD", "descriptor": "Blocked Hydrant",
         "created_date": "2024-01-15T14:30:00.000", "incident_zip": "10011",
         "location": {"latitude": "40.7", "longitude": "-73.9"}},
        {"agency_name": "NYPD", "descriptor": "Double Parked", "incident_zip": "10001"}
    ]"#;

    fn config_for(base: &str, zones_file: &str) -> MapConfig {
        let path = std::env::temp_dir().join(zones_file);
        std::fs::write(&path, ZONES).unwrap();

        let mut config = MapConfig::embedded();
        config.zones.source = path.to_string_lossy().into_owned();
        config.incidents.api_url = format!("{base}/resource/erm2-nwe9.json");
        config
    }

    #[derive(Default)]
    struct Recording {
        messages: Mutex<Vec<String>>,
    }

    impl ProgressCallback for Recording {
        fn set_total(&self, _total: u64) {}
        fn inc(&self, _delta: u64) {}
        fn set_message(&self, msg: String) {
            self.messages.lock().unwrap().push(msg);
        }
        fn finish(&self, msg: String) {
            self.messages.lock().unwrap().push(msg);
        }
    }

    #[test]
    fn query_follows_config() {
        let config = MapConfig::embedded();
        let query = incident_query(&config);

        assert_eq!(query.limit, 100);
        assert_eq!(query.zones.len(), 11);
        assert!(query.where_clause().contains("'Illegal Parking'"));
    }

    #[tokio::test]
    async fn composes_filtered_view() {
        let (base, _request) = serve_once("200 OK", INCIDENTS).await;
        let config = config_for(&base, "parking_map_pipeline_zones.json");
        let progress = Arc::new(Recording::default());

        let view = load_view(&config, &reqwest::Client::new(), progress.clone())
            .await
            .unwrap();

        let codes: Vec<_> = view
            .zones()
            .unwrap()
            .features
            .iter()
            .filter_map(|f| f.property("zcta").and_then(serde_json::Value::as_str))
            .collect();
        assert_eq!(codes, vec!["10001", "10011"]);

        assert_eq!(view.markers().len(), 1);
        assert!(view.markers()[0].popup.text().contains("NYPD"));
        assert!((view.viewport.center.latitude - 40.735_972_8).abs() < 1e-9);
        assert!((view.viewport.center.longitude - -73.995_785_1).abs() < 1e-9);

        let messages = progress.messages.lock().unwrap();
        assert_eq!(messages.first().map(String::as_str), Some("Loading zone polygons"));
        assert!(messages.last().unwrap().contains("1 markers"));
    }

    #[tokio::test]
    async fn failed_incident_fetch_aborts() {
        let (base, _request) = serve_once("500 Internal Server Error", "").await;
        let config = config_for(&base, "parking_map_pipeline_zones_500.json");

        let result = load_view(&config, &reqwest::Client::new(), null_progress()).await;
        assert!(matches!(
            result,
            Err(ViewError::Fetch(FetchError::Status { .. }))
        ));
    }

    #[tokio::test]
    async fn missing_zone_file_aborts_before_fetch() {
        let mut config = MapConfig::embedded();
        config.zones.source = std::env::temp_dir()
            .join("parking_map_pipeline_missing.json")
            .to_string_lossy()
            .into_owned();
        config.incidents.api_url = "http://127.0.0.1:9/never".to_string();

        let result = load_view(&config, &reqwest::Client::new(), null_progress()).await;
        assert!(matches!(result, Err(ViewError::Fetch(FetchError::Io(_)))));
    }
}
