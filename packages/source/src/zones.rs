//! Zone polygon loader.
//!
//! Reads a `GeoJSON` `FeatureCollection` from a local path or an
//! `http(s)` URL and wraps each feature as a [`ZoneFeature`].

use std::path::{Path, PathBuf};

use geojson::{FeatureCollection, GeoJson};
use parking_map_geography_models::ZoneFeature;

use crate::{FetchError, get_text};

/// Where the zone document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneSource {
    /// Local file.
    Path(PathBuf),
    /// Remote document.
    Url(String),
}

impl ZoneSource {
    /// Interprets `location` as a URL if it has an `http(s)` scheme, else
    /// as a path.
    #[must_use]
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::Path(PathBuf::from(location))
        }
    }
}

impl std::fmt::Display for ZoneSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Explains how to supply a zone file that could not be found.
#[must_use]
pub fn missing_file_hint(path: &Path) -> String {
    format!(
        "Zone file {} not found. Zone polygons are not bundled; download a \
         ZCTA GeoJSON FeatureCollection to that path or set `[zones] source` \
         in the config to a file or http(s) URL",
        path.display()
    )
}

/// Parses a `GeoJSON` document into zone features.
///
/// # Errors
///
/// Returns [`FetchError::InvalidGeoJson`] if the document is not valid
/// `GeoJSON` or is not a `FeatureCollection`.
pub fn parse_zones(body: &str, property: &str) -> Result<Vec<ZoneFeature>, FetchError> {
    let geojson: GeoJson = body.parse().map_err(|e: geojson::Error| FetchError::InvalidGeoJson {
        message: e.to_string(),
    })?;
    let collection =
        FeatureCollection::try_from(geojson).map_err(|e| FetchError::InvalidGeoJson {
            message: format!("expected a FeatureCollection: {e}"),
        })?;
    Ok(parking_map_geography::zone_features(collection, property))
}

/// Loads every zone feature from `source`, reading codes from `property`.
///
/// # Errors
///
/// Returns [`FetchError`] if the document cannot be read or is not a
/// `GeoJSON` `FeatureCollection`.
pub async fn load_zones(
    client: &reqwest::Client,
    source: &ZoneSource,
    property: &str,
) -> Result<Vec<ZoneFeature>, FetchError> {
    log::info!("Loading zone polygons from {source}");

    let body = match source {
        ZoneSource::Path(path) => match tokio::fs::read_to_string(path).await {
            Ok(body) => body,
            Err(e) => {
                if e.kind() == std::io::ErrorKind::NotFound {
                    log::error!("{}", missing_file_hint(path));
                }
                return Err(e.into());
            }
        },
        ZoneSource::Url(url) => get_text(client, url).await?,
    };
    let features = parse_zones(&body, property)?;

    log::info!("Loaded {} zone features", features.len());
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::serve_once;

    const ZONES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"zcta": "10001"},
             "geometry": {"type": "Polygon", "coordinates": [[[-74.0, 40.7], [-73.9, 40.7], [-73.9, 40.8], [-74.0, 40.7]]]}},
            {"type": "Feature", "properties": {"zcta": "10002"},
             "geometry": {"type": "Polygon", "coordinates": [[[-74.0, 40.6], [-73.9, 40.6], [-73.9, 40.7], [-74.0, 40.6]]]}}
        ]
    }"#;

    #[test]
    fn parses_source_kind() {
        assert_eq!(
            ZoneSource::parse("data/zip-code.json"),
            ZoneSource::Path(PathBuf::from("data/zip-code.json"))
        );
        assert_eq!(
            ZoneSource::parse("https://example.com/zips.geojson"),
            ZoneSource::Url("https://example.com/zips.geojson".to_string())
        );
    }

    #[test]
    fn parses_feature_collection() {
        let zones = parse_zones(ZONES, "zcta").unwrap();
        let codes: Vec<_> = zones.iter().filter_map(ZoneFeature::code).collect();
        assert_eq!(codes, vec!["10001", "10002"]);
    }

    #[test]
    fn rejects_non_collection() {
        let point = r#"{"type": "Point", "coordinates": [-73.9, 40.7]}"#;
        assert!(matches!(
            parse_zones(point, "zcta"),
            Err(FetchError::InvalidGeoJson { .. })
        ));
        assert!(matches!(
            parse_zones("not json", "zcta"),
            Err(FetchError::InvalidGeoJson { .. })
        ));
    }

    #[tokio::test]
    async fn loads_from_file() {
        let path = std::env::temp_dir().join("parking_map_zones_test.json");
        std::fs::write(&path, ZONES).unwrap();

        let zones = load_zones(&reqwest::Client::new(), &ZoneSource::Path(path.clone()), "zcta")
            .await
            .unwrap();
        assert_eq!(zones.len(), 2);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("parking_map_zones_missing.json");
        let _ = std::fs::remove_file(&path);

        let result = load_zones(&reqwest::Client::new(), &ZoneSource::Path(path), "zcta").await;
        assert!(matches!(
            result,
            Err(FetchError::Io(ref e)) if e.kind() == std::io::ErrorKind::NotFound
        ));
    }

    #[test]
    fn missing_file_hint_names_path_and_setting() {
        let hint = missing_file_hint(Path::new("data/zip-code.json"));
        assert!(hint.contains("data/zip-code.json"));
        assert!(hint.contains("[zones] source"));
    }

    #[tokio::test]
    async fn loads_from_url() {
        let (base, _request) = serve_once("200 OK", ZONES).await;
        let zones = load_zones(
            &reqwest::Client::new(),
            &ZoneSource::Url(format!("{base}/zip-code.json")),
            "zcta",
        )
        .await
        .unwrap();
        assert_eq!(zones.len(), 2);
    }

    #[tokio::test]
    async fn url_not_found_is_status_error() {
        let (base, _request) = serve_once("404 Not Found", "").await;
        let result = load_zones(
            &reqwest::Client::new(),
            &ZoneSource::Url(format!("{base}/zip-code.json")),
            "zcta",
        )
        .await;
        assert!(matches!(result, Err(FetchError::Status { .. })));
    }
}
