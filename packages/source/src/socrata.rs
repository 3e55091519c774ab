//! NYC 311 Socrata incident fetcher.
//!
//! Issues a single SODA request using the `$where` and `$limit` query
//! parameters. There is no pagination: the service drops anything past
//! `$limit`.
//!
//! Dataset: <https://data.cityofnewyork.us/resource/erm2-nwe9>

use parking_map_geography_models::AllowedZones;
use parking_map_incident_models::Incident;

use crate::{FetchError, get_text};

/// Quotes a SoQL string literal, doubling embedded single quotes.
#[must_use]
pub fn soql_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// What to ask the dataset for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentQuery {
    /// Resource URL (e.g. `"https://data.cityofnewyork.us/resource/erm2-nwe9.json"`).
    pub api_url: String,
    /// Column holding the complaint type.
    pub complaint_column: String,
    /// Exact complaint type to select (e.g. `"Illegal Parking"`).
    pub complaint_type: String,
    /// Column holding the postal code.
    pub zip_column: String,
    /// Postal codes to select.
    pub zones: AllowedZones,
    /// Record cap.
    pub limit: u32,
}

impl IncidentQuery {
    /// Builds the `$where` expression, e.g.
    /// `complaint_type = 'Illegal Parking' AND incident_zip IN ('10001', '10003')`.
    #[must_use]
    pub fn where_clause(&self) -> String {
        let zips = self
            .zones
            .iter()
            .map(|z| soql_quote(z.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{} = {} AND {} IN ({zips})",
            self.complaint_column,
            soql_quote(&self.complaint_type),
            self.zip_column,
        )
    }

    /// Builds the full request URL with encoded query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if `api_url` does not parse.
    pub fn url(&self) -> Result<reqwest::Url, FetchError> {
        let limit = self.limit.to_string();
        reqwest::Url::parse_with_params(
            &self.api_url,
            &[("$where", self.where_clause().as_str()), ("$limit", limit.as_str())],
        )
        .map_err(|e| FetchError::InvalidUrl {
            url: self.api_url.clone(),
            message: e.to_string(),
        })
    }
}

/// Fetches incident records for an [`IncidentQuery`].
#[derive(Debug, Clone)]
pub struct IncidentFetcher {
    client: reqwest::Client,
    query: IncidentQuery,
}

impl IncidentFetcher {
    /// Creates a fetcher sharing `client`'s connection pool.
    #[must_use]
    pub const fn new(client: reqwest::Client, query: IncidentQuery) -> Self {
        Self { client, query }
    }

    /// The query this fetcher issues.
    #[must_use]
    pub const fn query(&self) -> &IncidentQuery {
        &self.query
    }

    /// Requests the incidents.
    ///
    /// The whole body is read and parsed before anything is returned, so a
    /// failure never yields a partial list. Array elements that are not
    /// record objects are skipped; wrong-typed fields inside a record are
    /// left for [`Incident::coordinate`] to report.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the request fails, the status is not 2xx,
    /// or the body is not a JSON array.
    pub async fn fetch(&self) -> Result<Vec<Incident>, FetchError> {
        let url = self.query.url()?;
        log::info!(
            "Fetching up to {} '{}' incidents in {} zones",
            self.query.limit,
            self.query.complaint_type,
            self.query.zones.len()
        );
        log::debug!("Incident query URL: {url}");

        let body = get_text(&self.client, url.as_str()).await?;
        let records: Vec<serde_json::Value> = serde_json::from_str(&body)?;
        let total = records.len();

        let incidents: Vec<Incident> = records
            .into_iter()
            .enumerate()
            .filter_map(|(i, record)| match serde_json::from_value(record) {
                Ok(incident) => Some(incident),
                Err(e) => {
                    log::warn!("Skipping incident record {i}: {e}");
                    None
                }
            })
            .collect();

        log::info!("Fetched {}/{total} incident records", incidents.len());
        Ok(incidents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::serve_once;

    fn query(api_url: &str, zones: &[&str]) -> IncidentQuery {
        IncidentQuery {
            api_url: api_url.to_string(),
            complaint_column: "complaint_type".to_string(),
            complaint_type: "Illegal Parking".to_string(),
            zip_column: "incident_zip".to_string(),
            zones: AllowedZones::parse(zones).unwrap(),
            limit: 100,
        }
    }

    #[test]
    fn quotes_literals() {
        assert_eq!(soql_quote("10001"), "'10001'");
        assert_eq!(soql_quote("O'Brien"), "'O''Brien'");
    }

    #[test]
    fn builds_where_clause() {
        let q = query("https://example.com/r.json", &["10001", "10003"]);
        assert_eq!(
            q.where_clause(),
            "complaint_type = 'Illegal Parking' AND incident_zip IN ('10001', '10003')"
        );
    }

    #[test]
    fn builds_encoded_url() {
        let q = query("https://data.cityofnewyork.us/resource/erm2-nwe9.json", &["10001"]);
        let url = q.url().unwrap();
        assert_eq!(url.host_str(), Some("data.cityofnewyork.us"));
        assert_eq!(url.path(), "/resource/erm2-nwe9.json");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                (
                    "$where".to_string(),
                    "complaint_type = 'Illegal Parking' AND incident_zip IN ('10001')".to_string()
                ),
                ("$limit".to_string(), "100".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_unparseable_api_url() {
        let q = query("not a url", &["10001"]);
        assert!(matches!(q.url(), Err(FetchError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn fetches_and_parses_records() {
        let (base, request) = serve_once(
            "200 OK",
            r#"[
                {"agency_name": "NYPD", "descriptor": "Blocked Hydrant",
                 "latitude": "40.7", "longitude": "-73.9"},
                {"agency_name": "NYPD", "descriptor": "Double Parked"}
            ]"#,
        )
        .await;

        let fetcher = IncidentFetcher::new(
            reqwest::Client::new(),
            query(&format!("{base}/resource/erm2-nwe9.json"), &["10001"]),
        );
        let incidents = fetcher.fetch().await.unwrap();

        assert_eq!(incidents.len(), 2);
        assert!(incidents[0].coordinate().is_ok());
        assert!(incidents[1].coordinate().is_err());

        let head = request.await.unwrap();
        assert!(head.starts_with("GET /resource/erm2-nwe9.json?%24where="));
        assert!(head.contains("%24limit=100"));
    }

    #[tokio::test]
    async fn wrong_typed_record_is_kept_without_coordinate() {
        let (base, _request) = serve_once(
            "200 OK",
            r#"[
                {"agency_name": "NYPD", "latitude": "40.7", "longitude": "-73.9"},
                {"agency_name": "NYPD", "location": "POINT (-73.9 40.7)"},
                {"agency_name": "NYPD", "latitude": true, "longitude": "-73.9"},
                "not a record"
            ]"#,
        )
        .await;
        let fetcher = IncidentFetcher::new(reqwest::Client::new(), query(&base, &["10001"]));

        let incidents = fetcher.fetch().await.unwrap();
        assert_eq!(incidents.len(), 3);
        let located = incidents.iter().filter(|i| i.coordinate().is_ok()).count();
        assert_eq!(located, 1);
    }

    #[tokio::test]
    async fn non_success_status_is_error() {
        let (base, _request) = serve_once("500 Internal Server Error", "[]").await;
        let fetcher = IncidentFetcher::new(reqwest::Client::new(), query(&base, &["10001"]));

        let err = fetcher.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status, .. } if status.as_u16() == 500));
    }

    #[tokio::test]
    async fn malformed_json_is_error() {
        let (base, _request) = serve_once("200 OK", r#"[{"agency_name": "NYPD"},"#).await;
        let fetcher = IncidentFetcher::new(reqwest::Client::new(), query(&base, &["10001"]));

        assert!(matches!(
            fetcher.fetch().await,
            Err(FetchError::Json(_))
        ));
    }

    #[tokio::test]
    async fn non_array_json_is_error() {
        let (base, _request) =
            serve_once("200 OK", r#"{"error": true, "message": "bad query"}"#).await;
        let fetcher = IncidentFetcher::new(reqwest::Client::new(), query(&base, &["10001"]));

        assert!(matches!(
            fetcher.fetch().await,
            Err(FetchError::Json(_))
        ));
    }
}
