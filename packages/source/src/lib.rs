#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident and zone polygon fetching.
//!
//! Incidents come from the NYC 311 Socrata dataset, filtered server-side
//! by complaint type and zip code. Zone polygons come from a static
//! `GeoJSON` file on disk or behind a URL. Neither fetch is retried: a
//! failure surfaces as a [`FetchError`] and no partial data is returned.

pub mod progress;
pub mod socrata;
pub mod zones;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_server;

/// Errors that can occur while fetching source data.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Request to {url} failed with status {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status.
        status: reqwest::StatusCode,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (local file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A request URL could not be built.
    #[error("Invalid URL {url:?}: {message}")]
    InvalidUrl {
        /// The URL that failed to parse.
        url: String,
        /// Parser message.
        message: String,
    },

    /// The zone document was not a `GeoJSON` `FeatureCollection`.
    #[error("Invalid GeoJSON: {message}")]
    InvalidGeoJson {
        /// Description of what went wrong.
        message: String,
    },
}

/// GETs `url` and returns the body, failing on any non-success status.
///
/// # Errors
///
/// Returns [`FetchError`] if the request fails or the status is not 2xx.
pub async fn get_text(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }
    Ok(resp.text().await?)
}
