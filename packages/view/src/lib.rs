#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Builds the illegal-parking map from fetched data.
//!
//! Incidents become markers, zone polygons are filtered to the configured
//! codes, and everything is stacked into a [`ComposedView`] centered on
//! the reference location. The view can then be rendered to a static
//! Leaflet page or served as JSON.
//!
//! [`ComposedView`]: parking_map_view_models::ComposedView

pub mod compose;
pub mod controls;
pub mod markers;
pub mod page;
pub mod pipeline;

use std::path::PathBuf;

use parking_map_config::ConfigError;
use parking_map_source::FetchError;

pub use compose::MapComposer;
pub use controls::{MapControl, ResetControl};
pub use markers::build_markers;
pub use page::{PageOptions, render_page, write_bundle};
pub use pipeline::load_view;

/// Errors that can occur while loading or writing the map view.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// Zone or incident fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Configuration could not be turned into a view.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Output serialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing an output file failed.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Path being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
