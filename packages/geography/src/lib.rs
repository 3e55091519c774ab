#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zone polygon filtering and `GeoJSON` layer assembly.
//!
//! The zone `GeoJSON` file covers every ZCTA in the city; only the
//! polygons whose code is in the configured [`AllowedZones`] are drawn.

pub mod filter;

pub use filter::{filter_zones, to_feature_collection, zone_features};
pub use parking_map_geography_models::{AllowedZones, ZoneFeature};
