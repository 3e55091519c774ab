#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone entry point for the parking map server.
//!
//! Reads configuration from `PARKING_MAP_CONFIG` (or the embedded
//! default), loads the map view, and serves it.

use parking_map_config::MapConfig;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = MapConfig::load(None)?;
    parking_map_server::run_server(config).await?;

    Ok(())
}
