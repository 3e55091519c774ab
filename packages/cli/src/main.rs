#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the parking map.
//!
//! Renders the static page bundle, starts the server, or prints what the
//! configuration resolves to. Uses `indicatif-log-bridge` (via
//! [`parking_map_cli_utils::init_logger`]) so log lines and the progress
//! bar never fight for the terminal.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parking_map_config::MapConfig;
use parking_map_view::{
    PageOptions, load_view, page::copy_images, pipeline::incident_query, write_bundle,
};

#[derive(Parser)]
#[command(
    name = "parking_map",
    about = "Illegal parking map for NYC 311 data",
    after_help = "Zone polygons are not bundled. `render` and `serve` read a ZCTA GeoJSON \
                  FeatureCollection from `[zones] source` in the config (default \
                  `data/zip-code.json`); point it at a local file or an http(s) URL."
)]
struct Cli {
    /// TOML config file (defaults to `PARKING_MAP_CONFIG`, then the
    /// embedded config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch zones and incidents and write the static page bundle
    Render {
        /// Output directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,

        /// Directory of icons copied to `<output>/images`
        #[arg(long, default_value = parking_map_server::DEFAULT_IMAGES_DIR)]
        images: PathBuf,
    },
    /// Start the HTTP server
    Serve,
    /// Print the configured zone codes
    Zones,
    /// Print the incident query URL without fetching
    Query,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = parking_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = MapConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Render { output, images } => {
            let progress =
                parking_map_cli_utils::IndicatifProgress::steps_bar(&multi, "Loading map data");
            let client = reqwest::Client::new();
            let view = load_view(&config, &client, progress).await?;

            write_bundle(&view, PageOptions::from_config(&config), &output)?;
            let copied = copy_images(&images, &output)?;
            log::info!("Copied {copied} images to {}", output.join("images").display());
        }
        Commands::Serve => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new().block_on(parking_map_server::run_server(config))
            })
            .await??;
        }
        Commands::Zones => {
            for code in &config.zones.codes {
                println!("{code}");
            }
        }
        Commands::Query => {
            println!("{}", incident_query(&config).url()?);
        }
    }

    Ok(())
}
