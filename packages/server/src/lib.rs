#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the parking map.
//!
//! The map view is loaded once at startup and shared read-only between
//! workers. A failed zone or incident fetch aborts startup. Serves the
//! rendered page at `/`, the view and its layers under `/api`, and the
//! marker icons under `/images`.

mod handlers;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use geojson::FeatureCollection;
use parking_map_config::MapConfig;
use parking_map_source::progress::log_progress;
use parking_map_view::{
    PageOptions, ViewError, load_view, page::markers_to_feature_collection, render_page,
};
use parking_map_view_models::ComposedView;

/// Directory served under `/images` unless `IMAGES_DIR` is set.
pub const DEFAULT_IMAGES_DIR: &str = "assets/images";

/// Errors that can stop the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The map view could not be loaded or rendered.
    #[error("Failed to load map view: {0}")]
    View(#[from] ViewError),

    /// Binding or running the HTTP server failed.
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// The composed map view.
    pub view: ComposedView,
    /// Pre-rendered HTML page.
    pub page: String,
    /// Incident markers as `GeoJSON` points.
    pub incidents: FeatureCollection,
}

impl AppState {
    /// Pre-renders everything the handlers serve.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError`] if the page cannot be rendered.
    pub fn new(view: ComposedView, options: PageOptions) -> Result<Self, ViewError> {
        let page = render_page(&view, options)?;
        let incidents = markers_to_feature_collection(view.markers());
        Ok(Self {
            view,
            page,
            incidents,
        })
    }
}

/// Registers the page and API routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index)).service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/view", web::get().to(handlers::view))
            .route("/zones", web::get().to(handlers::zones))
            .route("/incidents", web::get().to(handlers::incidents)),
    );
}

/// Loads the map view and starts the HTTP server.
///
/// Bind address and port come from `BIND_ADDR` and `PORT` (default
/// `127.0.0.1:8080`). This is a regular async function; the caller
/// provides the actix runtime.
///
/// # Errors
///
/// Returns [`ServerError`] if the view cannot be loaded or the server
/// fails to bind or run.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: MapConfig) -> Result<(), ServerError> {
    log::info!("Loading map data...");
    let client = reqwest::Client::new();
    let view = load_view(&config, &client, log_progress()).await?;

    let state = web::Data::new(AppState::new(view, PageOptions::from_config(&config))?);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let images_dir =
        std::env::var("IMAGES_DIR").unwrap_or_else(|_| DEFAULT_IMAGES_DIR.to_string());

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
            .service(Files::new("/images", &images_dir))
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}
