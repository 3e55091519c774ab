//! HTTP handler functions for the parking map.

use actix_web::{HttpResponse, http::header::ContentType, web};
use parking_map_server_models::{ApiError, ApiHealth};

use crate::AppState;

/// `GET /`
pub async fn index(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(state.page.clone())
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/view`
///
/// Returns the full composed view: viewport, layers, and controls.
pub async fn view(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&state.view)
}

/// `GET /api/zones`
///
/// Returns the filtered zone polygons as a `GeoJSON` `FeatureCollection`.
pub async fn zones(state: web::Data<AppState>) -> HttpResponse {
    match state.view.zones() {
        Some(features) => HttpResponse::Ok().json(features),
        None => {
            log::warn!("Composed view has no zone layer");
            HttpResponse::NotFound().json(ApiError::new("No zone layer"))
        }
    }
}

/// `GET /api/incidents`
///
/// Returns the incident markers as a `GeoJSON` `FeatureCollection` of
/// points.
pub async fn incidents(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&state.incidents)
}
