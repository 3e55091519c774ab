#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map configuration.
//!
//! The default configuration is a TOML file embedded at compile time.
//! A user file (given explicitly, or via `PARKING_MAP_CONFIG`) replaces it
//! wholesale. Every load is validated before it is handed out, so the
//! zone set, reference coordinate, and zoom range downstream are always
//! well-formed.

use std::path::{Path, PathBuf};

use parking_map_geography_models::{AllowedZones, LatLng, ZoneCodeError};
use parking_map_view_models::{MarkerIcon, ReferenceMarker, TileLayer, ZoneStyle};
use serde::{Deserialize, Serialize};

/// Environment variable naming a configuration file.
pub const CONFIG_ENV_VAR: &str = "PARKING_MAP_CONFIG";

/// Largest `$limit` the Socrata API accepts in one request.
pub const MAX_INCIDENT_LIMIT: u32 = 50_000;

const DEFAULT_TOML: &str = include_str!("../defaults/parking_map.toml");

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The configuration was not valid TOML for this schema.
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A zone code failed validation.
    #[error("Zone config error: {0}")]
    Zone(#[from] ZoneCodeError),

    /// A value was out of range or inconsistent.
    #[error("Invalid config: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },
}

/// Zone scope and polygon source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Zone codes that scope the incident query and the polygon overlay.
    pub codes: AllowedZones,
    /// `GeoJSON` property holding each polygon's zone code.
    pub property: String,
    /// Path or `http(s)` URL of the zone `GeoJSON` file.
    pub source: String,
}

/// Incident dataset query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentConfig {
    /// Socrata resource URL.
    pub api_url: String,
    /// Exact complaint type to select.
    pub complaint_type: String,
    /// Column holding the complaint type.
    pub complaint_column: String,
    /// Column holding the postal code.
    pub zip_column: String,
    /// Record cap per request.
    pub limit: u32,
}

/// The fixed reference location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceConfig {
    /// Place name.
    pub name: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Icon image URL.
    pub icon_url: String,
    /// CSS class for the icon.
    pub icon_class: String,
    /// Square icon size in pixels.
    pub icon_size: u32,
}

/// Base tile source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileConfig {
    /// URL template with `{z}`, `{x}`, `{y}` placeholders.
    pub url_template: String,
    /// Lowest zoom.
    pub min_zoom: u8,
    /// Highest zoom.
    pub max_zoom: u8,
    /// Attribution text.
    pub attribution: String,
}

/// Viewport and page options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Initial zoom level.
    pub zoom: u8,
    /// Group nearby incident markers into clusters.
    pub cluster_incidents: bool,
    /// Mount the reset-view control.
    pub reset_control: bool,
    /// Reset button icon URL.
    pub reset_icon_url: String,
    /// Height of the map container.
    pub map_height_px: u32,
}

/// Zone polygon style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneStyleConfig {
    /// CSS color.
    pub color: String,
    /// Stroke width in pixels.
    pub weight: u32,
    /// Fill opacity.
    pub fill_opacity: f64,
}

/// The complete map configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Page heading.
    pub title: String,
    /// Zone scope.
    pub zones: ZoneConfig,
    /// Incident query.
    pub incidents: IncidentConfig,
    /// Reference location.
    pub reference: ReferenceConfig,
    /// Base tiles.
    pub tiles: TileConfig,
    /// Viewport and page options.
    pub view: ViewConfig,
    /// Zone polygon style.
    pub zone_style: ZoneStyleConfig,
}

impl MapConfig {
    /// Returns the embedded default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is invalid. It is a compile-time
    /// constant covered by tests, so this indicates a development error.
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_toml_str(DEFAULT_TOML)
            .unwrap_or_else(|e| panic!("Embedded default config is invalid: {e}"))
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if parsing or validation fails.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or
    /// validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Loads configuration from `path`, else from the file named by
    /// [`CONFIG_ENV_VAR`], else the embedded default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a named file cannot be loaded.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            log::info!("Loading config from {}", path.display());
            return Self::from_file(path);
        }
        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR)
            && !env_path.is_empty()
        {
            log::info!("Loading config from {CONFIG_ENV_VAR}={env_path}");
            return Self::from_file(Path::new(&env_path));
        }
        log::debug!("Using embedded default config");
        Ok(Self::embedded())
    }

    /// Checks cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid { message });

        if self.title.trim().is_empty() {
            return invalid("title must not be empty".to_string());
        }
        if self.zones.property.trim().is_empty() {
            return invalid("zones.property must not be empty".to_string());
        }
        if self.zones.source.trim().is_empty() {
            return invalid("zones.source must not be empty".to_string());
        }
        if !self.incidents.api_url.starts_with("http://")
            && !self.incidents.api_url.starts_with("https://")
        {
            return invalid(format!(
                "incidents.api_url must be an http(s) URL, got {:?}",
                self.incidents.api_url
            ));
        }
        if self.incidents.complaint_type.is_empty()
            || self.incidents.complaint_column.is_empty()
            || self.incidents.zip_column.is_empty()
        {
            return invalid("incidents query fields must not be empty".to_string());
        }
        if self.incidents.limit == 0 || self.incidents.limit > MAX_INCIDENT_LIMIT {
            return invalid(format!(
                "incidents.limit must be in 1..={MAX_INCIDENT_LIMIT}, got {}",
                self.incidents.limit
            ));
        }
        if self.reference_coordinate().is_none() {
            return invalid("reference latitude/longitude must be finite".to_string());
        }
        if self.tiles.min_zoom > self.tiles.max_zoom {
            return invalid(format!(
                "tiles.min_zoom ({}) exceeds tiles.max_zoom ({})",
                self.tiles.min_zoom, self.tiles.max_zoom
            ));
        }
        if !(self.tiles.min_zoom..=self.tiles.max_zoom).contains(&self.view.zoom) {
            return invalid(format!(
                "view.zoom ({}) is outside the tile zoom range {}..={}",
                self.view.zoom, self.tiles.min_zoom, self.tiles.max_zoom
            ));
        }
        if !(0.0..=1.0).contains(&self.zone_style.fill_opacity) {
            return invalid(format!(
                "zone_style.fill_opacity must be in 0..=1, got {}",
                self.zone_style.fill_opacity
            ));
        }
        Ok(())
    }

    /// The reference coordinate, `None` if non-finite.
    #[must_use]
    pub fn reference_coordinate(&self) -> Option<LatLng> {
        LatLng::new(self.reference.latitude, self.reference.longitude)
    }

    /// The reference marker layer content.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the reference coordinate is not
    /// finite (only possible on an unvalidated config).
    pub fn reference_marker(&self) -> Result<ReferenceMarker, ConfigError> {
        let position = self
            .reference_coordinate()
            .ok_or_else(|| ConfigError::Invalid {
                message: "reference latitude/longitude must be finite".to_string(),
            })?;
        Ok(ReferenceMarker {
            name: self.reference.name.clone(),
            position,
            icon: MarkerIcon {
                url: self.reference.icon_url.clone(),
                class_name: self.reference.icon_class.clone(),
                size: self.reference.icon_size,
            },
        })
    }

    /// The base tile layer.
    #[must_use]
    pub fn tile_layer(&self) -> TileLayer {
        TileLayer {
            url_template: self.tiles.url_template.clone(),
            min_zoom: self.tiles.min_zoom,
            max_zoom: self.tiles.max_zoom,
            attribution: self.tiles.attribution.clone(),
        }
    }

    /// The zone polygon style.
    #[must_use]
    pub fn zone_style(&self) -> ZoneStyle {
        ZoneStyle {
            color: self.zone_style.color.clone(),
            weight: self.zone_style.weight,
            fill_opacity: self.zone_style.fill_opacity,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::embedded()
    }
}
