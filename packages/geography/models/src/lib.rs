#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zone code, coordinate, and zone polygon types.
//!
//! These types describe the geographic scope of the parking map: the set
//! of zone codes that bounds both the incident query and the polygon
//! overlay, the coordinates markers are placed at, and the zone polygons
//! read from the static `GeoJSON` file.

pub mod zone;

use serde::{Deserialize, Serialize};

pub use zone::{AllowedZones, DEFAULT_ZONE_CODES, ZoneCode, ZoneCodeError};

/// A WGS84 coordinate. Both components are always finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatLng {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl LatLng {
    /// Creates a coordinate, returning `None` if either component is NaN
    /// or infinite.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        (latitude.is_finite() && longitude.is_finite()).then_some(Self {
            latitude,
            longitude,
        })
    }

    /// Returns the coordinate as `[lng, lat]`, the `GeoJSON` position order.
    #[must_use]
    pub const fn to_position(self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

/// One polygon record from the zone `GeoJSON` file.
///
/// The zone code is decoded once when the feature is read; a feature whose
/// code property is missing (or is neither a string nor an integer) keeps
/// `code == None` and is never matched by a zone filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneFeature {
    code: Option<String>,
    feature: geojson::Feature,
}

impl ZoneFeature {
    /// Wraps a `GeoJSON` feature, reading its zone code from `property`.
    #[must_use]
    pub fn from_feature(feature: geojson::Feature, property: &str) -> Self {
        let code = feature.property(property).and_then(|value| match value {
            serde_json::Value::String(s) => Some(s.trim().to_string()),
            serde_json::Value::Number(n) => n.as_u64().map(|n| format!("{n:05}")),
            _ => None,
        });
        Self { code, feature }
    }

    /// The feature's zone code, if present.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// The underlying `GeoJSON` feature.
    #[must_use]
    pub const fn feature(&self) -> &geojson::Feature {
        &self.feature
    }

    /// Consumes the wrapper, returning the underlying feature.
    #[must_use]
    pub fn into_feature(self) -> geojson::Feature {
        self.feature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature_with(properties: serde_json::Value) -> geojson::Feature {
        geojson::Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: properties.as_object().cloned(),
            foreign_members: None,
        }
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        assert!(LatLng::new(40.7, -73.9).is_some());
        assert!(LatLng::new(f64::NAN, -73.9).is_none());
        assert!(LatLng::new(40.7, f64::INFINITY).is_none());
    }

    #[test]
    fn position_is_lng_lat() {
        let p = LatLng::new(40.7, -73.9).unwrap().to_position();
        assert!((p[0] - -73.9).abs() < f64::EPSILON);
        assert!((p[1] - 40.7).abs() < f64::EPSILON);
    }

    #[test]
    fn reads_string_zone_code() {
        let zone = ZoneFeature::from_feature(
            feature_with(serde_json::json!({ "zcta": "10001" })),
            "zcta",
        );
        assert_eq!(zone.code(), Some("10001"));
    }

    #[test]
    fn reads_numeric_zone_code() {
        let zone =
            ZoneFeature::from_feature(feature_with(serde_json::json!({ "zcta": 10001 })), "zcta");
        assert_eq!(zone.code(), Some("10001"));
    }

    #[test]
    fn missing_zone_code_is_none() {
        let zone = ZoneFeature::from_feature(
            feature_with(serde_json::json!({ "name": "Chelsea" })),
            "zcta",
        );
        assert_eq!(zone.code(), None);

        let no_props = ZoneFeature::from_feature(
            geojson::Feature {
                bbox: None,
                geometry: None,
                id: None,
                properties: None,
                foreign_members: None,
            },
            "zcta",
        );
        assert_eq!(no_props.code(), None);
    }
}
