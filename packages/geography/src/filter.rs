//! Zone-code filtering of `GeoJSON` features.

use geojson::FeatureCollection;
use parking_map_geography_models::{AllowedZones, ZoneFeature};

/// Wraps every feature of a collection, reading each zone code from
/// `property`.
#[must_use]
pub fn zone_features(collection: FeatureCollection, property: &str) -> Vec<ZoneFeature> {
    collection
        .features
        .into_iter()
        .map(|feature| ZoneFeature::from_feature(feature, property))
        .collect()
}

/// Keeps the features whose zone code is a member of `zones`.
///
/// Features without a zone code are dropped. Relative order is preserved,
/// and filtering an already-filtered list is a no-op.
#[must_use]
pub fn filter_zones(
    zones: &AllowedZones,
    features: impl IntoIterator<Item = ZoneFeature>,
) -> Vec<ZoneFeature> {
    features
        .into_iter()
        .filter(|feature| feature.code().is_some_and(|code| zones.contains(code)))
        .collect()
}

/// Rebuilds a `FeatureCollection` from zone features, for output.
#[must_use]
pub fn to_feature_collection(features: &[ZoneFeature]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: features.iter().map(|f| f.feature().clone()).collect(),
        foreign_members: None,
    }
}
