//! Map composition.
//!
//! Stacks the layers in a fixed order (tiles, zones, incidents, reference
//! marker; later paints on top) and centers the viewport on the reference
//! location.

use parking_map_config::{ConfigError, MapConfig};
use parking_map_geography::to_feature_collection;
use parking_map_geography_models::ZoneFeature;
use parking_map_view_models::{
    ComposedView, MapLayer, Marker, ReferenceMarker, TileLayer, Viewport, ZoneStyle,
};

use crate::controls::{MapControl, ResetControl};

/// Assembles layers and controls into a [`ComposedView`].
pub struct MapComposer {
    title: String,
    tiles: TileLayer,
    reference: ReferenceMarker,
    zoom: u8,
    zone_style: ZoneStyle,
    cluster_incidents: bool,
    controls: Vec<Box<dyn MapControl>>,
}

impl MapComposer {
    /// Creates a composer. `zoom` is clamped into the tile layer's range.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        tiles: TileLayer,
        reference: ReferenceMarker,
        zoom: u8,
    ) -> Self {
        let clamped = zoom.clamp(tiles.min_zoom, tiles.max_zoom.max(tiles.min_zoom));
        if clamped != zoom {
            log::warn!(
                "Zoom {zoom} outside tile range {}..={}, using {clamped}",
                tiles.min_zoom,
                tiles.max_zoom
            );
        }
        Self {
            title: title.into(),
            tiles,
            reference,
            zoom: clamped,
            zone_style: ZoneStyle::default(),
            cluster_incidents: false,
            controls: Vec::new(),
        }
    }

    /// Builds a composer from configuration, mounting the reset control
    /// when enabled.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the reference coordinate is invalid.
    pub fn from_config(config: &MapConfig) -> Result<Self, ConfigError> {
        let reference = config.reference_marker()?;
        let home = reference.position;

        let mut composer = Self::new(
            config.title.clone(),
            config.tile_layer(),
            reference,
            config.view.zoom,
        )
        .with_zone_style(config.zone_style())
        .with_clustering(config.view.cluster_incidents);

        if config.view.reset_control {
            composer = composer.with_control(ResetControl::new(
                home,
                config.view.reset_icon_url.clone(),
            ));
        }
        Ok(composer)
    }

    /// Sets the zone polygon style.
    #[must_use]
    pub fn with_zone_style(mut self, style: ZoneStyle) -> Self {
        self.zone_style = style;
        self
    }

    /// Enables or disables marker clustering.
    #[must_use]
    pub const fn with_clustering(mut self, clustered: bool) -> Self {
        self.cluster_incidents = clustered;
        self
    }

    /// Mounts a control.
    #[must_use]
    pub fn with_control(mut self, control: impl MapControl + 'static) -> Self {
        self.controls.push(Box::new(control));
        self
    }

    /// The initial viewport: the reference location at the configured
    /// zoom.
    #[must_use]
    pub const fn initial_viewport(&self) -> Viewport {
        Viewport {
            center: self.reference.position,
            zoom: self.zoom,
        }
    }

    /// Composes the view. The viewport center is always the reference
    /// location, whatever the layer contents.
    #[must_use]
    pub fn compose(&self, zones: &[ZoneFeature], markers: Vec<Marker>) -> ComposedView {
        let layers = vec![
            MapLayer::Tiles(self.tiles.clone()),
            MapLayer::Zones {
                features: to_feature_collection(zones),
                style: self.zone_style.clone(),
            },
            MapLayer::Incidents {
                markers,
                clustered: self.cluster_incidents,
            },
            MapLayer::Reference(self.reference.clone()),
        ];

        ComposedView {
            title: self.title.clone(),
            viewport: self.initial_viewport(),
            layers,
            controls: self.controls.iter().map(|c| c.mount()).collect(),
        }
    }

    /// Dispatches an activation to the control with `id`.
    ///
    /// Returns `false` if no such control is mounted.
    pub fn activate(&self, id: &str, viewport: &mut Viewport) -> bool {
        let Some(control) = self.controls.iter().find(|c| c.id() == id) else {
            return false;
        };
        control.activate(viewport);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_map_geography_models::LatLng;
    use parking_map_view_models::{LayerKind, Popup};

    fn composer() -> MapComposer {
        MapComposer::from_config(&MapConfig::embedded()).unwrap()
    }

    fn marker(lat: f64, lng: f64) -> Marker {
        Marker {
            position: LatLng::new(lat, lng).unwrap(),
            popup: Popup::default(),
        }
    }

    fn home() -> LatLng {
        LatLng::new(40.735_972_8, -73.995_785_1).unwrap()
    }

    #[test]
    fn centered_on_reference_regardless_of_content() {
        let empty = composer().compose(&[], Vec::new());
        assert_eq!(empty.viewport.center, home());
        assert_eq!(empty.viewport.zoom, 15);

        let busy = composer().compose(&[], vec![marker(40.8, -73.9), marker(40.6, -74.0)]);
        assert_eq!(busy.viewport.center, home());
    }

    #[test]
    fn layer_order() {
        let view = composer().compose(&[], vec![marker(40.7, -73.9)]);
        let kinds: Vec<LayerKind> = view.layers.iter().map(MapLayer::kind).collect();
        assert_eq!(
            kinds,
            vec![
                LayerKind::Tiles,
                LayerKind::Zones,
                LayerKind::Incidents,
                LayerKind::Reference
            ]
        );
        assert_eq!(view.markers().len(), 1);
    }

    #[test]
    fn tile_zoom_range() {
        let view = composer().compose(&[], Vec::new());
        let Some(MapLayer::Tiles(tiles)) = view.layer(LayerKind::Tiles) else {
            panic!("missing tile layer");
        };
        assert_eq!((tiles.min_zoom, tiles.max_zoom), (14, 16));
    }

    #[test]
    fn mounts_reset_control_from_config() {
        let view = composer().compose(&[], Vec::new());
        assert_eq!(view.controls.len(), 1);
        assert_eq!(view.controls[0].id, "reset");

        let mut config = MapConfig::embedded();
        config.view.reset_control = false;
        let bare = MapComposer::from_config(&config)
            .unwrap()
            .compose(&[], Vec::new());
        assert!(bare.controls.is_empty());
    }

    #[test]
    fn activation_recenters_owned_viewport() {
        let composer = composer();
        let mut viewport = composer.initial_viewport();
        viewport.center = LatLng::new(40.8, -73.9).unwrap();
        viewport.zoom = 16;

        assert!(composer.activate("reset", &mut viewport));
        assert_eq!(viewport.center, home());
        assert_eq!(viewport.zoom, 16);
        assert!(!composer.activate("zoom-in", &mut viewport));
    }

    #[test]
    fn clamps_zoom_into_tile_range() {
        let config = MapConfig::embedded();
        let composer = MapComposer::new(
            "t",
            config.tile_layer(),
            config.reference_marker().unwrap(),
            3,
        );
        assert_eq!(composer.initial_viewport().zoom, 14);
    }
}
