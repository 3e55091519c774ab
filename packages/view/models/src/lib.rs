#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map layer, marker, control, and viewport types.
//!
//! A [`ComposedView`] is the complete, serializable description of the
//! map page: where the viewport starts, which layers are stacked on it
//! (bottom to top), and which controls are mounted. It is produced once
//! per render and never mutated afterwards.

use parking_map_geography_models::LatLng;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The map's visible region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Center coordinate.
    pub center: LatLng,
    /// Zoom level.
    pub zoom: u8,
}

impl Viewport {
    /// Moves the center without touching the zoom level.
    pub const fn pan_to(&mut self, center: LatLng) {
        self.center = center;
    }
}

/// A slippy-map raster tile source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayer {
    /// URL template with `{z}`, `{x}`, `{y}` placeholders.
    pub url_template: String,
    /// Lowest zoom the tiles are shown at.
    pub min_zoom: u8,
    /// Highest zoom the tiles are shown at.
    pub max_zoom: u8,
    /// Attribution text.
    pub attribution: String,
}

/// Stroke and fill style for the zone polygons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneStyle {
    /// CSS color for stroke and fill.
    pub color: String,
    /// Stroke width in pixels.
    pub weight: u32,
    /// Fill opacity in `0.0..=1.0`.
    pub fill_opacity: f64,
}

impl Default for ZoneStyle {
    fn default() -> Self {
        Self {
            color: "red".to_string(),
            weight: 2,
            fill_opacity: 0.5,
        }
    }
}

/// Popup content for one incident marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Popup {
    /// Responding agency name.
    pub agency: String,
    /// Complaint descriptor.
    pub descriptor: String,
    /// Locale-formatted creation timestamp.
    pub created: String,
    /// Street address.
    pub address: String,
}

impl Popup {
    /// Header line: agency and descriptor, whichever are present.
    #[must_use]
    pub fn heading(&self) -> String {
        match (self.agency.is_empty(), self.descriptor.is_empty()) {
            (false, false) => format!("{} · {}", self.agency, self.descriptor),
            (false, true) => self.agency.clone(),
            (true, false) => self.descriptor.clone(),
            (true, true) => String::new(),
        }
    }

    /// Plain-text rendering, one line per field.
    #[must_use]
    pub fn text(&self) -> String {
        format!("{}\n{}\n{}", self.heading(), self.created, self.address)
    }

    /// HTML block rendering, centered, heading in bold.
    #[must_use]
    pub fn html(&self) -> String {
        format!(
            "<div style=\"display:flex;flex-direction:column;justify-content:center;\">\
             <div style=\"margin:0 auto;font-weight:600;\">{}</div>\
             <div style=\"margin:0 auto;font-weight:400;\">{}</div>\
             <div style=\"margin:0 auto;font-weight:400;\">{}</div>\
             </div>",
            escape_html(&self.heading()),
            escape_html(&self.created),
            escape_html(&self.address),
        )
    }
}

/// A point marker with a popup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Marker location.
    pub position: LatLng,
    /// Popup bound to the marker.
    pub popup: Popup,
}

/// A custom marker icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerIcon {
    /// Image URL.
    pub url: String,
    /// CSS class added to the icon element.
    pub class_name: String,
    /// Square icon size in pixels.
    pub size: u32,
}

impl MarkerIcon {
    /// Anchor point, the icon's center.
    #[must_use]
    pub const fn anchor(&self) -> [u32; 2] {
        [self.size / 2, self.size / 2]
    }
}

/// The fixed reference location marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceMarker {
    /// Place name.
    pub name: String,
    /// Place coordinate; also the viewport center.
    pub position: LatLng,
    /// Icon drawn at the coordinate.
    pub icon: MarkerIcon,
}

/// Kind of a [`MapLayer`], in string form.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LayerKind {
    /// Base raster tiles.
    Tiles,
    /// Zone polygons.
    Zones,
    /// Incident markers.
    Incidents,
    /// Reference location marker.
    Reference,
}

/// One renderable overlay on the viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapLayer {
    /// Base raster tiles.
    Tiles(TileLayer),
    /// Zone polygons with their style.
    Zones {
        /// Filtered zone features.
        features: geojson::FeatureCollection,
        /// Polygon style.
        style: ZoneStyle,
    },
    /// Incident markers, optionally grouped into clusters.
    Incidents {
        /// One marker per locatable incident.
        markers: Vec<Marker>,
        /// Whether nearby markers are clustered.
        clustered: bool,
    },
    /// The reference location marker.
    Reference(ReferenceMarker),
}

impl MapLayer {
    /// Returns the layer's kind.
    #[must_use]
    pub const fn kind(&self) -> LayerKind {
        match self {
            Self::Tiles(_) => LayerKind::Tiles,
            Self::Zones { .. } => LayerKind::Zones,
            Self::Incidents { .. } => LayerKind::Incidents,
            Self::Reference(_) => LayerKind::Reference,
        }
    }
}

/// Corner of the map a control is mounted in.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ControlPosition {
    /// Top left corner.
    #[default]
    TopLeft,
    /// Top right corner.
    TopRight,
    /// Bottom left corner.
    BottomLeft,
    /// Bottom right corner.
    BottomRight,
}

/// What activating a control does to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlAction {
    /// Recenter on `target`, keeping the zoom level.
    PanTo {
        /// New viewport center.
        target: LatLng,
    },
}

impl ControlAction {
    /// Applies the action to a viewport.
    pub const fn apply(self, viewport: &mut Viewport) {
        match self {
            Self::PanTo { target } => viewport.pan_to(target),
        }
    }
}

/// A mounted control: where it sits, what it shows, what it does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlMount {
    /// Unique control identifier.
    pub id: String,
    /// Map corner.
    pub position: ControlPosition,
    /// Tooltip / accessible label.
    pub label: String,
    /// Button icon URL.
    pub icon_url: String,
    /// Effect of a click.
    pub action: ControlAction,
}

/// The fully composed map page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedView {
    /// Page heading.
    pub title: String,
    /// Initial viewport.
    pub viewport: Viewport,
    /// Layers, bottom to top. Later layers paint over earlier ones.
    pub layers: Vec<MapLayer>,
    /// Mounted controls.
    pub controls: Vec<ControlMount>,
}

impl ComposedView {
    /// Returns the first layer of the given kind.
    #[must_use]
    pub fn layer(&self, kind: LayerKind) -> Option<&MapLayer> {
        self.layers.iter().find(|l| l.kind() == kind)
    }

    /// Returns the incident markers, or an empty slice if there is no
    /// incident layer.
    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        match self.layer(LayerKind::Incidents) {
            Some(MapLayer::Incidents { markers, .. }) => markers,
            _ => &[],
        }
    }

    /// Returns the zone features, if a zone layer is present.
    #[must_use]
    pub fn zones(&self) -> Option<&geojson::FeatureCollection> {
        match self.layer(LayerKind::Zones) {
            Some(MapLayer::Zones { features, .. }) => Some(features),
            _ => None,
        }
    }

    /// Applies the named control's action to `viewport`.
    ///
    /// Returns `false` if no control has that id.
    pub fn activate_control(&self, id: &str, viewport: &mut Viewport) -> bool {
        let Some(control) = self.controls.iter().find(|c| c.id == id) else {
            return false;
        };
        control.action.apply(viewport);
        true
    }
}

/// Escapes the five HTML-significant characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
