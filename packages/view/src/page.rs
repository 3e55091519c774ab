//! Static page rendering.
//!
//! Turns a [`ComposedView`] into a self-contained Leaflet page. Layer data
//! is embedded as a JSON literal inside a `<script>` element and replayed
//! by a small script in layer order.

use std::path::{Path, PathBuf};

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use parking_map_config::MapConfig;
use parking_map_view_models::{ComposedView, Marker, escape_html};
use serde::Serialize;

use crate::ViewError;

const LEAFLET_VERSION: &str = "1.9.4";
const MARKERCLUSTER_VERSION: &str = "1.5.3";

/// Page layout options not carried by the view itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    /// Height of the map container in pixels.
    pub map_height_px: u32,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self { map_height_px: 500 }
    }
}

impl PageOptions {
    /// Reads page options from configuration.
    #[must_use]
    pub const fn from_config(config: &MapConfig) -> Self {
        Self {
            map_height_px: config.view.map_height_px,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PagePayload<'a> {
    view: &'a ComposedView,
    popups: Vec<String>,
}

/// Serializes `value` for embedding in a `<script>` element.
///
/// `</` is escaped so no string inside the data can close the element.
fn script_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// Renders the HTML page for `view`.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if the view cannot be serialized.
pub fn render_page(view: &ComposedView, options: PageOptions) -> Result<String, serde_json::Error> {
    let payload = PagePayload {
        view,
        popups: view.markers().iter().map(|m| m.popup.html()).collect(),
    };
    let data = script_json(&payload)?;
    let title = escape_html(&view.title);
    let height = options.map_height_px;

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.css">
<link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@{MARKERCLUSTER_VERSION}/dist/MarkerCluster.css">
<link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@{MARKERCLUSTER_VERSION}/dist/MarkerCluster.Default.css">
<style>
html, body {{ margin: 0; height: 100%; font-family: sans-serif; }}
.page {{ position: fixed; inset: 0; padding: 50px; overflow: auto; }}
.card {{ margin: 0 auto; padding: 20px; border-radius: 10px; width: 100%; max-width: 800px; box-sizing: border-box; background: hsl(255, 6%, 10%); box-shadow: 0 0 2px hsla(0, 0%, 0%, 0.1); }}
.card h1 {{ margin: 0; padding: 4px 0 12px 2px; font-size: 1.1rem; font-weight: 500; color: #eee; }}
#map {{ height: {height}px; border-radius: 8px; }}
.map-control-button {{ display: block; width: 30px; height: 30px; padding: 4px; border: none; background: #fff; cursor: pointer; box-sizing: border-box; }}
.map-control-button img {{ width: 100%; height: 100%; }}
</style>
</head>
<body>
<div class="page">
<div class="card">
<h1>{title}</h1>
<div id="map"></div>
</div>
</div>
<script src="https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.js"></script>
<script src="https://unpkg.com/leaflet.markercluster@{MARKERCLUSTER_VERSION}/dist/leaflet.markercluster.js"></script>
<script>
const PAGE = {data};
{SCRIPT}
</script>
</body>
</html>
"#
    ))
}

const SCRIPT: &str = r"(function () {
  const view = PAGE.view;
  const latLng = (p) => [p.latitude, p.longitude];
  const map = L.map('map').setView(latLng(view.viewport.center), view.viewport.zoom);

  for (const layer of view.layers) {
    switch (layer.kind) {
      case 'tiles':
        L.tileLayer(layer.urlTemplate, {
          minZoom: layer.minZoom,
          maxZoom: layer.maxZoom,
          attribution: layer.attribution,
        }).addTo(map);
        break;
      case 'zones':
        L.geoJSON(layer.features, {
          style: {
            color: layer.style.color,
            weight: layer.style.weight,
            fillOpacity: layer.style.fillOpacity,
          },
        }).addTo(map);
        break;
      case 'incidents': {
        const group = layer.clustered ? L.markerClusterGroup() : L.layerGroup();
        layer.markers.forEach((marker, i) => {
          L.marker(latLng(marker.position)).bindPopup(PAGE.popups[i]).addTo(group);
        });
        group.addTo(map);
        break;
      }
      case 'reference': {
        const size = layer.icon.size;
        const icon = L.icon({
          iconUrl: layer.icon.url,
          className: layer.icon.className,
          iconSize: [size, size],
          iconAnchor: [size / 2, size / 2],
        });
        L.marker(latLng(layer.position), { icon, title: layer.name }).addTo(map);
        break;
      }
    }
  }

  for (const control of view.controls) {
    const Control = L.Control.extend({
      options: { position: control.position },
      onAdd: function () {
        const container = L.DomUtil.create('div', 'leaflet-bar leaflet-control');
        const button = L.DomUtil.create('button', 'map-control-button', container);
        button.type = 'button';
        button.title = control.label;
        button.setAttribute('aria-label', control.label);
        const img = L.DomUtil.create('img', '', button);
        img.src = control.iconUrl;
        img.alt = '';
        L.DomEvent.disableClickPropagation(container);
        L.DomEvent.on(button, 'click', () => {
          if (control.action.type === 'pan_to') {
            map.panTo(latLng(control.action.target));
          }
        });
        return container;
      },
    });
    new Control().addTo(map);
  }
})();";

/// Converts markers to a `GeoJSON` `FeatureCollection` of points.
///
/// Each feature carries the popup fields and the rendered popup HTML as
/// properties.
#[must_use]
pub fn markers_to_feature_collection(markers: &[Marker]) -> FeatureCollection {
    let features = markers
        .iter()
        .map(|marker| {
            let mut properties = JsonObject::new();
            properties.insert("agency".to_string(), marker.popup.agency.clone().into());
            properties.insert(
                "descriptor".to_string(),
                marker.popup.descriptor.clone().into(),
            );
            properties.insert("created".to_string(), marker.popup.created.clone().into());
            properties.insert("address".to_string(), marker.popup.address.clone().into());
            properties.insert("popup".to_string(), marker.popup.html().into());

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(
                    marker.position.to_position().to_vec(),
                ))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn write_file(path: PathBuf, contents: &str) -> Result<(), ViewError> {
    std::fs::write(&path, contents).map_err(|source| ViewError::Write { path, source })
}

/// Writes `index.html`, `zones.geojson`, and `incidents.geojson` into
/// `dir`, creating it if needed.
///
/// # Errors
///
/// Returns [`ViewError`] if serialization or any write fails.
pub fn write_bundle(view: &ComposedView, options: PageOptions, dir: &Path) -> Result<(), ViewError> {
    std::fs::create_dir_all(dir).map_err(|source| ViewError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let zones = view.zones().cloned().unwrap_or_else(|| FeatureCollection {
        bbox: None,
        features: Vec::new(),
        foreign_members: None,
    });
    let incidents = markers_to_feature_collection(view.markers());

    write_file(dir.join("index.html"), &render_page(view, options)?)?;
    write_file(dir.join("zones.geojson"), &serde_json::to_string(&zones)?)?;
    write_file(
        dir.join("incidents.geojson"),
        &serde_json::to_string(&incidents)?,
    )?;

    log::info!(
        "Wrote page bundle to {} ({} zones, {} incidents)",
        dir.display(),
        zones.features.len(),
        incidents.features.len()
    );
    Ok(())
}

/// Copies every file in `assets` into `dir/images`.
///
/// A missing `assets` directory is skipped with a warning.
///
/// # Errors
///
/// Returns [`ViewError::Write`] if a copy fails.
pub fn copy_images(assets: &Path, dir: &Path) -> Result<usize, ViewError> {
    let Ok(entries) = std::fs::read_dir(assets) else {
        log::warn!("Image directory {} not found, skipping", assets.display());
        return Ok(0);
    };

    let target = dir.join("images");
    std::fs::create_dir_all(&target).map_err(|source| ViewError::Write {
        path: target.clone(),
        source,
    })?;

    let mut copied = 0;
    for entry in entries.flatten() {
        let from = entry.path();
        if !from.is_file() {
            continue;
        }
        let to = target.join(entry.file_name());
        std::fs::copy(&from, &to).map_err(|source| ViewError::Write { path: to, source })?;
        copied += 1;
    }
    Ok(copied)
}
