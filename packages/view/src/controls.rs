//! Map controls.
//!
//! A control is a UI affordance with a mount point and an activation
//! handler. The viewport is owned by whoever composes the map and is
//! lent to a control only while it handles an activation.

use parking_map_geography_models::LatLng;
use parking_map_view_models::{ControlAction, ControlMount, ControlPosition, Viewport};

/// A UI affordance mounted on the map.
pub trait MapControl: Send + Sync {
    /// Unique identifier (e.g. `"reset"`).
    fn id(&self) -> &str;

    /// Map corner the control sits in.
    fn position(&self) -> ControlPosition;

    /// Describes the control for the rendered page.
    fn mount(&self) -> ControlMount;

    /// Handles a click.
    fn activate(&self, viewport: &mut Viewport);
}

/// Recenters the viewport on a fixed coordinate, keeping the zoom.
#[derive(Debug, Clone, PartialEq)]
pub struct ResetControl {
    target: LatLng,
    icon_url: String,
    position: ControlPosition,
}

impl ResetControl {
    /// Identifier of the reset control.
    pub const ID: &'static str = "reset";

    /// Creates a reset control for `target` in the top-left corner.
    #[must_use]
    pub fn new(target: LatLng, icon_url: impl Into<String>) -> Self {
        Self {
            target,
            icon_url: icon_url.into(),
            position: ControlPosition::TopLeft,
        }
    }

    /// Moves the control to another corner.
    #[must_use]
    pub const fn with_position(mut self, position: ControlPosition) -> Self {
        self.position = position;
        self
    }

    const fn action(&self) -> ControlAction {
        ControlAction::PanTo {
            target: self.target,
        }
    }
}

impl MapControl for ResetControl {
    fn id(&self) -> &str {
        Self::ID
    }

    fn position(&self) -> ControlPosition {
        self.position
    }

    fn mount(&self) -> ControlMount {
        ControlMount {
            id: Self::ID.to_string(),
            position: self.position,
            label: "Reset view".to_string(),
            icon_url: self.icon_url.clone(),
            action: self.action(),
        }
    }

    fn activate(&self, viewport: &mut Viewport) {
        self.action().apply(viewport);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> LatLng {
        LatLng::new(lat, lng).unwrap()
    }

    #[test]
    fn recenters_without_changing_zoom() {
        let home = coord(40.735_972_8, -73.995_785_1);
        let control = ResetControl::new(home, "/images/refresh-icon.svg");
        let mut viewport = Viewport {
            center: coord(40.8, -73.9),
            zoom: 14,
        };

        control.activate(&mut viewport);
        assert_eq!(viewport.center, home);
        assert_eq!(viewport.zoom, 14);

        control.activate(&mut viewport);
        assert_eq!(viewport.center, home);
        assert_eq!(viewport.zoom, 14);
    }

    #[test]
    fn mount_describes_control() {
        let home = coord(40.7, -73.9);
        let control = ResetControl::new(home, "/images/refresh-icon.svg")
            .with_position(ControlPosition::TopRight);
        let mount = control.mount();

        assert_eq!(mount.id, "reset");
        assert_eq!(mount.position, ControlPosition::TopRight);
        assert_eq!(control.position(), ControlPosition::TopRight);
        assert_eq!(mount.icon_url, "/images/refresh-icon.svg");
        assert_eq!(mount.action, ControlAction::PanTo { target: home });
    }
}
