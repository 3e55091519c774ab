//! Incident → marker transformation.

use parking_map_incident_models::Incident;
use parking_map_view_models::{Marker, Popup};

/// en-US `toLocaleString` layout, e.g. `1/15/2024, 2:30:00 PM`.
const LOCALE_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Builds one marker per incident that has a usable coordinate.
///
/// Incidents whose coordinate is missing or malformed are skipped
/// without error. Output order follows input order.
#[must_use]
pub fn build_markers(incidents: &[Incident]) -> Vec<Marker> {
    incidents
        .iter()
        .filter_map(|incident| {
            let position = incident.coordinate().ok()?;
            Some(Marker {
                position,
                popup: popup_for(incident),
            })
        })
        .collect()
}

/// Builds popup content for an incident.
///
/// Missing text fields become empty strings; a timestamp that does not
/// parse is shown as received.
#[must_use]
pub fn popup_for(incident: &Incident) -> Popup {
    Popup {
        agency: incident.agency_name.clone().unwrap_or_default(),
        descriptor: incident.descriptor.clone().unwrap_or_default(),
        created: format_created(incident),
        address: incident.incident_address.clone().unwrap_or_default(),
    }
}

fn format_created(incident: &Incident) -> String {
    incident.created_at().map_or_else(
        || incident.created_date.clone().unwrap_or_default(),
        |dt| dt.format(LOCALE_FORMAT).to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incidents(json: serde_json::Value) -> Vec<Incident> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn one_marker_for_located_incident() {
        let markers = build_markers(&incidents(serde_json::json!([
            { "agency_name": "NYPD", "location": { "latitude": 40.7, "longitude": -73.9 } }
        ])));

        assert_eq!(markers.len(), 1);
        assert!((markers[0].position.latitude - 40.7).abs() < f64::EPSILON);
        assert!((markers[0].position.longitude - -73.9).abs() < f64::EPSILON);
        assert!(markers[0].popup.text().contains("NYPD"));
    }

    #[test]
    fn no_marker_without_location() {
        let markers = build_markers(&incidents(serde_json::json!([
            { "agency_name": "NYPD", "descriptor": "Blocked Hydrant" }
        ])));
        assert!(markers.is_empty());
    }

    #[test]
    fn skips_unlocated_and_keeps_order() {
        let input = incidents(serde_json::json!([
            { "descriptor": "first", "latitude": "40.1", "longitude": "-73.1" },
            { "descriptor": "no coords" },
            { "descriptor": "half", "latitude": "40.2" },
            { "descriptor": "garbage", "latitude": "x", "longitude": "y" },
            { "descriptor": "second", "location": { "latitude": "40.3", "longitude": "-73.3" } }
        ]));
        let markers = build_markers(&input);

        assert!(markers.len() <= input.len());
        let names: Vec<&str> = markers.iter().map(|m| m.popup.descriptor.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn wrong_typed_coordinates_yield_no_marker() {
        let markers = build_markers(&incidents(serde_json::json!([
            { "descriptor": "good", "location": { "latitude": "40.7", "longitude": "-73.9" } },
            { "descriptor": "flag", "latitude": true, "longitude": "-73.9" },
            { "descriptor": "wkt", "location": "POINT (-73.9 40.7)" }
        ])));

        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].popup.descriptor, "good");
    }

    #[test]
    fn popup_fields() {
        let input = incidents(serde_json::json!([{
            "agency_name": "New York City Police Department",
            "descriptor": "Blocked Hydrant",
            "created_date": "2024-01-15T14:30:00.000",
            "incident_address": "66 WEST 12 STREET",
            "latitude": "40.7359",
            "longitude": "-73.9957"
        }]));
        let popup = &build_markers(&input)[0].popup;

        assert_eq!(popup.created, "1/15/2024, 2:30:00 PM");
        assert_eq!(popup.address, "66 WEST 12 STREET");
        assert_eq!(
            popup.heading(),
            "New York City Police Department · Blocked Hydrant"
        );
    }

    #[test]
    fn unparseable_timestamp_is_kept_verbatim() {
        let input = incidents(serde_json::json!([
            { "created_date": "yesterday", "latitude": "40.7", "longitude": "-73.9" }
        ]));
        assert_eq!(build_markers(&input)[0].popup.created, "yesterday");
    }

    #[test]
    fn morning_timestamp_uses_am() {
        let input = incidents(serde_json::json!([
            { "created_date": "2024-03-05T00:05:09", "latitude": "40.7", "longitude": "-73.9" }
        ]));
        assert_eq!(build_markers(&input)[0].popup.created, "3/5/2024, 12:05:09 AM");
    }
}
