#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Parking complaint record types.
//!
//! Records arrive from the NYC 311 Socrata API as loosely-typed JSON
//! objects. [`RawIncident`] mirrors that wire shape; [`Incident`] is the
//! validated form the rest of the workspace consumes. Coordinates are
//! resolved once at the boundary into a `Result`, so a record lacking
//! them is an explicit [`MalformedRecordError`] rather than a falsy check.

use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use parking_map_geography_models::LatLng;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Why an incident record cannot be placed on the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedRecordError {
    /// A required field was absent or null.
    MissingField(&'static str),
    /// A field was present but did not parse as a finite number.
    InvalidNumber {
        /// Name of the offending field.
        field: &'static str,
        /// The raw value as received.
        value: String,
    },
}

impl fmt::Display for MalformedRecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing field `{field}`"),
            Self::InvalidNumber { field, value } => {
                write!(f, "field `{field}` is not a finite number: {value:?}")
            }
        }
    }
}

impl std::error::Error for MalformedRecordError {}

/// A coordinate component as Socrata may send it: usually a string,
/// occasionally a bare number. Any other JSON value is kept as-is and
/// rejected when the coordinate is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateValue {
    /// Numeric JSON value.
    Number(f64),
    /// String-encoded number (Socrata's `number` columns).
    Text(String),
    /// Anything else (booleans, arrays, objects).
    Other(Value),
}

impl CoordinateValue {
    fn parse(&self, field: &'static str) -> Result<f64, MalformedRecordError> {
        let value = match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
            Self::Other(_) => None,
        };
        value
            .filter(|v| v.is_finite())
            .ok_or_else(|| MalformedRecordError::InvalidNumber {
                field,
                value: match self {
                    Self::Number(n) => n.to_string(),
                    Self::Text(s) => s.clone(),
                    Self::Other(v) => v.to_string(),
                },
            })
    }
}

/// The nested `location` point object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLocation {
    /// Latitude component.
    #[serde(default)]
    pub latitude: Option<CoordinateValue>,
    /// Longitude component.
    #[serde(default)]
    pub longitude: Option<CoordinateValue>,
}

/// The `location` column: normally a point object, but kept as raw JSON
/// when it is anything else (e.g. a WKT string).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationValue {
    /// Object with `latitude`/`longitude` members.
    Point(RawLocation),
    /// Any other JSON value.
    Other(Value),
}

/// Reads a text column, tolerating non-string scalars.
///
/// Numbers and booleans are kept in their JSON text form; objects and
/// arrays are dropped.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Some(v.to_string()),
        _ => None,
    })
}

/// A 311 service request exactly as the Socrata API returns it.
///
/// Only the columns the map uses are kept; everything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawIncident {
    /// Socrata row key.
    #[serde(default, deserialize_with = "lenient_text")]
    pub unique_key: Option<String>,
    /// Responding agency (e.g. "New York City Police Department").
    #[serde(default, deserialize_with = "lenient_text")]
    pub agency_name: Option<String>,
    /// Complaint type (e.g. "Illegal Parking").
    #[serde(default, deserialize_with = "lenient_text")]
    pub complaint_type: Option<String>,
    /// Complaint sub-type (e.g. "Blocked Hydrant").
    #[serde(default, deserialize_with = "lenient_text")]
    pub descriptor: Option<String>,
    /// Floating timestamp the request was opened.
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_date: Option<String>,
    /// Street address.
    #[serde(default, deserialize_with = "lenient_text")]
    pub incident_address: Option<String>,
    /// Postal code.
    #[serde(default, deserialize_with = "lenient_text")]
    pub incident_zip: Option<String>,
    /// Top-level latitude column.
    #[serde(default)]
    pub latitude: Option<CoordinateValue>,
    /// Top-level longitude column.
    #[serde(default)]
    pub longitude: Option<CoordinateValue>,
    /// Nested location point.
    #[serde(default)]
    pub location: Option<LocationValue>,
}

/// A validated incident record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawIncident")]
pub struct Incident {
    /// Socrata row key.
    pub unique_key: Option<String>,
    /// Responding agency.
    pub agency_name: Option<String>,
    /// Complaint type.
    pub complaint_type: Option<String>,
    /// Complaint sub-type.
    pub descriptor: Option<String>,
    /// Raw created timestamp; see [`Incident::created_at`].
    pub created_date: Option<String>,
    /// Street address.
    pub incident_address: Option<String>,
    /// Postal code.
    pub incident_zip: Option<String>,
    coordinate: Result<LatLng, MalformedRecordError>,
}

impl Incident {
    /// The incident's coordinate, or why it has none.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRecordError`] if either component is missing or
    /// is not a finite number.
    pub fn coordinate(&self) -> Result<LatLng, MalformedRecordError> {
        self.coordinate.clone()
    }

    /// Parses [`Incident::created_date`].
    #[must_use]
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        self.created_date.as_deref().and_then(parse_socrata_date)
    }
}

impl From<RawIncident> for Incident {
    fn from(raw: RawIncident) -> Self {
        let coordinate = resolve_coordinate(&raw);
        Self {
            unique_key: raw.unique_key,
            agency_name: raw.agency_name,
            complaint_type: raw.complaint_type,
            descriptor: raw.descriptor,
            created_date: raw.created_date,
            incident_address: raw.incident_address,
            incident_zip: raw.incident_zip,
            coordinate,
        }
    }
}

/// Top-level `latitude`/`longitude` win when either is present; otherwise
/// the nested `location` object is used.
fn resolve_coordinate(raw: &RawIncident) -> Result<LatLng, MalformedRecordError> {
    let (lat, lng) = if raw.latitude.is_some() || raw.longitude.is_some() {
        (raw.latitude.as_ref(), raw.longitude.as_ref())
    } else if let Some(location) = &raw.location {
        match location {
            LocationValue::Point(point) => (point.latitude.as_ref(), point.longitude.as_ref()),
            LocationValue::Other(value) => {
                return Err(MalformedRecordError::InvalidNumber {
                    field: "location",
                    value: value.to_string(),
                });
            }
        }
    } else {
        return Err(MalformedRecordError::MissingField("location"));
    };

    let latitude = lat
        .ok_or(MalformedRecordError::MissingField("latitude"))?
        .parse("latitude")?;
    let longitude = lng
        .ok_or(MalformedRecordError::MissingField("longitude"))?
        .parse("longitude")?;

    // Both components are finite here, so construction cannot fail.
    LatLng::new(latitude, longitude).ok_or(MalformedRecordError::MissingField("location"))
}

/// Parses a Socrata floating timestamp (ISO 8601 without offset, with
/// optional fractional seconds). Timestamps carrying an offset are
/// accepted and reduced to their local wall-clock time.
#[must_use]
pub fn parse_socrata_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive);
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_local())
}
