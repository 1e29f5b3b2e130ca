use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One structured row extracted from an inbound webhook document.
/// Coordinates are guaranteed numeric; everything else is nullable
/// pass-through from the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub user_id: Option<String>,
    pub trip_id: Option<String>,
    pub timestamp: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub event_type: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("missing location coordinates")]
    MissingCoordinates,
    #[error("field `{0}` is not a valid coordinate")]
    InvalidCoordinate(&'static str),
    #[error("field `{0}` has an unexpected type")]
    WrongType(&'static str),
}

/// Maps a loosely structured webhook document to a [`LocationRecord`].
///
/// `location.coordinates` must be present with numeric (or
/// numeric-string) latitude/longitude; `MMUserId`, `trip._id`,
/// `created_at` and `type` are optional. An optional field that is
/// present with the wrong type is an error, not a silent null.
pub fn extract_location(doc: &Value) -> Result<LocationRecord, ExtractError> {
    let doc = match doc.as_object() {
        Some(doc) => doc,
        None => return Err(ExtractError::MissingCoordinates),
    };

    let location = match doc.get("location") {
        Some(Value::Object(location)) if !location.is_empty() => location,
        _ => return Err(ExtractError::MissingCoordinates),
    };
    let coordinates = match location.get("coordinates") {
        Some(Value::Object(coordinates)) => coordinates,
        _ => return Err(ExtractError::MissingCoordinates),
    };

    let trip = match doc.get("trip") {
        None | Some(Value::Null) => None,
        Some(Value::Object(trip)) => Some(trip),
        Some(_) => return Err(ExtractError::WrongType("trip")),
    };

    Ok(LocationRecord {
        user_id: opt_string(doc, "MMUserId")?,
        trip_id: match trip {
            Some(trip) => opt_string(trip, "_id")?,
            None => None,
        },
        timestamp: opt_string(doc, "created_at")?,
        latitude: coordinate(coordinates, "latitude")?,
        longitude: coordinate(coordinates, "longitude")?,
        event_type: opt_string(doc, "type")?,
    })
}

// missing or null => None, wrong type => error
fn opt_string(
    map: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, ExtractError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(ExtractError::WrongType(field)),
    }
}

fn coordinate(map: &Map<String, Value>, field: &'static str) -> Result<f64, ExtractError> {
    match map.get(field) {
        Some(Value::Number(value)) => value
            .as_f64()
            .ok_or(ExtractError::InvalidCoordinate(field)),
        Some(Value::String(value)) => value
            .trim()
            .parse::<f64>()
            .map_err(|_| ExtractError::InvalidCoordinate(field)),
        _ => Err(ExtractError::InvalidCoordinate(field)),
    }
}
