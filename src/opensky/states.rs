use super::constants::{
    BARO_ALTITUDE, CALLSIGN, GEO_ALTITUDE, ICAO24, LATITUDE, LONGITUDE, METERS_PER_SECOND_TO_KNOTS,
    METERS_TO_FEET, TRUE_TRACK, VELOCITY,
};
use crate::fetcher::error::FetchError;
use crate::types::{FlightRecord, ICAOAddress, Snapshot};

#[derive(Debug, serde::Deserialize)]
pub struct StatesResponse {
    pub time: i64,
    #[serde(default)]
    pub states: Option<Vec<Vec<serde_json::Value>>>,
}

#[derive(Debug, PartialEq)]
pub enum FlightBuildError {
    MissingField(&'static str),
    InvalidField {
        field: &'static str,
        value: String,
    },
    MissingCallsign,
    MissingAltitude,
}
impl std::fmt::Display for FlightBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlightBuildError::MissingField(field) => write!(f, "State vector has no {field}"),
            FlightBuildError::InvalidField { field, value } => {
                write!(f, "State vector field {field} has invalid value {value}")
            }
            FlightBuildError::MissingCallsign => write!(f, "State vector has an empty callsign"),
            FlightBuildError::MissingAltitude => {
                write!(f, "State vector has neither barometric nor geometric altitude")
            }
        }
    }
}
impl std::error::Error for FlightBuildError {}

/// Parses a `/states/all` body. Individual state vectors that cannot be
/// turned into a [`FlightRecord`] are dropped; the rest of the snapshot is kept.
pub fn parse_states_body(body: &str) -> Result<Snapshot, FetchError> {
    let response: StatesResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;
    build_snapshot(response)
}

pub fn build_snapshot(response: StatesResponse) -> Result<Snapshot, FetchError> {
    let observed_at = chrono::DateTime::from_timestamp(response.time, 0).ok_or_else(|| {
        FetchError::MalformedResponse(format!("time {} is out of range", response.time))
    })?;

    let records = response
        .states
        .unwrap_or_default()
        .iter()
        .filter_map(|state| match build_flight_from_state(state) {
            Ok(record) => Some(record),
            Err(err) => {
                log::debug!("Discarding state vector: {err}");
                None
            }
        })
        .collect();

    Ok(Snapshot::new(records, observed_at))
}

pub fn build_flight_from_state(
    state: &[serde_json::Value],
) -> Result<FlightRecord, FlightBuildError> {
    let icao_address = required_str(state, ICAO24, "icao24")?
        .parse::<ICAOAddress>()
        .map_err(|e| FlightBuildError::InvalidField {
            field: "icao24",
            value: e.to_string(),
        })?;

    let callsign = optional_str(state, CALLSIGN, "callsign")?
        .map(str::trim)
        .filter(|callsign| !callsign.is_empty())
        .ok_or(FlightBuildError::MissingCallsign)?
        .to_string();

    let altitude_m = optional_f64(state, BARO_ALTITUDE, "baro_altitude")?
        .or(optional_f64(state, GEO_ALTITUDE, "geo_altitude")?)
        .ok_or(FlightBuildError::MissingAltitude)?;

    let latitude =
        optional_f64(state, LATITUDE, "latitude")?.ok_or(FlightBuildError::MissingField("latitude"))?;
    let longitude = optional_f64(state, LONGITUDE, "longitude")?
        .ok_or(FlightBuildError::MissingField("longitude"))?;

    let velocity_ms = optional_f64(state, VELOCITY, "velocity")?.unwrap_or(0.0);
    let heading_deg = optional_f64(state, TRUE_TRACK, "true_track")?.unwrap_or(0.0);

    Ok(FlightRecord {
        icao_address,
        callsign,
        altitude_ft: altitude_m * METERS_TO_FEET,
        latitude,
        longitude,
        ground_speed_kt: velocity_ms * METERS_PER_SECOND_TO_KNOTS,
        heading_deg,
    })
}

fn field<'a>(
    state: &'a [serde_json::Value],
    index: usize,
    name: &'static str,
) -> Result<&'a serde_json::Value, FlightBuildError> {
    state.get(index).ok_or(FlightBuildError::MissingField(name))
}

fn required_str<'a>(
    state: &'a [serde_json::Value],
    index: usize,
    name: &'static str,
) -> Result<&'a str, FlightBuildError> {
    optional_str(state, index, name)?.ok_or(FlightBuildError::MissingField(name))
}

fn optional_str<'a>(
    state: &'a [serde_json::Value],
    index: usize,
    name: &'static str,
) -> Result<Option<&'a str>, FlightBuildError> {
    match field(state, index, name)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(string) => Ok(Some(string.as_str())),
        other => Err(FlightBuildError::InvalidField {
            field: name,
            value: other.to_string(),
        }),
    }
}

// Trailing fields may be absent on older API versions, so a short vector reads as null here.
fn optional_f64(
    state: &[serde_json::Value],
    index: usize,
    name: &'static str,
) -> Result<Option<f64>, FlightBuildError> {
    match state.get(index) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(number)) => Ok(number.as_f64()),
        Some(other) => Err(FlightBuildError::InvalidField {
            field: name,
            value: other.to_string(),
        }),
    }
}
