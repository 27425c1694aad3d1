pub const DEFAULT_BASE_URL: &str = "https://opensky-network.org/api";
pub const STATES_ENDPOINT: &str = "/states/all";
pub const RETRY_AFTER_HEADER: &str = "X-Rate-Limit-Retry-After-Seconds";

pub const METERS_TO_FEET: f64 = 3.28084;
pub const METERS_PER_SECOND_TO_KNOTS: f64 = 1.943_844;

// Positions inside an OpenSky state vector
pub const ICAO24: usize = 0;
pub const CALLSIGN: usize = 1;
pub const LONGITUDE: usize = 5;
pub const LATITUDE: usize = 6;
pub const BARO_ALTITUDE: usize = 7;
pub const VELOCITY: usize = 9;
pub const TRUE_TRACK: usize = 10;
pub const GEO_ALTITUDE: usize = 13;
