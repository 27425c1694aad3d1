use crate::fetcher::error::FetchErrorKind;

#[derive(Debug, PartialEq, Clone)]
pub struct FlightRecord {
    pub icao_address: ICAOAddress,
    pub callsign: String,
    pub altitude_ft: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub ground_speed_kt: f64,
    pub heading_deg: f64,
}

/// Every flight observed in one poll cycle, in the order the API returned them.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Snapshot {
    records: Vec<FlightRecord>,
    observed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Snapshot {
    #[must_use]
    pub fn new(records: Vec<FlightRecord>, observed_at: chrono::DateTime<chrono::Utc>) -> Self {
        Snapshot {
            records,
            observed_at: Some(observed_at),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Snapshot::default()
    }

    #[must_use]
    pub fn records(&self) -> &[FlightRecord] {
        &self.records
    }

    #[must_use]
    pub fn observed_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.observed_at
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops records whose position lies outside `bounding_box`.
    #[must_use]
    pub fn within(mut self, bounding_box: &BoundingBox) -> Self {
        self.records
            .retain(|record| bounding_box.contains(record.latitude, record.longitude));
        self
    }
}

/// How the display side sees the feed.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FeedStatus {
    /// Nothing received yet.
    Waiting,
    Live,
    /// Consecutive failures since the last good snapshot.
    Stale {
        failures: u32,
        last_error: FetchErrorKind,
    },
}

#[derive(Debug, PartialEq, Clone, Copy, serde::Deserialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    pub fn new(
        lat_min: f64,
        lat_max: f64,
        lon_min: f64,
        lon_max: f64,
    ) -> Result<Self, BoundingBoxError> {
        let bounding_box = BoundingBox {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        };
        bounding_box.validate()?;
        Ok(bounding_box)
    }

    /// Checks the ordering and range of both axes. Deserialized boxes bypass
    /// [`BoundingBox::new`], so config loading calls this explicitly.
    pub fn validate(&self) -> Result<(), BoundingBoxError> {
        let latitude_range = -90.0..=90.0;
        let longitude_range = -180.0..=180.0;
        if !latitude_range.contains(&self.lat_min) || !latitude_range.contains(&self.lat_max) {
            return Err(BoundingBoxError::LatitudeOutOfRange);
        }
        if !longitude_range.contains(&self.lon_min) || !longitude_range.contains(&self.lon_max) {
            return Err(BoundingBoxError::LongitudeOutOfRange);
        }
        if self.lat_min >= self.lat_max {
            return Err(BoundingBoxError::EmptyLatitudeSpan);
        }
        if self.lon_min >= self.lon_max {
            return Err(BoundingBoxError::EmptyLongitudeSpan);
        }
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&latitude)
            && (self.lon_min..=self.lon_max).contains(&longitude)
    }
}

#[derive(Debug, PartialEq)]
pub enum BoundingBoxError {
    LatitudeOutOfRange,
    LongitudeOutOfRange,
    EmptyLatitudeSpan,
    EmptyLongitudeSpan,
}
impl std::fmt::Display for BoundingBoxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundingBoxError::LatitudeOutOfRange => {
                write!(f, "Latitude bounds must lie within -90..=90")
            }
            BoundingBoxError::LongitudeOutOfRange => {
                write!(f, "Longitude bounds must lie within -180..=180")
            }
            BoundingBoxError::EmptyLatitudeSpan => write!(f, "lat_min must be below lat_max"),
            BoundingBoxError::EmptyLongitudeSpan => write!(f, "lon_min must be below lon_max"),
        }
    }
}
impl std::error::Error for BoundingBoxError {}

#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash, PartialOrd, Ord)]
pub struct ICAOAddress(u32);

impl ICAOAddress {
    pub const MAX_VALUE: u32 = 0x00FF_FFFF;

    pub fn new(value: u32) -> Result<Self, ICAOAddressError> {
        if value <= Self::MAX_VALUE {
            Ok(ICAOAddress(value))
        } else {
            Err(ICAOAddressError::InvalidAddress(value))
        }
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::str::FromStr for ICAOAddress {
    type Err = ICAOAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = u32::from_str_radix(s.trim(), 16)
            .map_err(|_| ICAOAddressError::InvalidHexFormat(s.to_string()))?;
        ICAOAddress::new(value)
    }
}

impl std::fmt::Display for ICAOAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06X}", self.0)
    }
}

#[derive(Debug, PartialEq)]
pub enum ICAOAddressError {
    InvalidHexFormat(String),
    InvalidAddress(u32),
}
impl std::fmt::Display for ICAOAddressError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ICAOAddressError::InvalidHexFormat(string) => {
                write!(f, "Invalid hexadecimal format: '{string}'")
            }
            ICAOAddressError::InvalidAddress(val) => {
                write!(
                    f,
                    "Value 0x{:X} ({}) exceeds 24-bit ICAO address limit (0x{:X})",
                    val,
                    val,
                    ICAOAddress::MAX_VALUE
                )
            }
        }
    }
}
impl std::error::Error for ICAOAddressError {}
