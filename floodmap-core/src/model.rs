use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A point on the map. Serialized as `{"lat": .., "lon": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(rename = "lat", alias = "latitude")]
    pub latitude: f64,
    #[serde(rename = "lon", alias = "longitude")]
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both components are finite. Geographic ranges are not checked.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    /// Levels reported for readings and history points.
    pub const ALL: [RiskLevel; 4] =
        [RiskLevel::Low, RiskLevel::Moderate, RiskLevel::High, RiskLevel::Critical];

    /// Levels reported for risk zones.
    pub const ZONE_LEVELS: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Moderate, RiskLevel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current flood conditions at a point.
///
/// Named fields are typed, so a server payload whose field has the wrong JSON
/// type fails to decode and the client serves a mock reading instead. Fields
/// this crate doesn't know are kept in `extra` and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodReading {
    pub location: String,
    pub flood_risk: RiskLevel,
    pub water_level: String,
    pub rainfall_mm: String,
    pub soil_moisture: String,
    pub temp: i32,
    pub humidity: u8,
    pub timestamp: String,
    pub coordinates: Coordinate,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One day of a regional time series. Unknown fields land in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub timestamp: String,
    pub water_level: String,
    pub rainfall_mm: String,
    pub soil_moisture: String,
    pub risk: RiskLevel,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskZone {
    pub lat: f64,
    pub lon: f64,
    pub risk: RiskLevel,
    /// Kilometres.
    pub radius: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskZones {
    pub zones: Vec<RiskZone>,
}

/// Unit system understood by the weather API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Standard,
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Standard => "standard",
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Standard, Units::Metric, Units::Imperial]
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "standard" => Ok(Units::Standard),
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: standard, metric, imperial."
            )),
        }
    }
}

/// Weather payload exactly as returned by the remote API.
///
/// The accessors below only read from the payload; the JSON itself is never
/// reshaped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherResponse(pub Value);

impl WeatherResponse {
    pub fn raw(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    pub fn location_name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    pub fn temperature(&self) -> Option<f64> {
        self.0.pointer("/main/temp").and_then(Value::as_f64)
    }

    pub fn humidity(&self) -> Option<f64> {
        self.0.pointer("/main/humidity").and_then(Value::as_f64)
    }

    pub fn condition(&self) -> Option<&str> {
        self.0.pointer("/weather/0/description").and_then(Value::as_str)
    }
}
