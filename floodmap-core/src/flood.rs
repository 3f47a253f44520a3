//! Flood-risk backend client.
//!
//! [`FloodRiskApi`] talks to the backend and reports every failure as a
//! [`ClientError`]. [`FloodRiskClient`] wraps any [`FloodRiskSource`] and
//! substitutes mock data on failure, so its operations always produce a value.

use async_trait::async_trait;
use chrono::Utc;
use rand::{Rng, SeedableRng, rngs::StdRng};
use reqwest::{Client, header::CONTENT_TYPE};
use std::{
    fmt::Debug,
    sync::{Mutex, MutexGuard, PoisonError},
};
use tracing::{debug, error};

use crate::{
    config::Config,
    error::ClientError,
    http::{fixed6, get_json},
    mock::MockGenerator,
    model::{Coordinate, FloodReading, HistoricalPoint, RiskZones},
};

pub const DEFAULT_HISTORY_DAYS: u32 = 7;
pub const DEFAULT_ZONE_RADIUS_KM: f64 = 50.0;

const CURRENT_RISK_PATH: &str = "get_flood_risk";
const HISTORY_PATH: &str = "get_historical_data";
const RISK_ZONES_PATH: &str = "get_risk_zones";

#[async_trait]
pub trait FloodRiskSource: Send + Sync + Debug {
    async fn current_risk(&self, at: Coordinate) -> Result<FloodReading, ClientError>;

    async fn history(&self, region: &str, days: u32) -> Result<Vec<HistoricalPoint>, ClientError>;

    async fn risk_zones(&self, at: Coordinate, radius_km: f64) -> Result<RiskZones, ClientError>;
}

/// HTTP access to the flood backend.
#[derive(Debug, Clone)]
pub struct FloodRiskApi {
    base_url: String,
    http: Client,
}

impl FloodRiskApi {
    pub fn new(base_url: &str) -> Self {
        Self::with_http(base_url, Client::new())
    }

    pub fn with_http(base_url: &str, http: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

#[async_trait]
impl FloodRiskSource for FloodRiskApi {
    async fn current_risk(&self, at: Coordinate) -> Result<FloodReading, ClientError> {
        let request = self
            .http
            .get(self.url(CURRENT_RISK_PATH))
            .header(CONTENT_TYPE, "application/json")
            .query(&[("lat", fixed6(at.latitude)), ("lon", fixed6(at.longitude))]);

        debug!(lat = at.latitude, lon = at.longitude, "requesting current flood risk");
        get_json(request, CURRENT_RISK_PATH).await
    }

    async fn history(&self, region: &str, days: u32) -> Result<Vec<HistoricalPoint>, ClientError> {
        let request = self
            .http
            .get(self.url(HISTORY_PATH))
            .header(CONTENT_TYPE, "application/json")
            .query(&[("region", region.to_string()), ("days", days.to_string())]);

        debug!(region, days, "requesting flood history");
        get_json(request, HISTORY_PATH).await
    }

    async fn risk_zones(&self, at: Coordinate, radius_km: f64) -> Result<RiskZones, ClientError> {
        let request = self
            .http
            .get(self.url(RISK_ZONES_PATH))
            .header(CONTENT_TYPE, "application/json")
            .query(&[
                ("lat", fixed6(at.latitude)),
                ("lon", fixed6(at.longitude)),
                ("radius", radius_km.to_string()),
            ]);

        debug!(lat = at.latitude, lon = at.longitude, radius_km, "requesting risk zones");
        get_json(request, RISK_ZONES_PATH).await
    }
}

/// Flood client that never fails: source errors are logged and replaced with
/// mock data drawn from the injected random source.
#[derive(Debug)]
pub struct FloodRiskClient<S = FloodRiskApi, R = StdRng> {
    source: S,
    mock: Mutex<MockGenerator<R>>,
}

impl FloodRiskClient {
    /// Client for the backend at `base_url`, with an entropy-seeded RNG.
    pub fn new(base_url: &str) -> Self {
        Self::with_source(FloodRiskApi::new(base_url), StdRng::from_entropy())
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.flood.base_url)
    }
}

impl<S, R> FloodRiskClient<S, R>
where
    S: FloodRiskSource,
    R: Rng,
{
    pub fn with_source(source: S, rng: R) -> Self {
        Self {
            source,
            mock: Mutex::new(MockGenerator::new(rng)),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn fetch_current_risk(&self, at: Coordinate) -> FloodReading {
        match self.source.current_risk(at).await {
            Ok(reading) => reading,
            Err(err) => {
                error!(
                    endpoint = err.endpoint(),
                    lat = at.latitude,
                    lon = at.longitude,
                    "Error fetching flood risk data, serving mock reading: {err}"
                );
                self.mock().flood_reading(at, Utc::now())
            }
        }
    }

    /// Mock fallback histories are clamped to [`crate::MAX_MOCK_HISTORY_DAYS`].
    pub async fn fetch_history(&self, region: &str, days: u32) -> Vec<HistoricalPoint> {
        match self.source.history(region, days).await {
            Ok(points) => points,
            Err(err) => {
                error!(
                    endpoint = err.endpoint(),
                    region,
                    days,
                    "Error fetching historical data, serving mock history: {err}"
                );
                self.mock().history(days, Utc::now())
            }
        }
    }

    pub async fn fetch_risk_zones(&self, at: Coordinate, radius_km: f64) -> RiskZones {
        match self.source.risk_zones(at, radius_km).await {
            Ok(zones) => zones,
            Err(err) => {
                error!(
                    endpoint = err.endpoint(),
                    lat = at.latitude,
                    lon = at.longitude,
                    radius_km,
                    "Error fetching risk zones, serving mock zones: {err}"
                );
                self.mock().risk_zones(at)
            }
        }
    }

    fn mock(&self) -> MutexGuard<'_, MockGenerator<R>> {
        // A poisoned generator is still usable.
        self.mock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
