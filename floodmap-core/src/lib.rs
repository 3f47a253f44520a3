//! Core library for the `floodmap` clients.
//!
//! This crate defines:
//! - Configuration of API endpoints and credentials
//! - The flood-risk client, which masks backend failures with mock data
//! - The weather client, which reports every failure to the caller
//! - Shared domain models (coordinates, readings, zones, weather payloads)
//!
//! It is used by `floodmap-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod flood;
mod http;
pub mod mock;
pub mod model;
pub mod weather;

pub use config::Config;
pub use error::ClientError;
pub use flood::{
    DEFAULT_HISTORY_DAYS, DEFAULT_ZONE_RADIUS_KM, FloodRiskApi, FloodRiskClient, FloodRiskSource,
};
pub use mock::{MAX_MOCK_HISTORY_DAYS, MockGenerator};
pub use model::{
    Coordinate, FloodReading, HistoricalPoint, RiskLevel, RiskZone, RiskZones, Units,
    WeatherResponse,
};
pub use weather::WeatherClient;
