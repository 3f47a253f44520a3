//! Synthetic flood data served when the flood API cannot be reached.
//!
//! All values are drawn uniformly from fixed ranges using the random source
//! handed to [`MockGenerator`], so a seeded RNG gives reproducible output.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::Rng;
use tracing::{debug, warn};

use crate::model::{Coordinate, FloodReading, HistoricalPoint, RiskLevel, RiskZone, RiskZones};

const MOCK_LOCATION: &str = "Sample Location";

/// Longest mock history window, in days. Larger requests are clamped to it.
pub const MAX_MOCK_HISTORY_DAYS: u32 = 3660;

/// Produces mock readings, histories and risk zones from an injected RNG.
#[derive(Debug)]
pub struct MockGenerator<R> {
    rng: R,
}

impl<R: Rng> MockGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// A reading at `at`, stamped with `now`.
    pub fn flood_reading(&mut self, at: Coordinate, now: DateTime<Utc>) -> FloodReading {
        let rng = &mut self.rng;
        FloodReading {
            location: MOCK_LOCATION.to_string(),
            flood_risk: pick(rng, &RiskLevel::ALL),
            water_level: water_level(rng),
            rainfall_mm: rainfall_mm(rng),
            soil_moisture: soil_moisture(rng),
            temp: rng.gen_range(15..35),
            humidity: rng.gen_range(40..80),
            timestamp: iso_timestamp(now),
            coordinates: at,
            extra: Default::default(),
        }
    }

    /// `days + 1` daily points ending at `now`, oldest first.
    ///
    /// `days` is clamped to [`MAX_MOCK_HISTORY_DAYS`]. Days that fall outside
    /// the representable calendar are skipped.
    pub fn history(&mut self, days: u32, now: DateTime<Utc>) -> Vec<HistoricalPoint> {
        let window = days.min(MAX_MOCK_HISTORY_DAYS);
        if window < days {
            warn!(days, window, "mock history window clamped");
        }
        debug!(days = window, "generating mock history");

        let rng = &mut self.rng;
        (0..=window)
            .rev()
            .filter_map(|ago| now.checked_sub_signed(Duration::days(i64::from(ago))))
            .map(|day| HistoricalPoint {
                timestamp: iso_timestamp(day),
                water_level: water_level(rng),
                rainfall_mm: rainfall_mm(rng),
                soil_moisture: soil_moisture(rng),
                risk: pick(rng, &RiskLevel::ALL),
                extra: Default::default(),
            })
            .collect()
    }

    /// Between three and seven zones scattered within 0.05 degrees of `at`.
    pub fn risk_zones(&mut self, at: Coordinate) -> RiskZones {
        let rng = &mut self.rng;
        let count = rng.gen_range(3..=7);
        debug!(count, "generating mock risk zones");

        let zones = (0..count)
            .map(|_| RiskZone {
                lat: at.latitude + rng.gen_range(-0.05..0.05),
                lon: at.longitude + rng.gen_range(-0.05..0.05),
                risk: pick(rng, &RiskLevel::ZONE_LEVELS),
                radius: rng.gen_range(1.0..6.0),
                extra: Default::default(),
            })
            .collect();

        RiskZones { zones }
    }
}

fn pick(rng: &mut impl Rng, levels: &[RiskLevel]) -> RiskLevel {
    levels[rng.gen_range(0..levels.len())]
}

fn water_level(rng: &mut impl Rng) -> String {
    format!("{:.1}", rng.gen_range(0.5..5.5))
}

fn rainfall_mm(rng: &mut impl Rng) -> String {
    format!("{:.1}", rng.gen_range(5.0..55.0))
}

fn soil_moisture(rng: &mut impl Rng) -> String {
    format!("{:.2}", rng.gen_range(0.2..1.0))
}

fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
