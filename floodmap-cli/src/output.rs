use anyhow::{Context, Result};
use chrono::DateTime;
use floodmap_core::{FloodReading, HistoricalPoint, RiskZones, Units, WeatherResponse};
use serde::Serialize;
use std::fmt::Write;

/// Print `value` as pretty JSON, or the human-readable `summary` of it.
pub fn emit<T, F>(json: bool, value: &T, summary: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    if json {
        let text = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
        println!("{text}");
    } else {
        print!("{}", summary(value));
    }
    Ok(())
}

pub fn reading(r: &FloodReading) -> String {
    format!(
        "{} ({:.4}, {:.4})\n  \
         flood risk:    {}\n  \
         water level:   {} m\n  \
         rainfall:      {} mm\n  \
         soil moisture: {}\n  \
         temperature:   {} °C\n  \
         humidity:      {}%\n  \
         observed:      {}\n",
        r.location,
        r.coordinates.latitude,
        r.coordinates.longitude,
        r.flood_risk,
        r.water_level,
        r.rainfall_mm,
        r.soil_moisture,
        r.temp,
        r.humidity,
        r.timestamp,
    )
}

pub fn history(region: &str, points: &[HistoricalPoint]) -> String {
    let mut out = format!("{region}: {} day(s)\n", points.len());
    for p in points {
        let _ = writeln!(
            out,
            "  {}  {:<8}  water {:>5}  rain {:>5}  soil {:>4}",
            day(&p.timestamp),
            p.risk,
            p.water_level,
            p.rainfall_mm,
            p.soil_moisture,
        );
    }
    out
}

pub fn zones(z: &RiskZones) -> String {
    let mut out = format!("{} zone(s)\n", z.zones.len());
    for zone in &z.zones {
        let _ = writeln!(
            out,
            "  ({:.4}, {:.4})  {:<8}  radius {:.1} km",
            zone.lat, zone.lon, zone.risk, zone.radius,
        );
    }
    out
}

pub fn weather(w: &WeatherResponse, units: Units) -> String {
    let symbol = match units {
        Units::Standard => "K",
        Units::Metric => "°C",
        Units::Imperial => "°F",
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", w.location_name().unwrap_or("Unknown location"));
    if let Some(temp) = w.temperature() {
        let _ = writeln!(out, "  temperature: {temp:.1} {symbol}");
    }
    if let Some(humidity) = w.humidity() {
        let _ = writeln!(out, "  humidity:    {humidity}%");
    }
    if let Some(condition) = w.condition() {
        let _ = writeln!(out, "  condition:   {condition}");
    }
    out
}

/// Calendar date of an RFC 3339 timestamp, or the raw text if it doesn't parse.
fn day(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}
