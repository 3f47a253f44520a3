//! Stubbed-HTTP tests for the flood and weather clients.

use floodmap_core::{
    ClientError, Coordinate, FloodReading, FloodRiskApi, FloodRiskClient, FloodRiskSource,
    HistoricalPoint, RiskLevel, RiskZone, RiskZones, Units, WeatherClient,
};
use mockito::{Matcher, Server};
use rand::{SeedableRng, rngs::StdRng};
use serde_json::json;

const UNREACHABLE: &str = "http://127.0.0.1:1/api";

fn flood_client(base: &str) -> FloodRiskClient {
    FloodRiskClient::with_source(FloodRiskApi::new(base), StdRng::seed_from_u64(5))
}

fn sample_reading() -> FloodReading {
    FloodReading {
        location: "Peoria Lock".to_string(),
        flood_risk: RiskLevel::High,
        water_level: "4.8".to_string(),
        rainfall_mm: "42.3".to_string(),
        soil_moisture: "0.91".to_string(),
        temp: 18,
        humidity: 77,
        timestamp: "2024-05-01T12:00:00.000Z".to_string(),
        coordinates: Coordinate::new(40.69, -89.59),
        extra: Default::default(),
    }
}

#[tokio::test]
async fn current_risk_returns_server_reading() {
    let mut server = Server::new_async().await;
    let base = format!("{}/api", server.url());
    let reading = sample_reading();

    let m = server
        .mock("GET", "/api/get_flood_risk")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("lat".into(), "40.690000".into()),
            Matcher::UrlEncoded("lon".into(), "-89.590000".into()),
        ]))
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::to_string(&reading).unwrap())
        .create_async()
        .await;

    let got = flood_client(&base).fetch_current_risk(Coordinate::new(40.69, -89.59)).await;

    m.assert_async().await;
    assert_eq!(got, reading);
}

#[tokio::test]
async fn history_sends_region_and_days() {
    let mut server = Server::new_async().await;
    let points = vec![
        HistoricalPoint {
            timestamp: "2024-04-30T00:00:00Z".to_string(),
            water_level: "2.0".to_string(),
            rainfall_mm: "10.0".to_string(),
            soil_moisture: "0.40".to_string(),
            risk: RiskLevel::Low,
            extra: Default::default(),
        },
        HistoricalPoint {
            timestamp: "2024-05-01T00:00:00Z".to_string(),
            water_level: "3.1".to_string(),
            rainfall_mm: "22.5".to_string(),
            soil_moisture: "0.55".to_string(),
            risk: RiskLevel::Moderate,
            extra: Default::default(),
        },
    ];

    let m = server
        .mock("GET", "/get_historical_data")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("region".into(), "Illinois River".into()),
            Matcher::UrlEncoded("days".into(), "1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::to_string(&points).unwrap())
        .create_async()
        .await;

    let got = flood_client(&server.url()).fetch_history("Illinois River", 1).await;

    m.assert_async().await;
    assert_eq!(got, points);
}

#[tokio::test]
async fn risk_zones_send_plain_radius() {
    let mut server = Server::new_async().await;
    let zones = RiskZones {
        zones: vec![RiskZone {
            lat: 41.01,
            lon: -88.02,
            risk: RiskLevel::Critical,
            radius: 8.5,
            extra: Default::default(),
        }],
    };

    let m = server
        .mock("GET", "/get_risk_zones")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("lat".into(), "41.000000".into()),
            Matcher::UrlEncoded("lon".into(), "-88.000000".into()),
            Matcher::UrlEncoded("radius".into(), "50".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::to_string(&zones).unwrap())
        .create_async()
        .await;

    let got = flood_client(&server.url())
        .fetch_risk_zones(Coordinate::new(41.0, -88.0), floodmap_core::DEFAULT_ZONE_RADIUS_KM)
        .await;

    m.assert_async().await;
    assert_eq!(got, zones);
}

#[tokio::test]
async fn server_error_falls_back_to_mock_reading() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/get_flood_risk")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let at = Coordinate::new(40.0, -89.0);
    let got = flood_client(&server.url()).fetch_current_risk(at).await;

    assert_eq!(got.location, "Sample Location");
    assert_eq!(got.coordinates, at);
}

#[tokio::test]
async fn malformed_json_falls_back_to_mock_history() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/get_historical_data")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let got = flood_client(&server.url()).fetch_history("Fox River", 3).await;
    assert_eq!(got.len(), 4);
}

#[tokio::test]
async fn unreachable_backend_falls_back_to_mock_zones() {
    let RiskZones { zones } = flood_client(UNREACHABLE)
        .fetch_risk_zones(Coordinate::new(41.0, -88.0), 25.0)
        .await;

    assert!((3..=7).contains(&zones.len()));
    for z in zones {
        assert!(RiskLevel::ZONE_LEVELS.contains(&z.risk));
        assert!((1.0..6.0).contains(&z.radius));
    }
}

#[tokio::test]
async fn raw_api_reports_status_and_decode_errors() {
    let mut server = Server::new_async().await;
    let _status = server
        .mock("GET", "/get_flood_risk")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body("no such gauge")
        .create_async()
        .await;
    let _decode = server
        .mock("GET", "/get_risk_zones")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"zones": "nope"}"#)
        .create_async()
        .await;

    let api = FloodRiskApi::new(&server.url());

    let err = api.current_risk(Coordinate::new(0.0, 0.0)).await.unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
    assert!(err.to_string().contains("no such gauge"));

    let err = api.risk_zones(Coordinate::new(0.0, 0.0), 5.0).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode { .. }));
    assert_eq!(err.endpoint(), "get_risk_zones");
}

#[tokio::test]
async fn forecast_returns_payload_verbatim() {
    let mut server = Server::new_async().await;
    let body = json!({
        "name": "Havana",
        "main": { "temp": 27.4, "humidity": 70 },
        "weather": [{ "id": 801, "description": "few clouds" }],
        "extra": { "nested": [1, 2, 3] }
    });

    let m = server
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("lat".into(), "23.1136".into()),
            Matcher::UrlEncoded("lon".into(), "-82.3666".into()),
            Matcher::UrlEncoded("units".into(), "imperial".into()),
            Matcher::UrlEncoded("appid".into(), "TEST_KEY".into()),
        ]))
        .match_header("content-type", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let client = WeatherClient::new(&format!("{}/data/2.5/weather", server.url()), "TEST_KEY".into());
    let got = client
        .fetch_forecast(Coordinate::new(23.1136, -82.3666), Units::Imperial)
        .await
        .expect("stubbed forecast succeeds");

    m.assert_async().await;
    assert_eq!(got.into_inner(), body);
}

#[tokio::test]
async fn forecast_errors_are_not_masked() {
    let mut server = Server::new_async().await;
    let _unauthorized = server
        .mock("GET", "/unauthorized")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"cod":401,"message":"Invalid API key"}"#)
        .create_async()
        .await;
    let _garbled = server
        .mock("GET", "/garbled")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>")
        .create_async()
        .await;

    let at = Coordinate::new(0.0, 0.0);

    let client = WeatherClient::new(&format!("{}/unauthorized", server.url()), "BAD".into());
    let err = client.fetch_forecast(at, Units::Metric).await.unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::UNAUTHORIZED));

    let client = WeatherClient::new(&format!("{}/garbled", server.url()), "KEY".into());
    let err = client.fetch_forecast(at, Units::Metric).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode { .. }));

    let client = WeatherClient::new(UNREACHABLE, "KEY".into());
    let err = client.fetch_forecast(at, Units::Metric).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. }));
}
