//! End-to-end tests of the orchestrator against a mocked OpenWeatherMap API.

use chrono::{DateTime, Utc};
use weather_dash_core::{
    Config, QueryErrorKind, WeatherError, WeatherQuery, WeatherService,
    group_by_day_in, temperature_trend,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn paris_current() -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": 2.3488, "lat": 48.8534 },
        "weather": [{ "id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d" }],
        "base": "stations",
        "main": { "temp": 18.2, "feels_like": 17.5, "temp_min": 16.9, "temp_max": 19.4,
                  "pressure": 1012, "humidity": 60 },
        "visibility": 10000,
        "wind": { "speed": 3.0, "deg": 240 },
        "dt": 1_760_954_400,
        "sys": { "country": "FR", "sunrise": 1_760_940_000, "sunset": 1_760_978_000 },
        "timezone": 7200,
        "id": 2_988_507,
        "name": "Paris",
        "cod": 200
    })
}

/// Forty three-hour samples starting at local midnight (UTC+2).
fn paris_forecast() -> serde_json::Value {
    let start = DateTime::parse_from_rfc3339("2025-10-19T22:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
        .timestamp();

    let list: Vec<_> = (0..40)
        .map(|i| {
            let temp = 12.0 + ((i % 8) as f64 - 3.5).abs() * -1.1 + (i / 8) as f64;
            let (main, description, icon) = if i % 8 < 4 {
                ("Clear", "clear sky", "01n")
            } else {
                ("Rain", "light rain", "10d")
            };
            serde_json::json!({
                "dt": start + i * 3 * 3600,
                "main": { "temp": temp, "feels_like": temp - 0.5, "humidity": 70, "pressure": 1010 },
                "weather": [{ "id": 800, "main": main, "description": description, "icon": icon }],
                "wind": { "speed": 4.2, "deg": 200 },
                "dt_txt": "ignored"
            })
        })
        .collect();

    serde_json::json!({
        "cod": "200",
        "message": 0,
        "cnt": 40,
        "list": list,
        "city": { "id": 2_988_507, "name": "Paris", "country": "FR", "timezone": 7200 }
    })
}

fn config_for(server: &MockServer) -> Config {
    let mut cfg = Config::default();
    cfg.set_api_key("test_key".to_string());
    cfg.base_url = server.uri();
    cfg.retry_delay_ms = 1;
    cfg
}

async fn mount_paris(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_current()))
        .expect(expected_calls)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", "Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_forecast()))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn cold_cache_fetches_both_and_aggregates_five_days() {
    let server = MockServer::start().await;
    mount_paris(&server, 1).await;

    let mut svc = WeatherService::from_config(&config_for(&server)).unwrap();
    let report = svc.get_weather(&WeatherQuery::place("Paris").unwrap()).await.unwrap();

    assert_eq!(report.current.location_label(), "Paris, FR");
    assert_eq!(report.current.main.temp, 18.2);
    assert_eq!(report.current.main.feels_like, 17.5);
    assert_eq!(report.current.main.humidity, 60);
    assert_eq!(report.current.wind.speed, 3.0);
    assert_eq!(report.current.main.pressure, 1012.0);

    let offset = report.forecast.city_offset().unwrap();
    let buckets = group_by_day_in(&report.forecast.samples(), &offset);
    assert_eq!(buckets.len(), 5);
    for pair in buckets.windows(2) {
        assert!(pair[0].date < pair[1].date);
    }
    for b in &buckets {
        assert_eq!(b.condition.description, "clear sky");
        assert!(b.min_temp() <= b.avg_temp() && b.avg_temp() <= b.max_temp());
    }
    assert_eq!(temperature_trend(&buckets, 5).len(), 5);
}

#[tokio::test]
async fn repeated_query_is_served_from_cache() {
    let server = MockServer::start().await;
    mount_paris(&server, 1).await;

    let mut svc = WeatherService::from_config(&config_for(&server)).unwrap();

    let first = svc.get_weather(&WeatherQuery::place("Paris").unwrap()).await.unwrap();
    let second = svc.get_weather(&WeatherQuery::place("Paris").unwrap()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn not_found_is_classified_and_skips_forecast() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_forecast()))
        .expect(0)
        .mount(&server)
        .await;

    let mut svc = WeatherService::from_config(&config_for(&server)).unwrap();
    let err = svc.get_weather(&WeatherQuery::place("Atlantis").unwrap()).await.unwrap_err();

    assert_eq!(err.query_kind(), Some(QueryErrorKind::NotFound));
    assert!(err.user_message().contains("City not found"));
}

#[tokio::test]
async fn coordinate_queries_use_lat_lon() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "48.8534"))
        .and(query_param("lon", "2.3488"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_current()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("lat", "48.8534"))
        .and(query_param("lon", "2.3488"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_forecast()))
        .expect(1)
        .mount(&server)
        .await;

    let mut svc = WeatherService::from_config(&config_for(&server)).unwrap();
    let report = svc
        .get_weather(&WeatherQuery::coordinates(48.8534, 2.3488).unwrap())
        .await
        .unwrap();

    assert_eq!(report.current.name, "Paris");
}

#[tokio::test]
async fn unreachable_provider_exhausts_attempts() {
    let mut cfg = Config::default();
    cfg.set_api_key("test_key".to_string());
    cfg.base_url = "http://127.0.0.1:1".to_string();
    cfg.max_attempts = 3;
    cfg.retry_delay_ms = 1;

    let mut svc = WeatherService::from_config(&cfg).unwrap();
    let err = svc.get_weather(&WeatherQuery::place("Paris").unwrap()).await.unwrap_err();

    assert!(matches!(err, WeatherError::Transport { attempts: 3, .. }));
    assert!(svc.cache().is_empty());
}
