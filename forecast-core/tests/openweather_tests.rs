//! OpenWeather provider against a mock HTTP server.

use forecast_core::{Coordinates, OpenWeatherProvider, Query, WeatherProvider};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn london_body() -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": -0.1257, "lat": 51.5085 },
        "weather": [{ "id": 804, "main": "Clouds", "description": "overcast clouds", "icon": "04d" }],
        "main": {
            "temp": 16.2, "feels_like": 15.4, "temp_min": 14.9, "temp_max": 17.3,
            "pressure": 1012, "humidity": 70
        },
        "visibility": 10000,
        "wind": { "speed": 3.09, "deg": 240 },
        "clouds": { "all": 100 },
        "dt": 1_700_000_000,
        "sys": { "country": "GB", "sunrise": 1_699_975_000, "sunset": 1_700_008_000 },
        "name": "London",
        "cod": 200
    })
}

fn provider_for(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::with_base_url("TEST_KEY".to_string(), server.uri())
}

#[tokio::test]
async fn city_lookup_sends_metric_query_and_maps_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "London"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let snap = provider
        .current(&Query::City("London".into()))
        .await
        .expect("lookup should succeed");

    assert_eq!(snap.location_label(), "London, GB");
    assert_eq!(snap.rounded_temperature(), 16);
    assert_eq!(snap.condition, "Clouds");
    assert_eq!(snap.description, "overcast clouds");
    assert_eq!(snap.pressure_hpa, Some(1012.0));
    assert_eq!(snap.visibility_km(), Some(10));
    assert_eq!(snap.cloud_cover_pct, Some(100));
    assert_eq!(snap.wind_speed_kmh(), 11);
}

#[tokio::test]
async fn coordinate_lookup_sends_lat_lon() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "51.5"))
        .and(query_param("lon", "-0.12"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let coords = Coordinates::new(51.5, -0.12).expect("valid coordinates");
    let snap = provider
        .current(&Query::Coordinates(coords))
        .await
        .expect("lookup should succeed");

    assert_eq!(snap.location_name, "London");
    assert!(snap.sun_times().is_some());
}

#[tokio::test]
async fn not_found_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
        )
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let err = provider
        .current(&Query::City("Zzzzznotacity".into()))
        .await
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("404"), "unexpected error: {msg}");
    assert!(msg.contains("city not found"));
}

#[tokio::test]
async fn body_without_weather_array_is_an_error() {
    let server = MockServer::start().await;
    let mut body = london_body();
    body.as_object_mut()
        .expect("object body")
        .remove("weather");

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let err = provider
        .current(&Query::City("London".into()))
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("Failed to parse OpenWeather current JSON"));
}

#[tokio::test]
async fn non_json_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    assert!(provider.current(&Query::City("London".into())).await.is_err());
}
