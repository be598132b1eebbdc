//! Integration tests for the air quality lookup
//!
//! The real HTTP client runs against a local mock of the `OpenWeatherMap`
//! endpoints; every test asserts which requests were (not) made.

use airquality::config::ApiConfig;
use airquality::display::{self, RenderOptions};
use airquality::{ErrorCode, OpenWeatherClient, QueryController, QueryState};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate, Times};

fn api_config(server: &MockServer, key: Option<&str>) -> ApiConfig {
    ApiConfig {
        key: key.map(str::to_string),
        geo_base_url: format!("{}/geo/1.0", server.uri()),
        data_base_url: format!("{}/data/2.5", server.uri()),
        ..ApiConfig::default()
    }
}

fn controller(server: &MockServer) -> QueryController<OpenWeatherClient> {
    let client = OpenWeatherClient::new(api_config(server, Some("test-key"))).unwrap();
    QueryController::new(client)
}

fn london_geocode() -> serde_json::Value {
    json!([{
        "name": "London",
        "local_names": {"en": "London", "fr": "Londres"},
        "lat": 51.5073219,
        "lon": -0.1276474,
        "country": "GB",
        "state": "England"
    }])
}

fn london_pollution() -> serde_json::Value {
    json!({
        "coord": {"lon": -0.1276, "lat": 51.5073},
        "list": [{
            "main": {"aqi": 2},
            "components": {
                "co": 201.94, "no": 0.02, "no2": 15.42, "o3": 68.66,
                "so2": 0.64, "pm2_5": 8.0, "pm10": 11.3, "nh3": 0.12
            },
            "dt": 1605182400
        }]
    })
}

fn london_weather() -> serde_json::Value {
    json!({
        "name": "London",
        "sys": {"country": "GB"},
        "main": {"temp": 14.62, "humidity": 81},
        "wind": {"speed": 4.12},
        "visibility": 10000,
        "weather": [{"description": "broken clouds"}]
    })
}

async fn mount_geocode(server: &MockServer, body: serde_json::Value, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("limit", "1"))
        .and(query_param("appid", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_data(
    server: &MockServer,
    endpoint: &str,
    response: ResponseTemplate,
    expected: impl Into<Times>,
) {
    Mock::given(method("GET"))
        .and(path(format!("/data/2.5/{endpoint}")))
        .respond_with(response)
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_london_end_to_end() {
    let server = MockServer::start().await;
    mount_geocode(&server, london_geocode(), 1).await;
    mount_data(
        &server,
        "air_pollution",
        ResponseTemplate::new(200).set_body_json(london_pollution()),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_weather()))
        .expect(1)
        .mount(&server)
        .await;

    let controller = controller(&server);
    let state = controller.submit("London").await.unwrap();

    assert!(state.error.is_none(), "unexpected error: {:?}", state.error);
    let index = state.index.as_ref().unwrap();
    assert_eq!(index.value, 33);
    assert_eq!(state.status.label, "Good");
    assert_eq!(state.location.as_ref().unwrap().country.as_deref(), Some("GB"));

    let weather = state.weather.as_ref().unwrap();
    assert_eq!(weather.format_visibility(), "10 km");
    assert_eq!(weather.format_temperature(), "15°C");

    let text = display::render(
        &state,
        &RenderOptions {
            color: false,
            json: false,
        },
    );
    assert!(text.contains("London, GB"));
    assert!(text.contains("CO 0.20 mg/m³"));
}

#[tokio::test]
async fn test_empty_city_makes_no_requests() {
    let server = MockServer::start().await;
    mount_geocode(&server, london_geocode(), 0).await;

    let state = controller(&server).submit("").await.unwrap();

    let error = state.error.unwrap();
    assert_eq!(error.code, ErrorCode::InputEmptyCity);
    assert_eq!(error.message, "Please enter a city name.");
}

#[tokio::test]
async fn test_unknown_city_skips_environment_requests() {
    let server = MockServer::start().await;
    mount_geocode(&server, json!([]), 1).await;
    mount_data(&server, "air_pollution", ResponseTemplate::new(200), 0).await;
    mount_data(&server, "weather", ResponseTemplate::new(200), 0).await;

    let state = controller(&server).submit("Atlantis").await.unwrap();

    let error = state.error.unwrap();
    assert_eq!(error.code, ErrorCode::ApiLocationNotFound);
    assert_eq!(
        error.message,
        "City not found. Please check the spelling and try again."
    );
}

#[tokio::test]
async fn test_rate_limited_pollution_discards_weather() {
    let server = MockServer::start().await;
    mount_geocode(&server, london_geocode(), 1).await;
    mount_data(
        &server,
        "air_pollution",
        ResponseTemplate::new(429).set_body_json(json!({"cod": 429, "message": "limit"})),
        1,
    )
    .await;
    mount_data(
        &server,
        "weather",
        ResponseTemplate::new(200).set_body_json(london_weather()),
        // Issued concurrently; may be dropped before it reaches the server
        0..=1,
    )
    .await;

    let state = controller(&server).submit("London").await.unwrap();

    assert_eq!(state.error.as_ref().unwrap().code, ErrorCode::ApiRateLimit);
    assert!(state.weather.is_none());
    assert!(state.index.is_none());
    assert_eq!(state.status.label, "--");
}

#[tokio::test]
async fn test_invalid_key_on_geocoding() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({
                "cod": 401,
                "message": "Invalid API key. Please see https://openweathermap.org/faq#error401 for more info."
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let state = controller(&server).submit("London").await.unwrap();

    let error = state.error.unwrap();
    assert_eq!(error.code, ErrorCode::ApiUnauthorized);
    assert_eq!(
        error.message,
        "Invalid API key. Please check your OpenWeatherMap API key."
    );
}

#[tokio::test]
async fn test_upstream_error_message() {
    let server = MockServer::start().await;
    mount_geocode(&server, london_geocode(), 1).await;
    mount_data(
        &server,
        "air_pollution",
        ResponseTemplate::new(200).set_body_json(london_pollution()),
        0..=1,
    )
    .await;
    mount_data(
        &server,
        "weather",
        ResponseTemplate::new(500).set_body_json(json!({"cod": "500", "message": "Internal error"})),
        1,
    )
    .await;

    let state = controller(&server).submit("London").await.unwrap();

    let error = state.error.unwrap();
    assert_eq!(error.code, ErrorCode::ApiUpstreamError);
    assert_eq!(error.message, "API Error (500): Internal error");
}

#[tokio::test]
async fn test_upstream_error_without_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let state = controller(&server).submit("London").await.unwrap();

    assert_eq!(
        state.error.unwrap().message,
        "API Error (503): Unknown API error"
    );
}

#[tokio::test]
async fn test_unreachable_upstream_is_network_error() {
    // Nothing listens on the discard port
    let api = ApiConfig {
        key: Some("test-key".to_string()),
        geo_base_url: "http://127.0.0.1:9/geo/1.0".to_string(),
        data_base_url: "http://127.0.0.1:9/data/2.5".to_string(),
        timeout_seconds: 5,
        ..ApiConfig::default()
    };
    let controller = QueryController::new(OpenWeatherClient::new(api).unwrap());

    let state = controller.submit("London").await.unwrap();

    let error = state.error.unwrap();
    assert_eq!(error.code, ErrorCode::ApiNetworkError);
    assert_eq!(
        error.message,
        "Network error. Please check your internet connection."
    );
    assert!(state.location.is_none());
    assert!(state.weather.is_none());
}

#[tokio::test]
async fn test_missing_key_is_configuration_error() {
    let server = MockServer::start().await;
    mount_geocode(&server, london_geocode(), 0).await;

    let client = OpenWeatherClient::new(api_config(&server, None)).unwrap();
    let controller = QueryController::new(client);
    let state = controller.submit("London").await.unwrap();

    let error = state.error.unwrap();
    assert_eq!(error.code, ErrorCode::ConfigError);
    assert!(error.message.contains("API key is missing"));
}

#[tokio::test]
async fn test_next_query_replaces_failed_state() {
    let server = MockServer::start().await;
    mount_geocode(&server, london_geocode(), 1).await;
    mount_data(
        &server,
        "air_pollution",
        ResponseTemplate::new(200).set_body_json(london_pollution()),
        1,
    )
    .await;
    mount_data(
        &server,
        "weather",
        ResponseTemplate::new(200).set_body_json(london_weather()),
        1,
    )
    .await;

    let controller = controller(&server);
    let failed = controller.submit("  ").await.unwrap();
    assert!(failed.is_error());

    let state: QueryState = controller.submit("London").await.unwrap();
    assert_eq!(state.sequence, 2);
    assert!(state.error.is_none());
    assert_eq!(controller.current().index.unwrap().value, 33);
}
