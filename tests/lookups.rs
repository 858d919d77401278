//! External lookups against mocked HTTP services

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use travel_companion::encyclopedia::{EncyclopediaClient, EncyclopediaError, NO_SUMMARY};
use travel_companion::location::{Geocoder, NominatimGeocoder};
use travel_companion::places::{
    self, PlacesClient, PlacesError, LOCATION_NOT_FOUND, NO_ATTRACTIONS,
};
use travel_companion::weather::{
    Temperature, WeatherClient, WeatherReport, UNAVAILABLE_DESCRIPTION, UNAVAILABLE_TEMPERATURE,
};

async fn mount_geocode(server: &MockServer, city: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("address", city))
        .and(query_param("key", "places-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_nearby(server: &MockServer, names: &[&str]) {
    let results: Vec<_> = names.iter().map(|n| json!({ "name": n })).collect();
    Mock::given(method("GET"))
        .and(path("/maps/api/place/nearbysearch/json"))
        .and(query_param("location", "48.8566,2.3522"))
        .and(query_param("radius", "2000"))
        .and(query_param("type", "tourist_attraction"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": results })))
        .mount(server)
        .await;
}

fn paris_geocode() -> serde_json::Value {
    json!({
        "results": [{ "geometry": { "location": { "lat": 48.8566, "lng": 2.3522 } } }],
        "status": "OK"
    })
}

#[tokio::test]
async fn weather_parses_description_and_temperature() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Paris"))
        .and(query_param("appid", "weather-key"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "weather": [{ "main": "Clouds", "description": "broken clouds" }],
            "main": { "temp": 18.3, "humidity": 60 }
        })))
        .mount(&server)
        .await;

    let client = WeatherClient::new(reqwest::Client::new()).with_base_url(server.uri());
    let report = client.current("Paris", "weather-key").await.unwrap();

    assert_eq!(report.description, "broken clouds");
    assert_eq!(report.temperature, Temperature::Celsius(18.3));
}

#[tokio::test]
async fn weather_without_weather_key_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "cod": "404", "message": "city not found" })),
        )
        .mount(&server)
        .await;

    let client = WeatherClient::new(reqwest::Client::new()).with_base_url(server.uri());
    let report = WeatherReport::or_unavailable(client.current("Atlantis", "weather-key").await);

    assert_eq!(report.description, UNAVAILABLE_DESCRIPTION);
    assert_eq!(report.temperature, Temperature::Unavailable);
    assert_eq!(report.temperature.to_string(), UNAVAILABLE_TEMPERATURE);
}

#[tokio::test]
async fn weather_malformed_body_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = WeatherClient::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = client.current("Paris", "weather-key").await;

    assert!(result.is_err());
    assert_eq!(WeatherReport::or_unavailable(result), WeatherReport::unavailable());
}

#[tokio::test]
async fn places_returns_at_most_five_names() {
    let server = MockServer::start().await;
    mount_geocode(&server, "Paris", paris_geocode()).await;
    mount_nearby(
        &server,
        &["Louvre", "Notre-Dame", "Sainte-Chapelle", "Pont Neuf", "Panthéon", "Musée d'Orsay", "Tuileries"],
    )
    .await;

    let client = PlacesClient::new(reqwest::Client::new()).with_base_url(server.uri());
    let names = client.nearby_attractions("Paris", "places-key").await.unwrap();

    assert_eq!(
        names,
        vec!["Louvre", "Notre-Dame", "Sainte-Chapelle", "Pont Neuf", "Panthéon"]
    );
}

#[tokio::test]
async fn places_empty_geocode_is_location_not_found() {
    let server = MockServer::start().await;
    mount_geocode(&server, "Nowhere", json!({ "results": [], "status": "ZERO_RESULTS" })).await;
    Mock::given(method("GET"))
        .and(path("/maps/api/place/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let client = PlacesClient::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = client.nearby_attractions("Nowhere", "places-key").await;

    assert!(matches!(result, Err(PlacesError::LocationNotFound(_))));
    assert_eq!(places::names_or_sentinel(result), vec![LOCATION_NOT_FOUND]);
}

#[tokio::test]
async fn places_empty_search_is_no_attractions() {
    let server = MockServer::start().await;
    mount_geocode(&server, "Paris", paris_geocode()).await;
    mount_nearby(&server, &[]).await;

    let client = PlacesClient::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = client.nearby_attractions("Paris", "places-key").await;

    assert!(matches!(result, Err(PlacesError::NoAttractions(_))));
    assert_eq!(places::names_or_sentinel(result), vec![NO_ATTRACTIONS]);
}

#[tokio::test]
async fn places_malformed_geocode_is_location_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let client = PlacesClient::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = client.nearby_attractions("Paris", "places-key").await;

    assert!(matches!(result, Err(PlacesError::Parse(_))));
    assert_eq!(places::names_or_sentinel(result), vec![LOCATION_NOT_FOUND]);
}

async fn mount_search(server: &MockServer, subject: &str, titles: &[&str]) {
    let hits: Vec<_> = titles.iter().map(|t| json!({ "ns": 0, "title": t })).collect();
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("list", "search"))
        .and(query_param("srsearch", subject))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "query": { "search": hits } })))
        .mount(server)
        .await;
}

async fn mount_extract(server: &MockServer, title: &str, page: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "extracts|pageprops"))
        .and(query_param("titles", title))
        .and(query_param("exsentences", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "query": { "pages": [page] } })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn encyclopedia_returns_extract() {
    let server = MockServer::start().await;
    mount_search(&server, "Big Ben at night", &["Big Ben"]).await;
    mount_extract(
        &server,
        "Big Ben",
        json!({
            "pageid": 1, "title": "Big Ben",
            "extract": "Big Ben is the nickname for the Great Bell of the Great Clock of Westminster."
        }),
    )
    .await;

    let client = EncyclopediaClient::new(reqwest::Client::new()).with_base_url(server.uri());
    let summary = client.summary("Big Ben at night").await.unwrap();

    assert!(summary.starts_with("Big Ben is the nickname"));
}

#[tokio::test]
async fn encyclopedia_disambiguation_is_an_error() {
    let server = MockServer::start().await;
    mount_search(&server, "Mercury", &["Mercury"]).await;
    mount_extract(
        &server,
        "Mercury",
        json!({
            "pageid": 2, "title": "Mercury",
            "extract": "Mercury may refer to:",
            "pageprops": { "disambiguation": "" }
        }),
    )
    .await;

    let client = EncyclopediaClient::new(reqwest::Client::new()).with_base_url(server.uri());
    let err = client.summary("Mercury").await.unwrap_err();

    assert!(matches!(err, EncyclopediaError::Disambiguation(ref t) if t == "Mercury"));
}

#[tokio::test]
async fn encyclopedia_no_search_hits_is_page_not_found() {
    let server = MockServer::start().await;
    mount_search(&server, "qwxzzy", &[]).await;

    let client = EncyclopediaClient::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = client.summary("qwxzzy").await;

    assert!(matches!(result, Err(EncyclopediaError::PageNotFound(_))));
    assert_eq!(result.unwrap_or_else(|_| NO_SUMMARY.to_string()), NO_SUMMARY);
}

#[tokio::test]
async fn nominatim_returns_display_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "a tram on a hill in Lisbon"))
        .and(query_param("format", "json"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "display_name": "Lisboa, Grande Lisboa, Portugal", "lat": "38.7", "lon": "-9.1" }
        ])))
        .mount(&server)
        .await;

    let geocoder = NominatimGeocoder::new(reqwest::Client::new()).with_base_url(server.uri());
    let address = geocoder.lookup("a tram on a hill in Lisbon").await.unwrap();

    assert_eq!(address.as_deref(), Some("Lisboa, Grande Lisboa, Portugal"));
}

#[tokio::test]
async fn nominatim_empty_result_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let geocoder = NominatimGeocoder::new(reqwest::Client::new()).with_base_url(server.uri());
    assert_eq!(geocoder.lookup("a bowl of fruit").await.unwrap(), None);
}
