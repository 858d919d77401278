//! Gemini-backed captioner and entity recognizer against a mocked API

use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgb};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use travel_companion::models::{
    Entity, EntityRecognizer, GeminiCaptioner, GeminiClient, GeminiRecognizer, ImageCaptioner,
    ModelError,
};

const MODEL: &str = "gemini-2.5-flash";
const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn client(server: &MockServer) -> GeminiClient {
    GeminiClient::new(reqwest::Client::new(), "test-key", MODEL).with_base_url(server.uri())
}

fn candidate(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }]
    })
}

fn png() -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(8, 8, Rgb([30, 90, 200]));
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut out), ImageOutputFormat::Png)
        .unwrap();
    out
}

#[tokio::test]
async fn captioner_sends_jpeg_and_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "test-key"))
        .and(body_string_contains("image/jpeg"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate("  The Eiffel Tower at sunset in Paris.\n")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let captioner = GeminiCaptioner::new(client(&server));
    let caption = captioner.caption(&png()).await.unwrap();

    assert_eq!(caption, "The Eiffel Tower at sunset in Paris.");
    assert!(captioner.name().contains(MODEL));
}

#[tokio::test]
async fn captioner_propagates_api_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let captioner = GeminiCaptioner::new(client(&server));
    let err = captioner.caption(&png()).await.unwrap_err();

    assert!(matches!(err, ModelError::Api(403, ref body) if body.contains("not valid")));
}

#[tokio::test]
async fn captioner_rejects_undecodable_image_without_calling_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let captioner = GeminiCaptioner::new(client(&server));
    let err = captioner.caption(b"GIF89a-truncated").await.unwrap_err();

    assert!(matches!(err, ModelError::Image(_)));
}

#[tokio::test]
async fn captioner_missing_candidates_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let captioner = GeminiCaptioner::new(client(&server));
    let err = captioner.caption(&png()).await.unwrap_err();

    assert!(matches!(err, ModelError::EmptyResponse));
}

#[tokio::test]
async fn recognizer_requests_json_and_parses_entities() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("application/json"))
        .and(body_string_contains("A photo near Berlin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(
            r#"[{"text":"Berlin","label":"GPE"}]"#,
        )))
        .mount(&server)
        .await;

    let recognizer = GeminiRecognizer::new(client(&server));
    let entities = recognizer.entities("A photo near Berlin").await.unwrap();

    assert_eq!(entities, vec![Entity::new("Berlin", "GPE")]);
}
