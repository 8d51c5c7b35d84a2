//! Dispatcher tests against a mocked Ark endpoint.
//!
//! Each generation mode is driven through `ImageHandler` with the base URL
//! pointed at a `wiremock` server, so request bodies, headers and call counts
//! can be asserted without network access.

use ark_mcp_common::config::Config;
use ark_mcp_image::handler::{
    GenerateImageParams, ImageHandler, ImageSequenceParams, ReferenceImageParams, DEFAULT_IMAGE_SIZE,
    DEFAULT_PIXEL_SIZE,
};
use ark_mcp_image::GenerationResult;
use serde_json::{json, Value};
use wiremock::matchers::{any, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY: &str = "test-ark-key";
const MODEL: &str = "ep-test-model";
const GENERATIONS_PATH: &str = "/api/v3/images/generations";

fn handler_for(server: &MockServer, fallback_key: Option<&str>) -> ImageHandler {
    let config = Config::default()
        .with_base_url(format!("{}/api/v3", server.uri()))
        .with_api_key(fallback_key.map(str::to_string));
    ImageHandler::new(config).expect("handler should build")
}

/// Handler whose endpoint refuses connections.
fn unreachable_handler() -> ImageHandler {
    let config = Config::default()
        .with_base_url("http://127.0.0.1:1/api/v3")
        .with_api_key(Some(TEST_KEY.to_string()));
    ImageHandler::new(config).expect("handler should build")
}

fn text_params(api_key: Option<&str>) -> GenerateImageParams {
    GenerateImageParams {
        prompt: "a red fox in snow".to_string(),
        api_key: api_key.map(str::to_string),
        model: MODEL.to_string(),
        size: DEFAULT_IMAGE_SIZE.to_string(),
        watermark: true,
    }
}

fn reference_params(api_key: Option<&str>) -> ReferenceImageParams {
    ReferenceImageParams {
        prompt: "the same fox as a watercolor".to_string(),
        reference_image_url: "https://example.com/fox.png".to_string(),
        api_key: api_key.map(str::to_string),
        model: MODEL.to_string(),
        size: DEFAULT_PIXEL_SIZE.to_string(),
    }
}

fn sequence_params(api_key: Option<&str>, max_images: i64) -> ImageSequenceParams {
    ImageSequenceParams {
        prompt: "a fox through four seasons".to_string(),
        api_key: api_key.map(str::to_string),
        model: MODEL.to_string(),
        size: DEFAULT_PIXEL_SIZE.to_string(),
        max_images,
    }
}

fn vendor_body(urls: &[&str]) -> Value {
    json!({
        "model": MODEL,
        "created": 1_760_000_000,
        "data": urls.iter().map(|u| json!({"url": u, "size": "2048x2048"})).collect::<Vec<_>>(),
        "usage": {"generated_images": urls.len(), "output_tokens": 16384, "total_tokens": 16384}
    })
}

fn assert_failure(result: &GenerationResult) {
    assert!(!result.is_success(), "expected failure, got {:?}", result);
    assert!(result.data().is_none(), "failure must not carry data");
    assert!(
        result.error().is_some_and(|e| !e.is_empty()),
        "failure must carry a non-empty error"
    );
}

fn assert_success(result: &GenerationResult) {
    assert!(result.is_success(), "expected success, got {:?}", result);
    assert!(result.data().is_some(), "success must carry data");
    assert!(result.error().is_none(), "success must not carry an error");
}

mod missing_credential {
    use super::*;

    async fn server_expecting_no_calls() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn generate_image_fails_without_request() {
        let server = server_expecting_no_calls().await;
        let result = handler_for(&server, None).generate_image(text_params(None)).await;

        assert_failure(&result);
        assert!(result.error().unwrap().contains("API key not provided"));
        server.verify().await;
    }

    #[tokio::test]
    async fn reference_fails_without_request() {
        let server = server_expecting_no_calls().await;
        let result = handler_for(&server, None)
            .generate_image_with_reference(reference_params(None))
            .await;

        assert_failure(&result);
        assert!(result.error().unwrap().contains("API key not provided"));
        server.verify().await;
    }

    #[tokio::test]
    async fn sequence_fails_without_request() {
        let server = server_expecting_no_calls().await;
        let result = handler_for(&server, None)
            .generate_image_sequence(sequence_params(Some(""), 4))
            .await;

        assert_failure(&result);
        assert!(result.error().unwrap().contains("API key not provided"));
        server.verify().await;
    }
}

mod success {
    use super::*;

    #[tokio::test]
    async fn generate_image_extracts_first_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATIONS_PATH))
            .and(header("Authorization", format!("Bearer {}", TEST_KEY).as_str()))
            .and(header("Content-Type", "application/json"))
            .and(body_partial_json(json!({
                "model": MODEL,
                "prompt": "a red fox in snow",
                "size": "2K",
                "response_format": "url",
                "watermark": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(vendor_body(&["https://cdn/fox.jpeg"])))
            .expect(1)
            .mount(&server)
            .await;

        let result = handler_for(&server, None).generate_image(text_params(Some(TEST_KEY))).await;

        assert_success(&result);
        assert_eq!(
            result.data(),
            Some(&json!({
                "url": "https://cdn/fox.jpeg",
                "model": MODEL,
                "size": "2K",
                "watermark": true
            }))
        );
        assert_eq!(result.message(), "Image generated successfully");
    }

    #[tokio::test]
    async fn fallback_key_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer env-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vendor_body(&["https://cdn/1.jpeg"])))
            .expect(1)
            .mount(&server)
            .await;

        let result = handler_for(&server, Some("env-key")).generate_image(text_params(None)).await;
        assert_success(&result);
    }

    #[tokio::test]
    async fn reference_passes_body_through() {
        let server = MockServer::start().await;
        let body = vendor_body(&["https://cdn/fox-watercolor.jpeg"]);
        Mock::given(method("POST"))
            .and(path(GENERATIONS_PATH))
            .and(header("Authorization", format!("Bearer {}", TEST_KEY).as_str()))
            .and(body_partial_json(json!({
                "image": "https://example.com/fox.png",
                "size": "2048x2048",
                "sequential_image_generation": "disabled",
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let result = handler_for(&server, None)
            .generate_image_with_reference(reference_params(Some(TEST_KEY)))
            .await;

        assert_success(&result);
        assert_eq!(result.data(), Some(&body));
    }

    #[tokio::test]
    async fn reference_does_not_validate_body_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": [1, 2, 3]})))
            .mount(&server)
            .await;

        let result = handler_for(&server, Some(TEST_KEY))
            .generate_image_with_reference(reference_params(None))
            .await;

        assert_success(&result);
        assert_eq!(result.data(), Some(&json!({"unexpected": [1, 2, 3]})));
    }

    #[tokio::test]
    async fn sequence_passes_body_through() {
        let server = MockServer::start().await;
        let body = vendor_body(&["https://cdn/spring.jpeg", "https://cdn/summer.jpeg"]);
        Mock::given(method("POST"))
            .and(path(GENERATIONS_PATH))
            .and(body_partial_json(json!({
                "sequential_image_generation": "auto",
                "sequential_image_generation_options": {"max_images": 4},
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let result = handler_for(&server, Some(TEST_KEY))
            .generate_image_sequence(sequence_params(None, 4))
            .await;

        assert_success(&result);
        assert_eq!(result.data(), Some(&body));
        assert!(result.message().contains('4'));
    }
}

mod clamping {
    use super::*;

    async fn expect_max_images(requested: i64, sent: u32) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "sequential_image_generation_options": {"max_images": sent}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(vendor_body(&["https://cdn/1.jpeg"])))
            .expect(1)
            .mount(&server)
            .await;

        let result = handler_for(&server, Some(TEST_KEY))
            .generate_image_sequence(sequence_params(None, requested))
            .await;

        assert_success(&result);
        server.verify().await;
    }

    #[tokio::test]
    async fn large_request_is_clamped_to_fifteen() {
        expect_max_images(100, 15).await;
    }

    #[tokio::test]
    async fn boundary_value_is_kept() {
        expect_max_images(15, 15).await;
    }

    #[tokio::test]
    async fn single_image_passes_through() {
        expect_max_images(1, 1).await;
    }

    #[tokio::test]
    async fn negative_request_is_raised_to_one() {
        expect_max_images(-1, 1).await;
    }
}

mod transport_failure {
    use super::*;

    async fn failing_server(status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn generate_image_non_2xx() {
        let server = failing_server(401, r#"{"error":{"code":"AuthenticationError"}}"#).await;
        let result = handler_for(&server, Some(TEST_KEY)).generate_image(text_params(None)).await;

        assert_failure(&result);
        let error = result.error().unwrap();
        assert!(error.contains("401"), "{}", error);
        assert!(error.contains("AuthenticationError"), "{}", error);
        assert_eq!(result.message(), "Image generation failed");
    }

    #[tokio::test]
    async fn reference_non_2xx() {
        let server = failing_server(500, "internal error").await;
        let result = handler_for(&server, Some(TEST_KEY))
            .generate_image_with_reference(reference_params(None))
            .await;

        assert_failure(&result);
        assert!(result.error().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn sequence_non_2xx() {
        let server = failing_server(429, "rate limited").await;
        let result = handler_for(&server, Some(TEST_KEY))
            .generate_image_sequence(sequence_params(None, 4))
            .await;

        assert_failure(&result);
        assert!(result.error().unwrap().contains("429"));
    }

    #[tokio::test]
    async fn connection_refused_for_every_mode() {
        let handler = unreachable_handler();

        assert_failure(&handler.generate_image(text_params(None)).await);
        assert_failure(&handler.generate_image_with_reference(reference_params(None)).await);
        assert_failure(&handler.generate_image_sequence(sequence_params(None, 2)).await);
    }
}

mod malformed_response {
    use super::*;

    #[tokio::test]
    async fn generate_image_without_url_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let result = handler_for(&server, Some(TEST_KEY)).generate_image(text_params(None)).await;

        assert_failure(&result);
        assert!(result.error().unwrap().contains("data[0].url"));
    }

    #[tokio::test]
    async fn non_json_success_body_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let result = handler_for(&server, Some(TEST_KEY))
            .generate_image_sequence(sequence_params(None, 3))
            .await;

        assert_failure(&result);
        assert!(result.error().unwrap().contains("Malformed response"));
    }
}
