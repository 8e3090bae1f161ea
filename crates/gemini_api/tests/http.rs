use gemini_api::{normalize_gemini_url, Content, GeminiApiClient, GeminiApiConfig, GenerateContentRequest};

#[test]
fn http_request_builds_stream_endpoint_with_key_header() {
    let config = GeminiApiConfig::new("key-123").with_base_url("https://proxy.example");
    let client = GeminiApiClient::new(config).expect("client");
    let request = GenerateContentRequest::new(None, vec![Content::user("payload")]);

    let http_request = client
        .build_request(&request)
        .expect("build request")
        .build()
        .expect("request");

    assert_eq!(
        http_request.url().as_str(),
        normalize_gemini_url("https://proxy.example", "gemini-2.5-flash")
    );
    assert_eq!(http_request.method(), "POST");
    assert_eq!(
        http_request
            .headers()
            .get("x-goog-api-key")
            .and_then(|value| value.to_str().ok()),
        Some("key-123")
    );
}

#[test]
fn http_request_model_override_changes_only_the_url() {
    let config = GeminiApiConfig::new("key").with_model("gemini-2.5-flash");
    let client = GeminiApiClient::new(config).expect("client");
    let request =
        GenerateContentRequest::new(None, vec![Content::user("payload")]).with_model("gemini-2.5-pro");

    let http_request = client
        .build_request(&request)
        .expect("build request")
        .build()
        .expect("request");

    assert!(http_request
        .url()
        .as_str()
        .contains("/models/gemini-2.5-pro:streamGenerateContent"));
    assert_eq!(client.config().model, "gemini-2.5-flash");
}

#[test]
fn http_request_rejects_empty_contents() {
    let client = GeminiApiClient::new(GeminiApiConfig::new("key")).expect("client");
    let request = GenerateContentRequest::new(Some("sys".to_string()), Vec::new());

    assert!(client.build_request(&request).is_err());
}
