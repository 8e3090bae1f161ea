/// Default base URL for Gemini transport requests.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Model used when the caller does not pick one.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

const DEFAULT_API_VERSION: &str = "v1beta";

/// Normalize a base URL and model into a streaming generate-content endpoint.
///
/// Normalization rules:
/// 1) keep an explicit `/v1` or `/v1beta` version segment
/// 2) append `/v1beta` otherwise
/// 3) strip a leading `models/` from the model id
pub fn normalize_gemini_url(base_url: &str, model: &str) -> String {
    let base = if base_url.trim().is_empty() {
        DEFAULT_GEMINI_BASE_URL
    } else {
        base_url.trim()
    };
    let base = base.trim_end_matches('/');

    let versioned = if base.ends_with("/v1beta") || base.ends_with("/v1") {
        base.to_string()
    } else {
        format!("{base}/{DEFAULT_API_VERSION}")
    };

    let model = model.trim();
    let model = model.strip_prefix("models/").unwrap_or(model);
    let model = if model.is_empty() {
        DEFAULT_GEMINI_MODEL
    } else {
        model
    };

    format!("{versioned}/models/{model}:streamGenerateContent?alt=sse")
}
