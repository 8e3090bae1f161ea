use std::collections::BTreeMap;

use crate::config::GeminiApiConfig;
use crate::error::GeminiApiError;

pub const HEADER_API_KEY: &str = "x-goog-api-key";
pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_USER_AGENT: &str = "user-agent";

/// Build a deterministic header map for Gemini transport requests.
pub fn build_headers(
    config: &GeminiApiConfig,
    user_agent: Option<&str>,
) -> Result<BTreeMap<String, String>, GeminiApiError> {
    let api_key = config.api_key.trim();
    if api_key.is_empty() {
        return Err(GeminiApiError::MissingApiKey);
    }

    let mut headers = BTreeMap::new();
    headers.insert(HEADER_API_KEY.to_owned(), api_key.to_owned());
    headers.insert(HEADER_ACCEPT.to_owned(), "text/event-stream".to_owned());
    headers.insert(
        HEADER_CONTENT_TYPE.to_owned(),
        "application/json".to_owned(),
    );

    let ua = match (user_agent, config.user_agent.as_deref()) {
        (Some(explicit), _) if !explicit.trim().is_empty() => explicit.trim().to_owned(),
        (None, Some(explicit)) if !explicit.trim().is_empty() => explicit.trim().to_owned(),
        _ => default_user_agent(),
    };
    headers.insert(HEADER_USER_AGENT.to_owned(), ua);

    for (key, value) in &config.extra_headers {
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    Ok(headers)
}

fn default_user_agent() -> String {
    format!(
        "secretary/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_require_api_key() {
        let error = build_headers(&GeminiApiConfig::new("  "), None)
            .expect_err("blank key should be rejected");
        assert!(matches!(error, GeminiApiError::MissingApiKey));
    }

    #[test]
    fn headers_carry_key_stream_accept_and_default_agent() {
        let headers = build_headers(&GeminiApiConfig::new(" key-1 "), None).expect("headers");

        assert_eq!(headers[HEADER_API_KEY], "key-1");
        assert_eq!(headers[HEADER_ACCEPT], "text/event-stream");
        assert!(headers[HEADER_USER_AGENT].starts_with("secretary/"));
    }

    #[test]
    fn explicit_user_agent_and_extra_headers_win() {
        let config = GeminiApiConfig::new("key")
            .with_user_agent("configured")
            .insert_header("X-Trace", " abc ");

        let headers = build_headers(&config, Some("explicit")).expect("headers");
        assert_eq!(headers[HEADER_USER_AGENT], "explicit");
        assert_eq!(headers["x-trace"], "abc");

        let headers = build_headers(&config, None).expect("headers");
        assert_eq!(headers[HEADER_USER_AGENT], "configured");
    }
}
