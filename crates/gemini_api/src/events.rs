use serde::{Deserialize, Serialize};

/// Terminal reason reported on the last candidate chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
    Blocklist,
    ProhibitedContent,
    Other,
}

impl FinishReason {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "STOP" => Self::Stop,
            "MAX_TOKENS" => Self::MaxTokens,
            "SAFETY" => Self::Safety,
            "RECITATION" => Self::Recitation,
            "BLOCKLIST" => Self::Blocklist,
            "PROHIBITED_CONTENT" => Self::ProhibitedContent,
            "FINISH_REASON_UNSPECIFIED" | "" => return None,
            _ => Self::Other,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stop => "STOP",
            Self::MaxTokens => "MAX_TOKENS",
            Self::Safety => "SAFETY",
            Self::Recitation => "RECITATION",
            Self::Blocklist => "BLOCKLIST",
            Self::ProhibitedContent => "PROHIBITED_CONTENT",
            Self::Other => "OTHER",
        }
    }

    /// True when the model stopped on its own or on the token budget.
    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Stop | Self::MaxTokens)
    }
}

/// Stream event emitted by the parser after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeminiStreamEvent {
    TextDelta {
        delta: String,
    },
    Finished {
        reason: FinishReason,
    },
    /// The prompt itself was rejected before any candidate was produced.
    Blocked {
        reason: String,
    },
    /// An error object delivered inside the stream.
    Error {
        code: Option<u16>,
        status: Option<String>,
        message: Option<String>,
    },
}
