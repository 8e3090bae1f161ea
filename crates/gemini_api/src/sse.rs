use serde_json::Value;

use crate::events::{FinishReason, GeminiStreamEvent};
use crate::payload::GenerateContentChunk;

/// Incremental parser for SSE text streams.
#[derive(Debug, Default)]
pub struct SseStreamParser {
    buffer: String,
}

impl SseStreamParser {
    /// Feed arbitrary bytes into the parser and drain complete events.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<GeminiStreamEvent> {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));
        if self.buffer.contains("\r\n") {
            self.buffer = self.buffer.replace("\r\n", "\n");
        }
        let mut events = Vec::new();

        while let Some(split) = self.buffer.find("\n\n") {
            let frame = self.buffer[..split].to_string();
            self.buffer.drain(0..split + 2);

            if let Some(payload) = extract_data_payload(&frame) {
                if payload == "[DONE]" || payload.is_empty() {
                    continue;
                }

                if let Ok(value) = serde_json::from_str::<Value>(&payload) {
                    events.extend(map_frame(value));
                }
            }
        }

        events
    }

    /// Parse a complete SSE payload string in one shot.
    pub fn parse_frames(input: &str) -> Vec<GeminiStreamEvent> {
        let mut parser = Self::default();
        parser.feed(input.as_bytes())
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.trim().is_empty()
    }
}

fn extract_data_payload(frame: &str) -> Option<String> {
    let data_lines: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .collect();

    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}

fn map_frame(value: Value) -> Vec<GeminiStreamEvent> {
    if let Some(error) = value.get("error") {
        let code = error
            .get("code")
            .and_then(Value::as_u64)
            .and_then(|code| u16::try_from(code).ok());
        let status = error
            .get("status")
            .and_then(Value::as_str)
            .map(ToString::to_string);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(ToString::to_string);
        return vec![GeminiStreamEvent::Error {
            code,
            status,
            message,
        }];
    }

    let Ok(chunk) = serde_json::from_value::<GenerateContentChunk>(value) else {
        return Vec::new();
    };

    if let Some(reason) = chunk
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.clone())
    {
        return vec![GeminiStreamEvent::Blocked { reason }];
    }

    let mut events = Vec::new();
    // Only the first candidate is ever requested.
    if let Some(candidate) = chunk.candidates.into_iter().next() {
        let delta = candidate
            .content
            .as_ref()
            .map(|content| content.visible_text())
            .unwrap_or_default();
        if !delta.is_empty() {
            events.push(GeminiStreamEvent::TextDelta { delta });
        }
        if let Some(reason) = candidate
            .finish_reason
            .as_deref()
            .and_then(FinishReason::parse)
        {
            events.push(GeminiStreamEvent::Finished { reason });
        }
    }

    events
}
