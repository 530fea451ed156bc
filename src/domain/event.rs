//! Sensor events as posted to the ingestion endpoint.
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum EventKind {
    #[serde(rename = "file-path", alias = "img_path")]
    FilePath,
    #[serde(rename = "text")]
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub kind: EventKind,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventDecodeError {
    #[error("empty body")]
    Empty,
    #[error("invalid event json: {0}")]
    Json(String),
}

#[derive(Debug, Deserialize)]
struct WireEvent {
    #[serde(default)]
    key: Option<EventKind>,
    content: String,
}

impl InboundEvent {
    /// Accepts `{"key": .., "content": ..}`, a JSON string literal, or a bare
    /// path. The last two are the legacy file-path form.
    pub fn decode(body: &str) -> Result<Self, EventDecodeError> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Err(EventDecodeError::Empty);
        }

        if trimmed.starts_with('{') {
            let wire: WireEvent = serde_json::from_str(trimmed)
                .map_err(|e| EventDecodeError::Json(e.to_string()))?;
            return Ok(Self {
                kind: wire.key.unwrap_or(EventKind::Text),
                content: wire.content,
            });
        }

        let path = if trimmed.starts_with('"') {
            serde_json::from_str::<String>(trimmed)
                .map_err(|e| EventDecodeError::Json(e.to_string()))?
        } else {
            trimmed.to_string()
        };
        if path.trim().is_empty() {
            return Err(EventDecodeError::Empty);
        }

        Ok(Self {
            kind: EventKind::FilePath,
            content: path,
        })
    }
}
