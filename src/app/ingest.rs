//! Sensor-event ingestion: decode, gate through the cooldown, forward to chat.
use std::path::Path;
use std::sync::Arc;

use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::app::rate_limiter::RateLimiter;
use crate::domain::event::{EventDecodeError, EventKind, InboundEvent};
use crate::domain::model::PortError;
use crate::infra::time::format_caption_time;
use crate::ports::clock::Clock;
use crate::ports::notifier::Notifier;

const FALLBACK_FILE_NAME: &str = "img.jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Forwarded,
    /// Denied by the cooldown; acknowledged but not forwarded.
    Dropped,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("unreadable body")]
    Unreadable,
    #[error("{0}")]
    Decode(String),
    #[error("cannot open {path}: {source}")]
    FileOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("forward failed: {0}")]
    Forward(#[from] PortError),
}

pub struct Ingestor {
    limiter: Arc<RateLimiter>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    timezone: Tz,
}

impl Ingestor {
    pub fn new(
        limiter: Arc<RateLimiter>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        timezone: Tz,
    ) -> Self {
        Self {
            limiter,
            notifier,
            clock,
            timezone,
        }
    }

    pub async fn ingest(&self, body: &[u8]) -> Result<IngestOutcome, IngestError> {
        let event = match decode_body(body) {
            Ok(event) => event,
            Err(e) => {
                // Malformed events still count as activity for the idle gap.
                self.limiter.touch().await;
                return Err(e);
            }
        };

        let admission = self.limiter.admit().await;
        if !admission.admitted {
            debug!(kind = ?event.kind, "Event dropped by cooldown");
            return Ok(IngestOutcome::Dropped);
        }

        match event.kind {
            EventKind::FilePath => {
                let file = tokio::fs::File::open(&event.content).await.map_err(|source| {
                    IngestError::FileOpen {
                        path: event.content.clone(),
                        source,
                    }
                })?;
                let caption = format!(
                    "{} cnt: {}",
                    format_caption_time(self.clock.now_ms(), &self.timezone),
                    admission.remaining
                );
                let file_name = Path::new(&event.content)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or(FALLBACK_FILE_NAME);
                self.notifier.send_file(&caption, file_name, file).await?;
                info!(path = %event.content, remaining = admission.remaining, "Forwarded file event");
            }
            EventKind::Text => {
                self.notifier.send_text(&event.content).await?;
                info!(remaining = admission.remaining, "Forwarded text event");
            }
        }

        Ok(IngestOutcome::Forwarded)
    }
}

fn decode_body(body: &[u8]) -> Result<InboundEvent, IngestError> {
    let text = std::str::from_utf8(body).map_err(|_| IngestError::Unreadable)?;
    InboundEvent::decode(text).map_err(|e| match e {
        EventDecodeError::Empty => IngestError::Unreadable,
        EventDecodeError::Json(msg) => {
            warn!(error = %msg, "Event decode failed");
            IngestError::Decode(msg)
        }
    })
}
