use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::app::rate_limiter::RateLimiter;
use crate::domain::command::{threshold_in_range, Command};
use crate::domain::detection::{DetectionError, DetectionSchema};
use crate::ports::chat::ChatMessage;
use crate::ports::hardware::Hardware;
use crate::ports::host::HostControl;

pub const REPLY_OK: &str = "ok";
pub const REPLY_CFG_ERROR: &str = "cfg error";
pub const REPLY_OUT_OF_RANGE: &str = "overflow or underflow";

/// Turns chat messages into hardware and host calls. Returns the reply to
/// post back to the channel, if any.
pub struct CommandDispatcher<H, S>
where
    H: Hardware + ?Sized,
    S: HostControl + ?Sized,
{
    hardware: Arc<H>,
    host: Arc<S>,
    limiter: Arc<RateLimiter>,
    schema: DetectionSchema,
    self_id: String,
}

impl<H, S> CommandDispatcher<H, S>
where
    H: Hardware + ?Sized,
    S: HostControl + ?Sized,
{
    pub fn new(
        hardware: Arc<H>,
        host: Arc<S>,
        limiter: Arc<RateLimiter>,
        schema: DetectionSchema,
        self_id: String,
    ) -> Self {
        Self {
            hardware,
            host,
            limiter,
            schema,
            self_id,
        }
    }

    pub async fn dispatch(&self, msg: &ChatMessage) -> Option<String> {
        if msg.author_id == self.self_id {
            return None;
        }

        let command = Command::parse(&msg.content);
        if command != Command::Unrecognized {
            info!(message_id = %msg.id, author = %msg.author_id, command = command_name(&command), "Chat command");
        }

        match command {
            Command::Reboot => match self.host.reboot().await {
                Ok(()) => None,
                Err(e) => {
                    warn!(error = %e, "Reboot failed");
                    Some(e.to_string())
                }
            },
            Command::Status => Some(match self.host.memory_status().await {
                Ok(out) => out,
                Err(e) => e.to_string(),
            }),
            Command::Enable => Some(match self.hardware.enable().await {
                Ok(_) => {
                    self.limiter.reset().await;
                    REPLY_OK.to_string()
                }
                Err(e) => e.to_string(),
            }),
            Command::Disable => Some(match self.hardware.disable().await {
                Ok(_) => REPLY_OK.to_string(),
                Err(e) => e.to_string(),
            }),
            Command::SetThreshold(value) => Some(self.set_threshold(value).await),
            Command::UploadConfig(payload) => Some(self.upload_config(&payload).await),
            Command::Invalid(reason) => Some(reason),
            Command::Unrecognized => None,
        }
    }

    async fn set_threshold(&self, value: i64) -> String {
        if !threshold_in_range(value) {
            return REPLY_OUT_OF_RANGE.to_string();
        }
        match self.hardware.set_param("threshold", value).await {
            Ok(body) if body.trim().is_empty() => REPLY_OK.to_string(),
            Ok(body) => body,
            Err(e) => e.to_string(),
        }
    }

    async fn upload_config(&self, payload: &Value) -> String {
        let cfg = match self.schema.check(payload) {
            Ok(cfg) => cfg,
            Err(DetectionError::Invalid(violations)) => {
                for v in &violations {
                    warn!(violation = %v, "Detection config rejected");
                }
                return REPLY_CFG_ERROR.to_string();
            }
            Err(e) => return e.to_string(),
        };

        let body = match cfg.to_payload() {
            Ok(body) => body,
            Err(_) => return REPLY_CFG_ERROR.to_string(),
        };
        match self.hardware.upload_config(body).await {
            Ok(_) => {
                info!(board = %cfg.board_name, "Detection config uploaded");
                REPLY_OK.to_string()
            }
            Err(e) => e.to_string(),
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Reboot => "reboot",
        Command::Status => "status",
        Command::Enable => "enable",
        Command::Disable => "disable",
        Command::SetThreshold(_) => "set-threshold",
        Command::UploadConfig(_) => "upload-config",
        Command::Invalid(_) => "invalid",
        Command::Unrecognized => "unrecognized",
    }
}
