use std::{collections::HashMap, path::PathBuf, time::Duration};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub timezone: Tz,
    pub listen_addr: String,
    pub chat: ChatConfig,
    pub hardware: HardwareConfig,
    pub cooldown: CooldownConfig,
    pub requests: RequestsConfig,
    pub host: HostConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub token: String,
    pub channel_id: String,
    pub api_base: String,
    pub poll_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct HardwareConfig {
    pub enable_url: String,
    pub disable_url: String,
    pub upload_config_url: String,
    /// Parameter name -> base URL; the value is appended on `set_param`.
    pub params: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownConfig {
    pub capacity: u32,
    pub window_minutes: u64,
    pub charge_on_reset: bool,
}

#[derive(Debug, Clone)]
pub struct RequestsConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct HostConfig {
    pub reboot_command: Vec<String>,
    pub status_command: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    Daily,
    Never,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file_directory: Option<PathBuf>,
    pub file_name: String,
    pub file_rotation: LogRotation,
    pub file_level: String,
}

/// Failure surfaced by a port adapter. The `Display` text is what gets
/// relayed to chat or logged; callers never inspect remote bodies further.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("remote returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unknown parameter '{0}'")]
    UnknownParam(String),
    #[error("connection closed")]
    Closed,
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("command failed: {0}")]
    Command(String),
}
