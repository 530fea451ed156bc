//! Loads the TOML config file, checks it against the bundled schema and
//! normalizes it into `AppConfig`.
mod schema;

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono_tz::Tz;
use serde::Deserialize;
use tokio::fs;

use crate::domain::model::{
    AppConfig, ChatConfig, CooldownConfig, HardwareConfig, HostConfig, LogRotation, LoggingConfig,
    RequestsConfig,
};

pub const TOKEN_ENV: &str = "RELAYBOT_CHAT_TOKEN";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
struct RawConfigFile {
    #[serde(default)]
    app: RawApp,
    http: RawHttp,
    chat: RawChat,
    hardware: RawHardware,
    cooldown: RawCooldown,
    #[serde(default)]
    requests: RawRequests,
    #[serde(default)]
    host: RawHost,
    #[serde(default)]
    logging: RawLogging,
}

#[derive(Debug, Deserialize, Default)]
struct RawApp {
    timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawHttp {
    listen_addr: String,
}

#[derive(Debug, Deserialize)]
struct RawChat {
    token: String,
    channel_id: String,
    #[serde(default = "default_api_base")]
    api_base: String,
    #[serde(default = "default_poll_interval_seconds")]
    poll_interval_seconds: u64,
}

#[derive(Debug, Deserialize)]
struct RawHardware {
    enable_url: String,
    disable_url: String,
    upload_config_url: String,
    #[serde(default)]
    params: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RawCooldown {
    #[serde(default = "default_capacity")]
    capacity: u32,
    window_minutes: u64,
    #[serde(default = "default_charge_on_reset")]
    charge_on_reset: bool,
}

#[derive(Debug, Deserialize)]
struct RawRequests {
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    user_agent: String,
}

impl Default for RawRequests {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawHost {
    #[serde(default = "default_reboot_command")]
    reboot_command: Vec<String>,
    #[serde(default = "default_status_command")]
    status_command: Vec<String>,
}

impl Default for RawHost {
    fn default() -> Self {
        Self {
            reboot_command: default_reboot_command(),
            status_command: default_status_command(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawLogging {
    level: Option<String>,
    file_directory: Option<String>,
    file_name: Option<String>,
    file_rotation: Option<LogRotation>,
    file_level: Option<String>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub async fn load(config_path: &Path) -> Result<AppConfig, ConfigError> {
        let content = fs::read_to_string(config_path).await?;
        let mut cfg = Self::parse(&content, config_path)?;
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                cfg.chat.token = token.trim().to_string();
            }
        }
        if cfg.chat.token.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "chat.token is empty and {TOKEN_ENV} is not set"
            )));
        }
        Ok(cfg)
    }

    /// Parses config text. Relative log directories resolve against the
    /// directory of `config_path`.
    pub fn parse(content: &str, config_path: &Path) -> Result<AppConfig, ConfigError> {
        schema::validate_toml(content, &config_path.display().to_string())?;
        let raw: RawConfigFile = toml::from_str(content)?;

        let tz_str = raw
            .app
            .timezone
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("UTC");
        let timezone: Tz = tz_str
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid timezone '{tz_str}'")))?;

        let listen_addr = raw.http.listen_addr.trim().to_string();
        if listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "invalid http.listen_addr '{listen_addr}', expected host:port"
            )));
        }

        if raw.cooldown.capacity == 0 {
            return Err(ConfigError::Invalid("cooldown.capacity must be positive".into()));
        }
        if raw.cooldown.window_minutes == 0 {
            return Err(ConfigError::Invalid(
                "cooldown.window_minutes must be positive".into(),
            ));
        }

        let hardware = parse_hardware(raw.hardware)?;
        let host = parse_host(raw.host)?;
        let logging = parse_logging(raw.logging, config_path)?;

        Ok(AppConfig {
            timezone,
            listen_addr,
            chat: ChatConfig {
                token: raw.chat.token.trim().to_string(),
                channel_id: raw.chat.channel_id.trim().to_string(),
                api_base: raw.chat.api_base.trim_end_matches('/').to_string(),
                poll_interval: Duration::from_secs(raw.chat.poll_interval_seconds.max(1)),
            },
            hardware,
            cooldown: CooldownConfig {
                capacity: raw.cooldown.capacity,
                window_minutes: raw.cooldown.window_minutes,
                charge_on_reset: raw.cooldown.charge_on_reset,
            },
            requests: RequestsConfig {
                timeout: Duration::from_secs(raw.requests.timeout_seconds.max(1)),
                user_agent: raw.requests.user_agent,
            },
            host,
            logging,
        })
    }
}

fn parse_hardware(raw: RawHardware) -> Result<HardwareConfig, ConfigError> {
    for (key, url) in [
        ("hardware.enable_url", &raw.enable_url),
        ("hardware.disable_url", &raw.disable_url),
        ("hardware.upload_config_url", &raw.upload_config_url),
    ] {
        require_http_url(key, url)?;
    }
    let mut params = HashMap::new();
    for (name, url) in raw.params {
        require_http_url(&format!("hardware.params.{name}"), &url)?;
        params.insert(name.trim().to_string(), url.trim().to_string());
    }
    Ok(HardwareConfig {
        enable_url: raw.enable_url.trim().to_string(),
        disable_url: raw.disable_url.trim().to_string(),
        upload_config_url: raw.upload_config_url.trim().to_string(),
        params,
    })
}

fn parse_host(raw: RawHost) -> Result<HostConfig, ConfigError> {
    if raw.reboot_command.is_empty() || raw.status_command.is_empty() {
        return Err(ConfigError::Invalid("host commands cannot be empty".into()));
    }
    Ok(HostConfig {
        reboot_command: raw.reboot_command,
        status_command: raw.status_command,
    })
}

fn parse_logging(raw: RawLogging, config_path: &Path) -> Result<LoggingConfig, ConfigError> {
    let level = raw
        .level
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| "info".to_string());
    let file_level = normalize_log_level(raw.file_level.as_deref().unwrap_or("info"))?;
    let file_directory = raw
        .file_directory
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .map(|d| resolve_log_dir(config_path, &d));

    Ok(LoggingConfig {
        level,
        file_directory,
        file_name: raw.file_name.unwrap_or_else(|| "relaybot".to_string()),
        file_rotation: raw.file_rotation.unwrap_or(LogRotation::Hourly),
        file_level,
    })
}

fn require_http_url(key: &str, url: &str) -> Result<(), ConfigError> {
    let u = url.trim();
    if u.starts_with("http://") || u.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{key} must be an http(s) URL, got '{url}'"
        )))
    }
}

fn normalize_log_level(level: &str) -> Result<String, ConfigError> {
    let l = level.trim().to_ascii_lowercase();
    match l.as_str() {
        "error" | "warn" | "info" | "debug" | "trace" | "off" => Ok(l),
        _ => Err(ConfigError::Invalid(format!(
            "invalid logging.file_level '{level}', expected error|warn|info|debug|trace|off"
        ))),
    }
}

fn resolve_log_dir(config_path: &Path, log_dir: &str) -> PathBuf {
    let p = Path::new(log_dir);
    if p.is_absolute() {
        return p.to_path_buf();
    }
    config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(p)
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_poll_interval_seconds() -> u64 {
    2
}

fn default_capacity() -> u32 {
    5
}

fn default_charge_on_reset() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("relaybot/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_reboot_command() -> Vec<String> {
    vec!["systemctl".to_string(), "reboot".to_string()]
}

fn default_status_command() -> Vec<String> {
    vec!["free".to_string(), "-m".to_string()]
}
