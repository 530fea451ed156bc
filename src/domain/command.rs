//! Operator directives typed into the chat channel.
use std::num::IntErrorKind;

use serde_json::Value;

pub const THRESHOLD_MIN: i64 = 0;
pub const THRESHOLD_MAX: i64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Reboot,
    Status,
    Enable,
    Disable,
    SetThreshold(i64),
    UploadConfig(Value),
    /// A recognised directive whose argument or payload did not decode.
    Invalid(String),
    Unrecognized,
}

impl Command {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text {
            "!reb" => return Command::Reboot,
            "!status" => return Command::Status,
            "!enable" => return Command::Enable,
            "!disable" => return Command::Disable,
            _ => {}
        }

        let mut tokens = text.split_whitespace();
        if tokens.next() == Some("!threshold") {
            return match (tokens.next(), tokens.next()) {
                (Some(raw), None) => match raw.parse::<i64>() {
                    Ok(v) => Command::SetThreshold(v),
                    // Still an integer, just far out of range.
                    Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
                        Command::SetThreshold(i64::MAX)
                    }
                    Err(e) if *e.kind() == IntErrorKind::NegOverflow => {
                        Command::SetThreshold(i64::MIN)
                    }
                    Err(e) => Command::Invalid(format!("invalid threshold '{raw}': {e}")),
                },
                _ => Command::Invalid("usage: !threshold <0-100>".to_string()),
            };
        }

        if text.starts_with('{') {
            return match serde_json::from_str::<Value>(text) {
                Ok(v) => Command::UploadConfig(v),
                Err(e) => Command::Invalid(e.to_string()),
            };
        }

        Command::Unrecognized
    }
}

pub fn threshold_in_range(value: i64) -> bool {
    (THRESHOLD_MIN..=THRESHOLD_MAX).contains(&value)
}
