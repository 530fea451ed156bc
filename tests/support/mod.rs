#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use relaybot::app::dispatcher::CommandDispatcher;
use relaybot::app::rate_limiter::RateLimiter;
use relaybot::domain::detection::DetectionSchema;
use relaybot::domain::model::{CooldownConfig, PortError};
use relaybot::ports::chat::{ChatInbox, ChatMessage};
use relaybot::ports::clock::Clock;
use relaybot::ports::hardware::Hardware;
use relaybot::ports::host::HostControl;
use relaybot::ports::notifier::{ChatSession, Notifier};
use tokio::io::AsyncReadExt;

pub const MINUTE_MS: i64 = 60_000;
pub const START_MS: i64 = 1_700_000_000_000;
pub const BOT_ID: &str = "bot-1";

pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn at(ms: i64) -> Arc<Self> {
        Arc::new(Self {
            now: AtomicI64::new(ms),
        })
    }

    pub fn advance_ms(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text(String),
    File {
        caption: String,
        file_name: String,
        bytes: Vec<u8>,
    },
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Sent>>,
    pub fail_with: Mutex<Option<PortError>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_next(&self, err: PortError) {
        *self.fail_with.lock().unwrap() = Some(err);
    }

    fn check_failure(&self) -> Result<(), PortError> {
        match self.fail_with.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn open(&self) -> Result<ChatSession, PortError> {
        Ok(ChatSession {
            user_id: BOT_ID.to_string(),
        })
    }

    async fn close(&self) -> Result<(), PortError> {
        Ok(())
    }

    async fn send_text(&self, content: &str) -> Result<(), PortError> {
        self.check_failure()?;
        self.sent.lock().unwrap().push(Sent::Text(content.to_string()));
        Ok(())
    }

    async fn send_file(
        &self,
        caption: &str,
        file_name: &str,
        mut file: tokio::fs::File,
    ) -> Result<(), PortError> {
        self.check_failure()?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).await.unwrap();
        self.sent.lock().unwrap().push(Sent::File {
            caption: caption.to_string(),
            file_name: file_name.to_string(),
            bytes,
        });
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HwCall {
    Enable,
    Disable,
    SetParam(String, i64),
    Upload(String),
}

#[derive(Default)]
pub struct RecordingHardware {
    pub calls: Mutex<Vec<HwCall>>,
    pub reply: Mutex<String>,
    pub fail_with: Mutex<Option<PortError>>,
}

impl RecordingHardware {
    pub fn calls(&self) -> Vec<HwCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn replying(body: &str) -> Self {
        let hw = Self::default();
        *hw.reply.lock().unwrap() = body.to_string();
        hw
    }

    pub fn failing(err: PortError) -> Self {
        let hw = Self::default();
        *hw.fail_with.lock().unwrap() = Some(err);
        hw
    }

    fn record(&self, call: HwCall) -> Result<String, PortError> {
        self.calls.lock().unwrap().push(call);
        if let Some(e) = self.fail_with.lock().unwrap().clone() {
            return Err(e);
        }
        Ok(self.reply.lock().unwrap().clone())
    }
}

#[async_trait::async_trait]
impl Hardware for RecordingHardware {
    async fn enable(&self) -> Result<String, PortError> {
        self.record(HwCall::Enable)
    }

    async fn disable(&self) -> Result<String, PortError> {
        self.record(HwCall::Disable)
    }

    async fn set_param(&self, name: &str, value: i64) -> Result<String, PortError> {
        self.record(HwCall::SetParam(name.to_string(), value))
    }

    async fn upload_config(&self, payload: String) -> Result<String, PortError> {
        self.record(HwCall::Upload(payload))
    }
}

#[derive(Default)]
pub struct StubHost {
    pub reboots: Mutex<u32>,
    pub status_output: String,
}

#[async_trait::async_trait]
impl HostControl for StubHost {
    async fn reboot(&self) -> Result<(), PortError> {
        *self.reboots.lock().unwrap() += 1;
        Ok(())
    }

    async fn memory_status(&self) -> Result<String, PortError> {
        Ok(self.status_output.clone())
    }
}

/// Serves queued pages of messages, one page per fetch.
#[derive(Default)]
pub struct QueuedInbox {
    pub pages: Mutex<VecDeque<Vec<ChatMessage>>>,
    pub cursors: Mutex<Vec<Option<String>>>,
}

impl QueuedInbox {
    pub fn push_page(&self, page: Vec<ChatMessage>) {
        self.pages.lock().unwrap().push_back(page);
    }

    pub fn cursors(&self) -> Vec<Option<String>> {
        self.cursors.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatInbox for QueuedInbox {
    async fn fetch_since(&self, after: Option<&str>) -> Result<Vec<ChatMessage>, PortError> {
        self.cursors.lock().unwrap().push(after.map(str::to_string));
        Ok(self.pages.lock().unwrap().pop_front().unwrap_or_default())
    }
}

pub fn message(id: &str, author: &str, content: &str) -> ChatMessage {
    ChatMessage {
        id: id.to_string(),
        author_id: author.to_string(),
        content: content.to_string(),
    }
}

pub fn cooldown(capacity: u32, window_minutes: u64) -> CooldownConfig {
    CooldownConfig {
        capacity,
        window_minutes,
        charge_on_reset: true,
    }
}

pub fn limiter(capacity: u32, window_minutes: u64, clock: Arc<ManualClock>) -> Arc<RateLimiter> {
    Arc::new(RateLimiter::new(&cooldown(capacity, window_minutes), clock))
}

pub fn dispatcher(
    hardware: Arc<RecordingHardware>,
    host: Arc<StubHost>,
    limiter: Arc<RateLimiter>,
) -> CommandDispatcher<RecordingHardware, StubHost> {
    CommandDispatcher::new(
        hardware,
        host,
        limiter,
        DetectionSchema::bundled().unwrap(),
        BOT_ID.to_string(),
    )
}

pub fn valid_detection_json() -> serde_json::Value {
    serde_json::json!({
        "BoardName": "jetson-nano",
        "CfgFile": "/opt/det/yolo.cfg",
        "CorrectRate": 0.6,
        "Delay4CAP": 3,
        "NameFile": "/opt/det/coco.names",
        "NotifyAPI": "http://localhost:1234/updated",
        "Port": 8080,
        "QUEUE_ENTRY_LIMIT_MIN": 4,
        "Src": "rtsp://camera/stream",
        "TIME_FORCUS": 10,
        "TIME_SKIP": 2,
        "Threshold": 0.45,
        "WeightFile": "/opt/det/yolo.weights",
        "Status": true
    })
}
