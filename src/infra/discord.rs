//! Discord REST adapter. Implements the outbound `Notifier` and an inbound
//! `ChatInbox` that polls the configured channel.
use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::{header, multipart, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::model::{ChatConfig, PortError, RequestsConfig};
use crate::ports::chat::{ChatInbox, ChatMessage};
use crate::ports::notifier::{ChatSession, Notifier};

const POLL_PAGE_SIZE: u32 = 50;

pub struct DiscordClient {
    client: reqwest::Client,
    api_base: String,
    channel_id: String,
    closed: AtomicBool,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    id: String,
    #[serde(default)]
    content: String,
    author: WireUser,
}

impl DiscordClient {
    pub fn new(chat: &ChatConfig, requests: &RequestsConfig) -> Result<Self, PortError> {
        let mut auth = header::HeaderValue::from_str(&format!("Bot {}", chat.token))
            .map_err(|e| PortError::Transport(format!("invalid token header: {e}")))?;
        auth.set_sensitive(true);
        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .user_agent(requests.user_agent.clone())
            .default_headers(headers)
            .timeout(requests.timeout)
            .build()
            .map_err(|e| PortError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_base: chat.api_base.clone(),
            channel_id: chat.channel_id.clone(),
            closed: AtomicBool::new(false),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/channels/{}/messages", self.api_base, self.channel_id)
    }

    fn ensure_open(&self) -> Result<(), PortError> {
        if self.closed.load(Ordering::Acquire) {
            Err(PortError::Closed)
        } else {
            Ok(())
        }
    }

    async fn expect_success(resp: reqwest::Response) -> Result<reqwest::Response, PortError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(body = %body, "Discord rate limited the bot");
        }
        Err(PortError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, PortError> {
        let resp = req
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        Self::expect_success(resp).await
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordClient {
    async fn open(&self) -> Result<ChatSession, PortError> {
        self.closed.store(false, Ordering::Release);
        let url = format!("{}/users/@me", self.api_base);
        let me: WireUser = self
            .send(self.client.get(&url))
            .await?
            .json()
            .await
            .map_err(|e| PortError::Decode(e.to_string()))?;
        info!(user_id = %me.id, channel_id = %self.channel_id, "Discord session opened");
        self.send_text("Bot started").await?;
        Ok(ChatSession { user_id: me.id })
    }

    async fn close(&self) -> Result<(), PortError> {
        self.closed.store(true, Ordering::Release);
        info!("Discord session closed");
        Ok(())
    }

    async fn send_text(&self, content: &str) -> Result<(), PortError> {
        self.ensure_open()?;
        self.send(
            self.client
                .post(self.messages_url())
                .json(&json!({ "content": content })),
        )
        .await?;
        debug!(len = content.len(), "Discord text sent");
        Ok(())
    }

    async fn send_file(
        &self,
        caption: &str,
        file_name: &str,
        file: tokio::fs::File,
    ) -> Result<(), PortError> {
        self.ensure_open()?;
        let size = file
            .metadata()
            .await
            .map_err(|e| PortError::Transport(format!("stat {file_name}: {e}")))?
            .len();

        let part = multipart::Part::stream_with_length(reqwest::Body::from(file), size)
            .file_name(file_name.to_string());
        let form = multipart::Form::new()
            .text("payload_json", json!({ "content": caption }).to_string())
            .part("files[0]", part);
        self.send(self.client.post(self.messages_url()).multipart(form))
            .await?;
        debug!(file_name, size, "Discord file sent");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ChatInbox for DiscordClient {
    async fn fetch_since(&self, after: Option<&str>) -> Result<Vec<ChatMessage>, PortError> {
        self.ensure_open()?;
        let req = match after {
            Some(cursor) => self.client.get(self.messages_url()).query(&[
                ("after", cursor.to_string()),
                ("limit", POLL_PAGE_SIZE.to_string()),
            ]),
            None => self
                .client
                .get(self.messages_url())
                .query(&[("limit", "1")]),
        };
        let mut wire: Vec<WireMessage> = self
            .send(req)
            .await?
            .json()
            .await
            .map_err(|e| PortError::Decode(e.to_string()))?;

        // Discord returns newest first; snowflakes order by numeric value.
        wire.sort_by_key(|m| m.id.parse::<u64>().unwrap_or(0));
        Ok(wire
            .into_iter()
            .map(|m| ChatMessage {
                id: m.id,
                author_id: m.author.id,
                content: m.content,
            })
            .collect())
    }
}
