//! Inbound side of the chat channel.
use crate::domain::model::PortError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    pub author_id: String,
    pub content: String,
}

#[async_trait::async_trait]
pub trait ChatInbox: Send + Sync {
    /// Messages newer than `after`, oldest first. Without a cursor only the
    /// newest message is returned so callers can start from "now".
    async fn fetch_since(&self, after: Option<&str>) -> Result<Vec<ChatMessage>, PortError>;
}
