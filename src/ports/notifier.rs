//! Outbound side of the chat channel.
use crate::domain::model::PortError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    /// The bot's own user id, used to ignore its own messages.
    pub user_id: String,
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn open(&self) -> Result<ChatSession, PortError>;
    async fn close(&self) -> Result<(), PortError>;

    async fn send_text(&self, content: &str) -> Result<(), PortError>;

    /// Consumes the file; it is closed when the call returns, whatever the outcome.
    async fn send_file(
        &self,
        caption: &str,
        file_name: &str,
        file: tokio::fs::File,
    ) -> Result<(), PortError>;
}
