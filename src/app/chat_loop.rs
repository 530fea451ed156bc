use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::app::dispatcher::CommandDispatcher;
use crate::ports::chat::ChatInbox;
use crate::ports::hardware::Hardware;
use crate::ports::host::HostControl;
use crate::ports::notifier::Notifier;

pub struct ChatLoop<I, H, S>
where
    I: ChatInbox + ?Sized,
    H: Hardware + ?Sized,
    S: HostControl + ?Sized,
{
    inbox: Arc<I>,
    notifier: Arc<dyn Notifier>,
    dispatcher: Arc<CommandDispatcher<H, S>>,
    cursor: Option<String>,
    primed: bool,
}

impl<I, H, S> ChatLoop<I, H, S>
where
    I: ChatInbox + ?Sized,
    H: Hardware + ?Sized,
    S: HostControl + ?Sized,
{
    pub fn new(
        inbox: Arc<I>,
        notifier: Arc<dyn Notifier>,
        dispatcher: Arc<CommandDispatcher<H, S>>,
    ) -> Self {
        Self {
            inbox,
            notifier,
            dispatcher,
            cursor: None,
            primed: false,
        }
    }

    /// Polls the channel forever. Fetch and send failures are logged and the
    /// next tick carries on from the same cursor.
    pub async fn run_forever(mut self, poll_interval: Duration) {
        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(poll_ms = poll_interval.as_millis() as u64, "Chat loop started");
        loop {
            interval.tick().await;
            if let Err(e) = self.poll_once().await {
                warn!(error = %e, "Chat poll failed");
            }
        }
    }

    /// One poll. The first successful poll only records where the channel
    /// currently ends; later polls dispatch every new message in order.
    /// Returns how many new messages were seen.
    pub async fn poll_once(&mut self) -> Result<usize, crate::domain::model::PortError> {
        let messages = self.inbox.fetch_since(self.cursor.as_deref()).await?;

        if !self.primed {
            self.primed = true;
            if let Some(last) = messages.last() {
                self.cursor = Some(last.id.clone());
            }
            debug!(cursor = ?self.cursor, "Chat cursor primed");
            return Ok(0);
        }

        let mut seen = 0;
        for msg in messages {
            self.cursor = Some(msg.id.clone());
            seen += 1;
            let Some(reply) = self.dispatcher.dispatch(&msg).await else {
                continue;
            };
            if reply.is_empty() {
                continue;
            }
            if let Err(e) = self.notifier.send_text(&reply).await {
                warn!(message_id = %msg.id, error = %e, "Reply failed");
            }
        }
        Ok(seen)
    }
}
