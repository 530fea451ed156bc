pub mod chat;
pub mod clock;
pub mod hardware;
pub mod host;
pub mod notifier;
