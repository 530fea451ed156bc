use crate::domain::model::PortError;

#[async_trait::async_trait]
pub trait HostControl: Send + Sync {
    async fn reboot(&self) -> Result<(), PortError>;
    async fn memory_status(&self) -> Result<String, PortError>;
}
