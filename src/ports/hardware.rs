//! Control surface of the detector process.
use crate::domain::model::PortError;

#[async_trait::async_trait]
pub trait Hardware: Send + Sync {
    async fn enable(&self) -> Result<String, PortError>;
    async fn disable(&self) -> Result<String, PortError>;
    async fn set_param(&self, name: &str, value: i64) -> Result<String, PortError>;
    async fn upload_config(&self, payload: String) -> Result<String, PortError>;
}
