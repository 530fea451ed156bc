//! Reqwest-backed `Hardware` adapter: one plain HTTP request per call, no
//! retries, non-2xx statuses surfaced as errors with the remote body.
use std::collections::HashMap;

use reqwest::header;
use tracing::{debug, warn};

use crate::domain::model::{HardwareConfig, PortError, RequestsConfig};
use crate::ports::hardware::Hardware;

pub struct ReqwestHardware {
    client: reqwest::Client,
    enable_url: String,
    disable_url: String,
    upload_config_url: String,
    params: HashMap<String, String>,
}

impl ReqwestHardware {
    pub fn new(hw: &HardwareConfig, requests: &RequestsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(requests.user_agent.clone())
            .timeout(requests.timeout)
            .build()?;
        Ok(Self {
            client,
            enable_url: hw.enable_url.clone(),
            disable_url: hw.disable_url.clone(),
            upload_config_url: hw.upload_config_url.clone(),
            params: hw.params.clone(),
        })
    }

    async fn finish(
        url: &str,
        sent: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<String, PortError> {
        let resp = sent.map_err(|e| {
            warn!(url, error = %e, "Hardware request failed");
            transport_error(&e)
        })?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| transport_error(&e))?;
        debug!(url, status = status.as_u16(), "Hardware request done");
        if status.is_success() {
            Ok(body)
        } else {
            warn!(url, status = status.as_u16(), "Hardware rejected request");
            Err(PortError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn get(&self, url: &str) -> Result<String, PortError> {
        Self::finish(url, self.client.get(url).send().await).await
    }
}

fn transport_error(e: &reqwest::Error) -> PortError {
    if e.is_timeout() {
        PortError::Transport(format!("timeout: {e}"))
    } else {
        PortError::Transport(e.to_string())
    }
}

#[async_trait::async_trait]
impl Hardware for ReqwestHardware {
    async fn enable(&self) -> Result<String, PortError> {
        self.get(&self.enable_url).await
    }

    async fn disable(&self) -> Result<String, PortError> {
        self.get(&self.disable_url).await
    }

    async fn set_param(&self, name: &str, value: i64) -> Result<String, PortError> {
        let base = self
            .params
            .get(name)
            .ok_or_else(|| PortError::UnknownParam(name.to_string()))?;
        let url = format!("{base}{value}");
        self.get(&url).await
    }

    async fn upload_config(&self, payload: String) -> Result<String, PortError> {
        let url = &self.upload_config_url;
        let sent = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await;
        Self::finish(url, sent).await
    }
}
