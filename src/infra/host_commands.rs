//! `HostControl` backed by configured OS commands (`systemctl reboot`,
//! `free -m` by default).
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{info, warn};

use crate::domain::model::{HostConfig, PortError};
use crate::ports::host::HostControl;

pub struct HostCommands {
    reboot: Vec<String>,
    status: Vec<String>,
    timeout: Duration,
}

impl HostCommands {
    pub fn new(cfg: &HostConfig, timeout: Duration) -> Self {
        Self {
            reboot: cfg.reboot_command.clone(),
            status: cfg.status_command.clone(),
            timeout,
        }
    }

    async fn run(&self, argv: &[String]) -> Result<String, PortError> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| PortError::Command("empty command".to_string()))?;
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();
        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| PortError::Command(format!("{program} timed out")))?
            .map_err(|e| PortError::Command(format!("{program}: {e}")))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(program = %program, status = %output.status, "Host command failed");
            Err(PortError::Command(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )))
        }
    }
}

#[async_trait::async_trait]
impl HostControl for HostCommands {
    async fn reboot(&self) -> Result<(), PortError> {
        info!(command = ?self.reboot, "Rebooting host");
        self.run(&self.reboot).await.map(|_| ())
    }

    async fn memory_status(&self) -> Result<String, PortError> {
        self.run(&self.status).await
    }
}
