use async_trait::async_trait;
use std::process::{Output, Stdio};
use tokio::process::Command;

use super::{CheckEntry, CheckReport, SyncEngine};
use crate::error::{Result, SyncError};

/// 基于rclone命令行的同步引擎
#[derive(Debug, Clone)]
pub struct RcloneEngine {
    binary: String,
    progress: bool,
}

impl RcloneEngine {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            progress: true,
        }
    }

    /// Toggle `--progress` on `sync` transfers.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn describe(&self, args: &[&str]) -> String {
        format!("{} {}", self.binary, args.join(" "))
    }

    fn spawn_failure(&self, args: &[&str], err: std::io::Error) -> SyncError {
        SyncError::ExternalToolFailure {
            command: self.describe(args),
            message: err.to_string(),
        }
    }

    fn exit_failure(&self, args: &[&str], output: &Output) -> SyncError {
        let stderr = String::from_utf8_lossy(&output.stderr);
        SyncError::ExternalToolFailure {
            command: self.describe(args),
            message: format!("{} {}", output.status, stderr.trim()),
        }
    }

    /// Run with inherited stdio so rclone can draw its own progress.
    async fn run(&self, args: &[&str]) -> Result<()> {
        log::debug!("Running {}", self.describe(args));
        let status = Command::new(&self.binary)
            .args(args)
            .status()
            .await
            .map_err(|e| self.spawn_failure(args, e))?;

        if !status.success() {
            return Err(SyncError::ExternalToolFailure {
                command: self.describe(args),
                message: status.to_string(),
            });
        }
        Ok(())
    }

    async fn capture(&self, args: &[&str]) -> Result<Output> {
        log::debug!("Running {}", self.describe(args));
        Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_failure(args, e))
    }
}

#[async_trait]
impl SyncEngine for RcloneEngine {
    async fn sync(&self, source: &str, dest: &str) -> Result<()> {
        let mut args = vec!["sync", source, dest];
        if self.progress {
            args.push("--progress");
        }
        self.run(&args).await
    }

    async fn check(&self, source: &str, dest: &str) -> Result<CheckReport> {
        let args = ["check", source, dest, "--combined", "-"];
        let output = self.capture(&args).await?;
        let entries = parse_combined(&String::from_utf8_lossy(&output.stdout));

        // A non-zero exit with a listing means differences, not a failure
        if !output.status.success() && entries.is_empty() {
            return Err(self.exit_failure(&args, &output));
        }

        Ok(CheckReport {
            identical: output.status.success(),
            entries,
        })
    }

    async fn cat(&self, path: &str) -> Result<String> {
        let args = ["cat", path];
        let output = self.capture(&args).await?;
        if !output.status.success() {
            return Err(self.exit_failure(&args, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn copy_file(&self, source: &str, dest: &str) -> Result<()> {
        self.run(&["copyto", source, dest]).await
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

/// Parse `rclone check --combined` output: one `<marker> <path>` per line.
pub(crate) fn parse_combined(stdout: &str) -> Vec<CheckEntry> {
    stdout
        .lines()
        .filter_map(|line| {
            let (marker, path) = line.split_once(' ')?;
            if marker.is_empty() || path.is_empty() {
                return None;
            }
            Some(CheckEntry {
                marker: marker.to_string(),
                path: path.to_string(),
            })
        })
        .collect()
}
