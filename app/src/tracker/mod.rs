//! 变更检测 - 比较本地缓存的标记与远端标记

use chrono::Local;
use std::path::{Path, PathBuf};

use crate::engine::SyncEngine;
use crate::error::Result;

/// 本地标记文件：`<tmp>/<name>.txt`
pub fn local_marker_path(tmp_dir: &Path, name: &str) -> PathBuf {
    tmp_dir.join(format!("{}.txt", name))
}

/// 远端日志目录：`<remote><log>`
pub fn remote_log_dir(remote: &str, log: &str) -> String {
    format!("{}{}", remote, log)
}

/// 远端标记文件：`<remote><log>/<name>.txt`
pub fn remote_marker_path(remote: &str, log: &str, name: &str) -> String {
    format!("{}/{}.txt", remote_log_dir(remote, log), name)
}

/// Current local time in ISO-8601, microsecond precision, no offset.
pub fn timestamp() -> String {
    Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// Contents of the local marker; a missing or unreadable file reads as "".
pub fn read_local_marker(tmp_dir: &Path, name: &str) -> String {
    let path = local_marker_path(tmp_dir, name);
    match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            log::warn!("Cannot read marker {}: {}", path.display(), e);
            String::new()
        }
    }
}

/// Overwrite the local marker, creating the cache directory if needed.
pub fn write_local_marker(tmp_dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(tmp_dir)?;
    let path = local_marker_path(tmp_dir, name);
    std::fs::write(&path, content)?;
    Ok(path)
}

/// 标记比较结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    /// The entry has no log subpath.
    Untracked,
    Identical,
    Differs,
    /// The remote marker could not be fetched.
    RemoteUnreadable,
}

impl MarkerState {
    pub fn needs_update(&self) -> bool {
        !matches!(self, MarkerState::Identical)
    }
}

/// 变更检测器
pub struct ChangeTracker<'a, E: SyncEngine + ?Sized> {
    engine: &'a E,
    tmp_dir: &'a Path,
}

impl<'a, E: SyncEngine + ?Sized> ChangeTracker<'a, E> {
    pub fn new(engine: &'a E, tmp_dir: &'a Path) -> Self {
        Self { engine, tmp_dir }
    }

    /// Whether the remote state of `name` differs from the last one recorded
    /// locally. An empty `log` disables tracking and always reports a change,
    /// as does a remote marker that cannot be read.
    pub async fn needs_update(&self, name: &str, remote: &str, log: &str) -> bool {
        self.compare(name, remote, log).await.needs_update()
    }

    /// Same comparison as [`needs_update`](Self::needs_update), keeping the
    /// reason behind a change.
    pub async fn compare(&self, name: &str, remote: &str, log: &str) -> MarkerState {
        if log.is_empty() {
            return MarkerState::Untracked;
        }

        let local_content = read_local_marker(self.tmp_dir, name);
        let remote_path = remote_marker_path(remote, log, name);

        let remote_content = match self.engine.cat(&remote_path).await {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Cannot read remote marker {}: {}", remote_path, e);
                return MarkerState::RemoteUnreadable;
            }
        };

        if local_content == remote_content {
            log::info!("No update needed for {}", name);
            return MarkerState::Identical;
        }

        log::debug!(
            "Marker mismatch for {}: local {:?}, remote {:?}",
            name,
            local_content,
            remote_content
        );
        MarkerState::Differs
    }
}
