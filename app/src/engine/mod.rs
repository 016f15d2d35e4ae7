//! 同步引擎 - 外部同步工具的能力接口

use async_trait::async_trait;

use crate::error::Result;

mod rclone;

pub use rclone::RcloneEngine;

/// Marker rclone uses for a file that is identical on both sides.
pub const UNCHANGED_MARKER: &str = "=";

/// One line of a combined check listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckEntry {
    pub marker: String,
    pub path: String,
}

/// 比较结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub identical: bool,
    pub entries: Vec<CheckEntry>,
}

impl CheckReport {
    /// Entries whose marker is anything other than "unchanged".
    pub fn differences(&self) -> impl Iterator<Item = &CheckEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.marker != UNCHANGED_MARKER)
    }
}

/// 同步引擎接口
///
/// Every call blocks the caller until the underlying transfer finishes; the
/// dispatcher never issues two calls at once.
#[async_trait]
pub trait SyncEngine: Send + Sync {
    /// Make `dest` identical to `source`.
    async fn sync(&self, source: &str, dest: &str) -> Result<()>;

    /// Compare two locations without modifying either.
    async fn check(&self, source: &str, dest: &str) -> Result<CheckReport>;

    /// Read a single (usually remote) file as text.
    async fn cat(&self, path: &str) -> Result<String>;

    /// Copy one file to an exact destination path.
    async fn copy_file(&self, source: &str, dest: &str) -> Result<()>;

    /// Whether the backend can be reached at all.
    async fn is_available(&self) -> bool;
}
