//! 配置存储 - 从JSON文档加载命名的目录对配置

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::{Result, SyncError};

/// 单个目录对：本地路径与远端相对路径
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryPair {
    pub source: String,
    pub dest: String,
}

/// 命名的目录集配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryPairConfig {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// 远端基础路径，例如 `gdrive:/backup/`
    #[serde(default)]
    pub remote: String,

    /// 远端日志子路径，为空时不做变更检测
    #[serde(default)]
    pub log: Option<String>,

    /// 不是目录对列表时视为未定义
    #[serde(default, deserialize_with = "list_or_none")]
    pub directories: Option<Vec<DirectoryPair>>,

    /// 旧格式：单个目录对直接写在记录上
    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub dest: Option<String>,
}

impl DirectoryPairConfig {
    /// The remote log subpath, empty when change tracking is off.
    pub fn log_subpath(&self) -> &str {
        self.log.as_deref().unwrap_or("")
    }

    pub fn tracks_log(&self) -> bool {
        !self.log_subpath().is_empty()
    }

    /// Directory pairs in configured order. Records in the older flat format
    /// (`source`/`dest` on the record itself) yield a single pair.
    pub fn directory_pairs(&self) -> Vec<DirectoryPair> {
        match (&self.directories, &self.source, &self.dest) {
            (Some(directories), _, _) => directories.clone(),
            (None, Some(source), Some(dest)) => vec![DirectoryPair {
                source: source.clone(),
                dest: dest.clone(),
            }],
            _ => Vec::new(),
        }
    }

    /// `remote` and `dest` are joined verbatim, the way rclone paths are
    /// written in the config file.
    pub fn remote_path(&self, dest: &str) -> String {
        format!("{}{}", self.remote, dest)
    }
}

fn list_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<DirectoryPair>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// 加载配置文件
///
/// Only a document that is not a JSON array is malformed. Records without a
/// string `name` are skipped, as are named records whose fields cannot be
/// read; neither hides the remaining entries.
pub fn load(path: &Path) -> Result<Vec<DirectoryPairConfig>> {
    if !path.exists() {
        return Err(SyncError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let malformed = |reason: String| SyncError::ConfigMalformed {
        path: path.to_path_buf(),
        reason,
    };

    let contents = std::fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&contents).map_err(|e| malformed(e.to_string()))?;
    let records = match document {
        Value::Array(records) => records,
        _ => return Err(malformed("top level is not a list".to_string())),
    };

    let mut entries = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        if !matches!(record.get("name"), Some(Value::String(_))) {
            log::debug!("Skipping record #{} without a name", index);
            continue;
        }
        match serde_json::from_value::<DirectoryPairConfig>(record) {
            Ok(entry) => entries.push(entry),
            Err(e) => log::warn!("Skipping record #{} in {}: {}", index, path.display(), e),
        }
    }

    log::debug!("Loaded {} entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// 按名称查找，返回第一个匹配项
pub fn find<'a>(entries: &'a [DirectoryPairConfig], name: &str) -> Option<&'a DirectoryPairConfig> {
    entries.iter().find(|entry| entry.name == name)
}
