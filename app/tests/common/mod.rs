#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;

use app::config::{DirectoryPair, DirectoryPairConfig};
use app::dispatch::{is_affirmative, Confirm};
use app::engine::{CheckReport, SyncEngine};
use app::error::{Result, SyncError};
use async_trait::async_trait;

/// 引擎调用记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Sync { from: String, to: String },
    Check { source: String, dest: String },
    Cat(String),
    CopyFile { from: String, to: String },
}

impl Call {
    pub fn is_write(&self) -> bool {
        matches!(self, Call::Sync { .. } | Call::CopyFile { .. })
    }
}

/// 内存中的假引擎：远端文件存放在HashMap中，本地文件走真实文件系统
#[derive(Default)]
pub struct FakeEngine {
    remote: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<Call>>,
    check_report: Option<CheckReport>,
    fail_sync: bool,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_remote_file(self, path: &str, content: &str) -> Self {
        self.remote
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        self
    }

    pub fn with_check_report(mut self, report: CheckReport) -> Self {
        self.check_report = Some(report);
        self
    }

    pub fn failing_sync(mut self) -> Self {
        self.fail_sync = true;
        self
    }

    pub fn remote_file(&self, path: &str) -> Option<String> {
        self.remote.lock().unwrap().get(path).cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn write_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }

    pub fn syncs(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Sync { from, to } => Some((from, to)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn failure(command: String, message: &str) -> SyncError {
        SyncError::ExternalToolFailure {
            command,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl SyncEngine for FakeEngine {
    async fn sync(&self, source: &str, dest: &str) -> Result<()> {
        self.record(Call::Sync {
            from: source.to_string(),
            to: dest.to_string(),
        });
        if self.fail_sync {
            return Err(Self::failure(format!("rclone sync {} {}", source, dest), "exit status: 3"));
        }
        Ok(())
    }

    async fn check(&self, source: &str, dest: &str) -> Result<CheckReport> {
        self.record(Call::Check {
            source: source.to_string(),
            dest: dest.to_string(),
        });
        Ok(self.check_report.clone().unwrap_or(CheckReport {
            identical: true,
            entries: Vec::new(),
        }))
    }

    async fn cat(&self, path: &str) -> Result<String> {
        self.record(Call::Cat(path.to_string()));
        self.remote_file(path)
            .ok_or_else(|| Self::failure(format!("rclone cat {}", path), "object not found"))
    }

    async fn copy_file(&self, source: &str, dest: &str) -> Result<()> {
        self.record(Call::CopyFile {
            from: source.to_string(),
            to: dest.to_string(),
        });

        // remote -> local download
        if let Some(content) = self.remote_file(source) {
            std::fs::write(dest, content)?;
            return Ok(());
        }

        // local -> remote upload
        if Path::new(source).exists() {
            let content = std::fs::read_to_string(source)?;
            self.remote.lock().unwrap().insert(dest.to_string(), content);
            return Ok(());
        }

        Err(Self::failure(format!("rclone copyto {} {}", source, dest), "source not found"))
    }

    async fn is_available(&self) -> bool {
        true
    }
}

/// 按脚本回答确认提示
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<String>>,
    prompts: Mutex<usize>,
}

impl ScriptedConfirm {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
            prompts: Mutex::new(0),
        }
    }

    pub fn prompts(&self) -> usize {
        *self.prompts.lock().unwrap()
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        *self.prompts.lock().unwrap() += 1;
        let answer = self.answers.lock().unwrap().pop_front().unwrap_or_default();
        Ok(is_affirmative(&answer))
    }
}

/// `{name:"docs", remote:"r:/b/", log:"logs", directories:[{source:"/a", dest:"/d"}]}`
pub fn docs_entry() -> DirectoryPairConfig {
    DirectoryPairConfig {
        name: "docs".to_string(),
        description: Some("Documents".to_string()),
        remote: "r:/b/".to_string(),
        log: Some("logs".to_string()),
        directories: Some(vec![DirectoryPair {
            source: "/a".to_string(),
            dest: "/d".to_string(),
        }]),
        source: None,
        dest: None,
    }
}

pub fn untracked_entry(pairs: &[(&str, &str)]) -> DirectoryPairConfig {
    DirectoryPairConfig {
        name: "media".to_string(),
        description: None,
        remote: "r:/m/".to_string(),
        log: None,
        directories: Some(
            pairs
                .iter()
                .map(|(source, dest)| DirectoryPair {
                    source: source.to_string(),
                    dest: dest.to_string(),
                })
                .collect(),
        ),
        source: None,
        dest: None,
    }
}

pub const DOCS_REMOTE_MARKER: &str = "r:/b/logs/docs.txt";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
