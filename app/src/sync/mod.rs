//! 同步模块 - 一次运行的入口：加载配置，按名称依次分发动作

use std::path::{Path, PathBuf};

use utils::app_config::Settings;

use crate::config;
use crate::dispatch::{Action, Confirm, DispatchOptions, DispatchReport, Dispatcher};
use crate::engine::SyncEngine;
use crate::error::{Result, SyncError};

/// 同步参数 - 来自CLI的输入参数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncParams {
    /// 配置名称，按顺序处理
    pub names: Vec<String>,
    pub action: Action,
    pub options: DispatchOptions,
}

/// 单个名称的处理结果
#[derive(Debug)]
pub enum KeyOutcome {
    Completed(DispatchReport),
    /// Reported to the operator, the run went on with the next name.
    Skipped { name: String, reason: SyncError },
}

impl KeyOutcome {
    pub fn name(&self) -> &str {
        match self {
            KeyOutcome::Completed(report) => &report.name,
            KeyOutcome::Skipped { name, .. } => name,
        }
    }
}

/// 主同步函数 - 入口点
///
/// Fails with `ConfigNotFound`/`ConfigMalformed` before any name is touched
/// and with the first fatal engine error. Every other problem is printed and
/// recorded as [`KeyOutcome::Skipped`].
pub async fn sync<E, C>(settings: &Settings, params: &SyncParams, engine: &E, confirmer: &C) -> Result<Vec<KeyOutcome>>
where
    E: SyncEngine + ?Sized,
    C: Confirm + ?Sized,
{
    let config_path = PathBuf::from(&settings.config);
    let entries = config::load(&config_path)?;
    let tmp_dir = Path::new(&settings.tmp);

    log::info!(
        "Starting {} for {:?} with {}",
        params.action,
        params.names,
        config_path.display()
    );

    let dispatcher = Dispatcher::new(engine, confirmer, tmp_dir, params.options);
    let mut outcomes = Vec::with_capacity(params.names.len());

    for name in &params.names {
        let result = match config::find(&entries, name) {
            Some(entry) => dispatcher.dispatch(entry, params.action).await,
            None => Err(SyncError::UnknownKey(name.clone())),
        };

        match result {
            Ok(report) => {
                log::info!(
                    "{} ({}) finished: {} completed, {} aborted",
                    params.action,
                    name,
                    report.completed(),
                    report.aborted()
                );
                outcomes.push(KeyOutcome::Completed(report));
            }
            Err(e) if !e.is_fatal() => {
                println!("{}", e);
                log::warn!("{} ({}) skipped: {}", params.action, name, e);
                outcomes.push(KeyOutcome::Skipped {
                    name: name.clone(),
                    reason: e,
                });
            }
            Err(e) => {
                log::error!("{} ({}) failed: {}", params.action, name, e);
                return Err(e);
            }
        }
    }

    Ok(outcomes)
}
