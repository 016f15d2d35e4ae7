use std::path::PathBuf;

use app::dispatch::{DispatchOptions, StdinConfirm};
use app::engine::{RcloneEngine, SyncEngine};
use app::sync::{sync, KeyOutcome, SyncParams};
use utils::app_config::AppConfig;

use crate::Cli;

const DEFAULT_INI: &str = "save.ini";

/// `save.ini` next to the executable, falling back to the working directory.
fn default_ini_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_INI)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INI))
}

pub async fn sync_cmd(cli: Cli) -> utils::error::Result<()> {
    match &cli.ini {
        Some(path) if !path.exists() => {
            println!("Settings file not found: {}", path.display());
            return Ok(());
        }
        Some(path) => AppConfig::merge_ini(path, true)?,
        None => AppConfig::merge_ini(&default_ini_path(), false)?,
    }
    if let Some(rclone) = &cli.rclone {
        AppConfig::set("settings.rclone", rclone)?;
    }

    let config = AppConfig::fetch()?;
    log::debug!("Settings: {:?}", config.settings);

    let engine = RcloneEngine::new(&config.settings.rclone).with_progress(!cli.no_progress);
    if !engine.is_available().await {
        println!(
            "Rclone is not installed or not found on PATH ({}).",
            engine.binary()
        );
        return Ok(());
    }

    let params = SyncParams {
        names: cli.names,
        action: cli.action.into(),
        options: DispatchOptions {
            confirm: cli.confirm,
            diff: cli.diff,
        },
    };

    match sync(&config.settings, &params, &engine, &StdinConfirm).await {
        Ok(outcomes) => {
            let skipped = outcomes
                .iter()
                .filter(|o| matches!(o, KeyOutcome::Skipped { .. }))
                .count();
            log::info!(
                "{} finished: {} of {} names processed",
                params.action,
                outcomes.len() - skipped,
                outcomes.len()
            );
            Ok(())
        }
        Err(e) if !e.is_fatal() => {
            println!("{}", e);
            log::warn!("{}", e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
