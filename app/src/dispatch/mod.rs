//! 动作分发 - 根据变更检测结果决定是否允许推送/拉取，并逐个目录调用同步引擎

use std::fmt;
use std::path::Path;

use crate::config::DirectoryPairConfig;
use crate::engine::{CheckReport, SyncEngine};
use crate::error::{Result, SyncError};
use crate::tracker::{
    local_marker_path, remote_marker_path, timestamp, write_local_marker, ChangeTracker, MarkerState,
};

mod confirm;

pub use confirm::{is_affirmative, Confirm, StdinConfirm};

const CONFIRM_PROMPT: &str = "Continue? [y/N] ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    Pull,
    Push,
    #[default]
    Check,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Pull => "pull",
            Action::Push => "push",
            Action::Check => "check",
        }
    }

    fn progressive(&self) -> &'static str {
        match self {
            Action::Pull => "pulling",
            Action::Push => "pushing",
            Action::Check => "checking",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Action::Pull => "Pull",
            Action::Push => "Push",
            Action::Check => "Check",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 变更检测结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Changed,
    Unchanged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Ask before every single transfer.
    pub confirm: bool,
    /// Let `check` compare each directory pair.
    pub diff: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Completed,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub from: String,
    pub to: String,
    pub status: TransferStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryCheck {
    pub source: String,
    pub dest: String,
    pub report: CheckReport,
}

/// 单个配置项的执行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub name: String,
    pub action: Action,
    /// `None` when the entry has no log subpath.
    pub verdict: Option<Verdict>,
    pub transfers: Vec<Transfer>,
    pub checks: Vec<DirectoryCheck>,
}

impl DispatchReport {
    fn new(name: &str, action: Action) -> Self {
        Self {
            name: name.to_string(),
            action,
            verdict: None,
            transfers: Vec::new(),
            checks: Vec::new(),
        }
    }

    pub fn completed(&self) -> usize {
        self.count(TransferStatus::Completed)
    }

    pub fn aborted(&self) -> usize {
        self.count(TransferStatus::Aborted)
    }

    fn count(&self, status: TransferStatus) -> usize {
        self.transfers.iter().filter(|t| t.status == status).count()
    }
}

/// 动作分发器
pub struct Dispatcher<'a, E: SyncEngine + ?Sized, C: Confirm + ?Sized> {
    engine: &'a E,
    confirmer: &'a C,
    tmp_dir: &'a Path,
    options: DispatchOptions,
}

impl<'a, E: SyncEngine + ?Sized, C: Confirm + ?Sized> Dispatcher<'a, E, C> {
    pub fn new(engine: &'a E, confirmer: &'a C, tmp_dir: &'a Path, options: DispatchOptions) -> Self {
        Self {
            engine,
            confirmer,
            tmp_dir,
            options,
        }
    }

    /// Run `action` for one config entry.
    ///
    /// Log gating happens first and may refuse the action with
    /// [`SyncError::ActionNotPermitted`]. Directory pairs are then handled in
    /// configured order. Any engine failure ends the dispatch immediately.
    pub async fn dispatch(&self, entry: &DirectoryPairConfig, action: Action) -> Result<DispatchReport> {
        let mut report = DispatchReport::new(&entry.name, action);

        if let Some(description) = &entry.description {
            println!("Description ({}): {}", entry.name, description);
        }

        if entry.tracks_log() {
            report.verdict = Some(self.gate(entry, action).await?);
        }

        let pairs = entry.directory_pairs();
        if pairs.is_empty() {
            return Err(SyncError::NoDirectories(entry.name.clone()));
        }

        for pair in &pairs {
            let remote = entry.remote_path(&pair.dest);
            match action {
                Action::Push => {
                    let transfer = self.transfer(&entry.name, action, &pair.source, &remote).await?;
                    report.transfers.push(transfer);
                }
                Action::Pull => {
                    let transfer = self.transfer(&entry.name, action, &remote, &pair.source).await?;
                    report.transfers.push(transfer);
                }
                Action::Check if self.options.diff => {
                    let check = self.check(&entry.name, &pair.source, &remote).await?;
                    report.checks.push(check);
                }
                Action::Check => {}
            }
        }

        Ok(report)
    }

    /// Decide whether `action` may go ahead given the change markers.
    ///
    /// | action | changed            | unchanged          |
    /// |--------|--------------------|--------------------|
    /// | push   | refused            | stamp and upload   |
    /// | pull   | download marker    | refused            |
    /// | check  | report             | report             |
    ///
    /// A remote marker that cannot be read counts as changed; the pull then
    /// goes ahead without a marker to download.
    async fn gate(&self, entry: &DirectoryPairConfig, action: Action) -> Result<Verdict> {
        std::fs::create_dir_all(self.tmp_dir)?;

        let log = entry.log_subpath();
        let tracker = ChangeTracker::new(self.engine, self.tmp_dir);
        let state = tracker.compare(&entry.name, &entry.remote, log).await;
        let changed = state.needs_update();
        let remote_marker = remote_marker_path(&entry.remote, log, &entry.name);

        match (action, changed) {
            (Action::Push, true) => Err(refusal(entry, action, "changes detected")),
            (Action::Pull, false) => Err(refusal(entry, action, "no changes detected")),
            (Action::Pull, true) if state == MarkerState::RemoteUnreadable => {
                println!("Remote marker {} not found, pulling without it.", remote_marker);
                Ok(Verdict::Changed)
            }
            (Action::Pull, true) => {
                let local_marker = local_marker_path(self.tmp_dir, &entry.name);
                self.engine
                    .copy_file(&remote_marker, &local_marker.to_string_lossy())
                    .await?;
                Ok(Verdict::Changed)
            }
            (Action::Push, false) => {
                // No rollback: a failed upload leaves the new local marker behind
                let local_marker = write_local_marker(self.tmp_dir, &entry.name, &timestamp())?;
                self.engine
                    .copy_file(&local_marker.to_string_lossy(), &remote_marker)
                    .await?;
                Ok(Verdict::Unchanged)
            }
            (Action::Check, true) => {
                println!("Changes detected for {}", entry.name);
                Ok(Verdict::Changed)
            }
            (Action::Check, false) => {
                println!("No update needed for {}", entry.name);
                Ok(Verdict::Unchanged)
            }
        }
    }

    async fn transfer(&self, name: &str, action: Action, from: &str, to: &str) -> Result<Transfer> {
        let status = match self.sync_one(name, action, from, to).await {
            Ok(()) => TransferStatus::Completed,
            Err(SyncError::UserAborted { .. }) => {
                println!("Aborted.");
                log::info!("{} ({}) from {} to {} declined", action, name, from, to);
                TransferStatus::Aborted
            }
            Err(e) => return Err(e),
        };

        Ok(Transfer {
            from: from.to_string(),
            to: to.to_string(),
            status,
        })
    }

    async fn sync_one(&self, name: &str, action: Action, from: &str, to: &str) -> Result<()> {
        println!("{} ({}) from {} to {}", action.progressive(), name, from, to);

        if self.options.confirm && !self.confirmer.confirm(CONFIRM_PROMPT)? {
            return Err(SyncError::UserAborted {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        self.engine.sync(from, to).await?;
        log::info!("{} ({}) from {} to {} done", action, name, from, to);
        Ok(())
    }

    async fn check(&self, name: &str, source: &str, dest: &str) -> Result<DirectoryCheck> {
        println!("Checking ({}) between {} and {}", name, source, dest);
        let report = self.engine.check(source, dest).await?;

        if report.identical {
            println!("The source and destination are identical.");
        } else {
            println!("Differences found:");
            for diff in report.differences() {
                println!("- {}", diff.path);
            }
        }

        Ok(DirectoryCheck {
            source: source.to_string(),
            dest: dest.to_string(),
            report,
        })
    }
}

fn refusal(entry: &DirectoryPairConfig, action: Action, reason: &str) -> SyncError {
    SyncError::ActionNotPermitted {
        name: entry.name.clone(),
        action: action.title().to_string(),
        reason: reason.to_string(),
    }
}
