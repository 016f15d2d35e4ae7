use std::path::PathBuf;

use clap::{Parser, ValueEnum};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "wrclone", version)]
#[command(
    about = "Sync directories via rclone according to config/config.json",
    long_about = None
)]
pub struct Cli {
    /// One or more names defined in the JSON configuration
    #[arg(required = true, value_name = "NAME")]
    pub names: Vec<String>,

    /// Action to run against every name
    #[arg(short, long, value_enum, ignore_case = true, default_value_t = ActionArg::Check)]
    pub action: ActionArg,

    /// Ask for confirmation before every transfer
    #[arg(long)]
    pub confirm: bool,

    /// With --action check, list differences for every directory pair
    #[arg(long)]
    pub diff: bool,

    /// INI file with the [settings] section (default: save.ini next to the executable)
    #[arg(short, long, value_name = "FILE")]
    pub ini: Option<PathBuf>,

    /// Do not pass --progress to rclone sync
    #[arg(long)]
    pub no_progress: bool,

    /// rclone executable to use instead of settings.rclone
    #[arg(long, value_name = "BIN")]
    pub rclone: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionArg {
    Pull,
    Push,
    Check,
}

impl From<ActionArg> for app::dispatch::Action {
    fn from(action: ActionArg) -> Self {
        match action {
            ActionArg::Pull => app::dispatch::Action::Pull,
            ActionArg::Push => app::dispatch::Action::Push,
            ActionArg::Check => app::dispatch::Action::Check,
        }
    }
}

pub async fn cli_match() -> utils::error::Result<()> {
    let cli = Cli::parse();
    commands::sync_cmd(cli).await
}
