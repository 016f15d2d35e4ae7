#[cfg(not(debug_assertions))]
use human_panic::setup_panic;

#[cfg(debug_assertions)]
extern crate better_panic;

use std::error::Error as _;
use std::process::ExitCode;

use utils::app_config::AppConfig;
use utils::error::{Error, Result};

fn install_panic_handler() {
    #[cfg(not(debug_assertions))]
    {
        setup_panic!();
    }

    #[cfg(debug_assertions)]
    {
        better_panic::Settings::debug()
            .most_recent_first(false)
            .lineno_suffix(true)
            .verbosity(better_panic::Verbosity::Full)
            .install();
    }
}

/// Print a fatal error and its causes, one per line.
fn report(err: &Error) {
    let mut last = err.to_string();
    eprintln!("wrclone: {}", last);

    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if text != last {
            eprintln!("  caused by: {}", text);
        }
        last = text;
        source = cause.source();
    }
}

async fn run() -> Result<()> {
    // Defaults first; save.ini and the environment are layered on later
    AppConfig::init(Some(include_str!("resources/default_config.toml")))?;

    // Held until the run ends so the async drains flush
    let _guard = utils::logger::setup_logging()?;

    let result = cli::cli_match().await;
    if let Err(e) = &result {
        log::error!("{}", e);
    }
    result
}

#[tokio::main]
async fn main() -> ExitCode {
    install_panic_handler();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}
