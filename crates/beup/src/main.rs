use std::process::ExitCode;

use beup_core::{config::Config, exec::SystemRunner, pipeline};
use beup_telegram::TelegramNotifier;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = beup_core::logging::init("beup") {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    // Missing credentials abort before any network or file activity.
    let cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let notifier = TelegramNotifier::new(&cfg);
    let runner = SystemRunner;

    match pipeline::run(&cfg, &notifier, &runner).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code() as u8),
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
