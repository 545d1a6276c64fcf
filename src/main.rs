// src/main.rs

use clap::Parser;
use sinq::cli::{inspect, Cli};
use sinq::database::DbConnection;
use sinq::prompt::TerminalPrompter;
use sinq::session::EditSession;
use sinq::settings::io::load_settings_from_file;
use sinq::settings::AppSettings;
use std::error::Error;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "SINQ_LOG";

fn main() -> ExitCode {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let settings: AppSettings = match load_settings_from_file(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("sinq: could not load settings: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&cli, &settings);

    match run(cli, settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("sinq error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli, settings: &AppSettings) {
    let filter = std::env::var(LOG_ENV_VAR)
        .ok()
        .filter(|f| !f.trim().is_empty())
        .or_else(|| cli.log_level.clone())
        .unwrap_or_else(|| settings.log_filter.clone());
    let env_filter = EnvFilter::try_new(&filter).unwrap_or_else(|e| {
        eprintln!("sinq: ignoring invalid log filter '{}': {}", filter, e);
        EnvFilter::new(sinq::settings::DEFAULT_LOG_FILTER)
    });
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli, settings: AppSettings) -> Result<(), Box<dyn Error>> {
    let conn = DbConnection::open_existing(&cli.database, settings.enforce_foreign_keys)?;

    if let Some(command) = &cli.command {
        let stdout = std::io::stdout();
        inspect::run(&conn, command, &mut stdout.lock())?;
        return Ok(());
    }

    let mode = cli.mode.unwrap_or(settings.edit_mode);
    tracing::info!("Starting session on {:?} in {} mode", cli.database, mode);
    let mut prompter = TerminalPrompter::stdio(settings.editor.clone())?;
    let mut session = EditSession::new(conn, mode);
    session.run(&mut prompter, cli.table.as_deref())?;
    Ok(())
}
