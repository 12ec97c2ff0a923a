use clap::Parser;
use log::{error, info};
use std::io;

pub mod args;
pub mod error;
pub mod shell;

use args::{Cli, Commands};
use error::Result;
use shell::{render, Shell};
use tradebook_core::catalog::bootstrap;
use tradebook_core::config::AppConfig;
use tradebook_core::inventory::inventory;
use tradebook_core::store::{MemorySession, StoreError};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let session = MemorySession::connect(&config.store).inspect_err(|e| {
        error!("Could not open the store: {}", e);
    })?;
    bootstrap(&session, config.store.replication_factor)?;

    let outcome = run(&cli, &session, config);

    // Keep whatever was written, even when the command failed.
    finish(outcome, session.flush())
}

/// Combines the command outcome with the final snapshot flush. A failed
/// command keeps its own error; a flush failure is then only logged.
fn finish(outcome: Result<()>, flushed: std::result::Result<(), StoreError>) -> Result<()> {
    match (outcome, flushed) {
        (outcome, Ok(())) => {
            info!("Store saved");
            outcome
        }
        (Ok(()), Err(e)) => Err(e.into()),
        (Err(e), Err(flush_error)) => {
            error!("Could not save the store: {}", flush_error);
            Err(e)
        }
    }
}

fn run(cli: &Cli, session: &MemorySession, config: AppConfig) -> Result<()> {
    match cli.command.clone().unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let stdin = io::stdin();
            Shell::new(session, config, stdin.lock(), io::stdout()).run()?;
        }
        Commands::Generate { users, .. } => {
            let report = shell::generate(session, config.generator, users).inspect_err(|e| {
                error!("Generation failed: {}", e);
            })?;
            println!("Generated {}", report);
        }
        Commands::Inventory => {
            let counts = inventory(session)?;
            render::inventory(&mut io::stdout(), &counts)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use tradebook_core::catalog::ACCOUNTS_BY_USER;
    use tradebook_core::store::Session;

    #[test]
    fn test_generate_command_is_saved_to_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("data").join("store.json");
        let cli = Cli::parse_from([
            "tradebook",
            "--snapshot",
            snapshot.to_str().unwrap(),
            "--seed",
            "5",
            "generate",
            "--users",
            "2",
        ]);
        let mut config = AppConfig::default();
        cli.apply(&mut config);
        config.validate().unwrap();

        let session = MemorySession::connect(&config.store).unwrap();
        bootstrap(&session, config.store.replication_factor).unwrap();
        let outcome = run(&cli, &session, config.clone());
        finish(outcome, session.flush()).unwrap();
        assert!(snapshot.exists());

        let reopened = MemorySession::connect(&config.store).unwrap();
        assert!(reopened.count(ACCOUNTS_BY_USER).unwrap() >= 2);
    }

    #[test]
    fn test_command_error_wins_over_flush_error() {
        let result = finish(
            Err(CliError::Input("bad".to_string())),
            Err(StoreError::Snapshot("disk full".to_string())),
        );
        assert!(matches!(result, Err(CliError::Input(_))));

        let result = finish(Ok(()), Err(StoreError::Snapshot("disk full".to_string())));
        assert!(matches!(result, Err(CliError::Store(_))));

        let result = finish(Err(CliError::Input("bad".to_string())), Ok(()));
        assert!(matches!(result, Err(CliError::Input(_))));
        assert!(finish(Ok(()), Ok(())).is_ok());
    }
}
