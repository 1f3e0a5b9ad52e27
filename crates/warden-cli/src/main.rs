mod cli;
mod commands;
mod config;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use output::print_error;

fn main() {
    // .env is optional; only report it when present but unreadable.
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            print_error(&format!("{e:#}"));
            std::process::exit(2);
        }
    }
}

/// Returns `false` when the command ran but reported a failure.
fn run() -> Result<bool> {
    let cli = Cli::parse();
    let engine = config::resolve(&cli)?;
    observability::init_tracing(&engine.logging.level);
    let format = cli.format.unwrap_or_default();

    tracing::debug!(
        policy_dir = %engine.policy_dir.display(),
        suffix = %engine.file_suffix,
        "Configuration loaded"
    );

    match &cli.command {
        Commands::Check(args) => commands::check::check(&engine, args, format),
        Commands::Eval(args) => {
            commands::eval::eval(&engine, args, format)?;
            Ok(true)
        }
        Commands::Show(args) => {
            commands::show::show(&engine, args, format)?;
            Ok(true)
        }
    }
}
