use std::path::PathBuf;
use std::process;
mod cli;
mod diagram;
mod exit_codes;
mod flow;
mod validate;

use clap::CommandFactory;
use cli::{Cli, Commands};
use exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_WARNING};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let Some(command) = cli.command else {
        if let Err(e) = Cli::command().print_help() {
            eprintln!("Failed to print help: {}", e);
        }
        process::exit(EXIT_SUCCESS);
    };

    use tracing::Level;
    use tracing_subscriber::EnvFilter;

    let log_level = if cli.quiet {
        Level::ERROR
    } else if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::TRACE
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level.to_string())),
        )
        .init();

    let exit_code = match command {
        Commands::Parse { file, format } => {
            tracing::debug!("Parsing {}", file.display());
            run_parse(file, format)
        }
        Commands::Validate { file } => {
            tracing::debug!("Validating {}", file.display());
            run_validate(file, cli.quiet)
        }
        Commands::Export { file, highlight } => {
            tracing::debug!("Exporting {}", file.display());
            run_export(file, highlight)
        }
        Commands::Run {
            file,
            id,
            vars,
            state_dir,
            restart,
        } => {
            tracing::info!("Running {}", file.display());
            run_flow(flow::RunOptions {
                file,
                id,
                vars,
                state_dir,
                restart,
            })
            .await
        }
    };

    process::exit(exit_code);
}

fn run_parse(file: PathBuf, format: cli::ParseFormat) -> i32 {
    match diagram::run_parse_command(&file, format) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            tracing::error!("Parse error: {:#}", e);
            EXIT_ERROR
        }
    }
}

/// Parse a diagram and check its structure.
///
/// Exit code:
/// - 0: No problems
/// - 1: Warnings (unreachable nodes)
/// - 2: Structural violations, or the file could not be read or parsed
fn run_validate(file: PathBuf, quiet: bool) -> i32 {
    match validate::run_validate_command(&file, quiet) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            tracing::error!("Validate error: {:#}", e);
            EXIT_ERROR
        }
    }
}

fn run_export(file: PathBuf, highlight: Option<String>) -> i32 {
    match diagram::run_export_command(&file, highlight) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            tracing::error!("Export error: {:#}", e);
            EXIT_ERROR
        }
    }
}

async fn run_flow(options: flow::RunOptions) -> i32 {
    match flow::run_flow_command(options).await {
        Ok(flow::FlowOutcome::Cancelled) => EXIT_WARNING,
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            tracing::error!("Flow error: {:#}", e);
            EXIT_WARNING
        }
    }
}
