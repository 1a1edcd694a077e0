//! Wayfinder Fox CLI binary entrypoint.
//!
//! This is the main entry point for the `wayfinder-fox` command-line tool.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fox_cli::cli::Cli;
use fox_cli::{CliError, build_tracer, dispatch, load_config};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;
    let tracer = build_tracer(cli.exporter, &config)?;

    // Context lookups use a blocking HTTP client.
    let worker_tracer = tracer.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let mut stdout = io::stdout().lock();
        dispatch(&cli, &config, &worker_tracer, &mut stdout)
    })
    .await
    .map_err(|e| CliError::Runtime(e.to_string()))?;

    let shutdown = tokio::task::spawn_blocking(move || tracer.shutdown())
        .await
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    outcome?;
    shutdown?;
    Ok(())
}
