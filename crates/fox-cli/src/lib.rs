//! # fox-cli
//!
//! Wayfinder Fox command-line interface.
//!
//! Provides commands for:
//! - Running the `fox_enrich` action on an alert payload
//! - Validating payloads without side effects
//! - Inspecting criticality routing and ProjectContext lookups
//! - Emitting historical demo traffic
//!
//! # Architecture
//!
//! Configuration is layered: a TOML file, then `FOX_*` / `CONTEXTCORE_*`
//! environment variables, then command-line flags. Spans go to the debug log
//! or an OTLP collector.
//!
//! ```text
//! ┌─────────┐  payload   ┌────────────┐  spans   ┌───────────────┐
//! │ fox-cli │───────────►│ fox-enrich │─────────►│ fox-telemetry │
//! └─────────┘            └────────────┘          └───────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

use std::io::Write;
use std::sync::Arc;

use fox_enrich::{FoxConfig, FoxError};
use fox_telemetry::{FoxTracer, OtlpExporter};

pub use cli::{Cli, Commands, DemoArgs, ExporterKind, Format, LookupArgs, PayloadArgs};
pub use error::CliError;
pub use output::OutputFormat;

use commands::{ActionsCommand, DemoCommand, ExecuteCommand, LookupCommand, RouteCommand};

/// Builds the effective configuration for a command line.
///
/// # Errors
///
/// Returns `CliError::Config` if the file cannot be read or the file or an
/// environment variable is invalid.
pub fn load_config(cli: &Cli) -> Result<FoxConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => FoxConfig::from_file(path).map_err(config_error)?,
        None => FoxConfig::default(),
    };
    config
        .apply_env_with(|key| std::env::var(key).ok())
        .map_err(config_error)?;
    apply_flags(&mut config, cli);
    Ok(config)
}

fn config_error(err: FoxError) -> CliError {
    match err {
        FoxError::Config { reason } => CliError::Config(reason),
        other => CliError::Enrich(other),
    }
}

fn apply_flags(config: &mut FoxConfig, cli: &Cli) {
    if let Some(endpoint) = &cli.otlp_endpoint {
        config.otlp_endpoint.clone_from(endpoint);
    }
    if let Some(path) = &cli.yaml_path {
        config.contextcore_yaml_path.clone_from(path);
    }
    if cli.kubernetes {
        config.use_kubernetes = true;
    }
}

/// Creates the tracer for the selected exporter.
///
/// The OTLP exporter must be built from within a Tokio runtime.
///
/// # Errors
///
/// Returns `CliError::Telemetry` if the OTLP exporter cannot be built.
pub fn build_tracer(kind: ExporterKind, config: &FoxConfig) -> Result<FoxTracer, CliError> {
    match kind {
        ExporterKind::Log => Ok(FoxTracer::with_log_exporter()),
        ExporterKind::Otlp => {
            let exporter = OtlpExporter::new(&config.otlp_endpoint, &config.service_name)?;
            Ok(FoxTracer::new(Arc::new(exporter)))
        }
    }
}

/// Runs the selected subcommand, writing its output to `out`.
///
/// Blocking: Kubernetes lookups use a blocking HTTP client, so call this
/// outside of async code.
///
/// # Errors
///
/// Returns the command's error.
pub fn dispatch<W: Write>(
    cli: &Cli,
    config: &FoxConfig,
    tracer: &FoxTracer,
    out: &mut W,
) -> Result<(), CliError> {
    let format = OutputFormat::new(cli.format);

    match &cli.command {
        Commands::Execute(args) => ExecuteCommand::new(config, tracer).execute(out, &format, args),
        Commands::Validate(args) => ExecuteCommand::new(config, tracer).validate(out, &format, args),
        Commands::Route { criticality } => {
            RouteCommand::new(&config.routing_table).execute(out, &format, criticality)
        }
        Commands::Lookup(args) => LookupCommand::new(config).execute(out, &format, args),
        Commands::Actions => ActionsCommand::new().execute(out, &format),
        Commands::Demo(args) => {
            DemoCommand::new(tracer, &config.routing_table).execute(out, &format, args)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "wayfinder-fox",
            "--otlp-endpoint",
            "collector:4317",
            "--yaml-path",
            "/etc/fox/context.yaml",
            "--kubernetes",
            "actions",
        ]);
        let mut config = FoxConfig::default();
        apply_flags(&mut config, &cli);

        assert_eq!(config.otlp_endpoint, "collector:4317");
        assert_eq!(config.contextcore_yaml_path, PathBuf::from("/etc/fox/context.yaml"));
        assert!(config.use_kubernetes);
    }

    #[test]
    fn absent_flags_keep_config() {
        let cli = Cli::parse_from(["wayfinder-fox", "actions"]);
        let mut config = FoxConfig {
            use_kubernetes: true,
            ..FoxConfig::default()
        };
        apply_flags(&mut config, &cli);

        assert!(config.use_kubernetes);
        assert_eq!(config.otlp_endpoint, "localhost:4317");
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fox.toml");
        std::fs::write(&path, "service_name = \"fox-test\"\n[cache]\nttl_secs = 30\n").unwrap();

        let cli = Cli::parse_from([
            "wayfinder-fox",
            "--config",
            path.to_str().unwrap(),
            "actions",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.service_name, "fox-test");
        assert_eq!(config.cache.ttl_secs, 30);
    }

    #[test]
    fn missing_config_file_is_error() {
        let cli = Cli::parse_from(["wayfinder-fox", "--config", "/nonexistent/fox.toml", "actions"]);
        let err = load_config(&cli).unwrap_err();
        assert!(matches!(err, CliError::Config(ref reason) if reason.contains("/nonexistent/fox.toml")));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn invalid_config_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fox.toml");
        std::fs::write(&path, "[cache]\nmax_entries = 0\n").unwrap();

        let cli = Cli::parse_from(["wayfinder-fox", "--config", path.to_str().unwrap(), "actions"]);
        let err = load_config(&cli).unwrap_err();
        assert_eq!(err.to_string(), "configuration error: cache.max_entries must be at least 1");
    }

    #[test]
    fn non_config_errors_keep_their_kind() {
        let err = config_error(FoxError::InvalidPayload {
            reason: "empty".into(),
        });
        assert!(matches!(err, CliError::Enrich(FoxError::InvalidPayload { .. })));
    }

    #[test]
    fn log_tracer_needs_no_runtime() {
        let tracer = build_tracer(ExporterKind::Log, &FoxConfig::default()).unwrap();
        assert_eq!(tracer.exporter_name(), "log");
    }

    #[test]
    fn dispatch_route_writes_output() {
        let cli = Cli::parse_from(["wayfinder-fox", "route", "critical"]);
        let config = FoxConfig::default();
        let mut out = Vec::new();
        dispatch(&cli, &config, &FoxTracer::default(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "critical → claude_analysis, context_notify\n"
        );
    }
}
