//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Wayfinder Fox - alert enrichment with project business context.
#[derive(Parser, Debug, Clone)]
#[command(name = "wayfinder-fox")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file. Environment variables and flags override it.
    #[arg(short, long, env = "FOX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Where finished spans are sent.
    #[arg(long, value_enum, env = "FOX_EXPORTER", default_value_t = ExporterKind::Log)]
    pub exporter: ExporterKind,

    /// OTLP collector endpoint.
    #[arg(long)]
    pub otlp_endpoint: Option<String>,

    /// Fallback `.contextcore.yaml` file.
    #[arg(long)]
    pub yaml_path: Option<PathBuf>,

    /// Look up ProjectContext resources in the cluster.
    #[arg(long)]
    pub kubernetes: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub log_json: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// Span exporter options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExporterKind {
    /// Write spans to the debug log.
    #[default]
    Log,
    /// Send spans to an OTLP/gRPC collector.
    Otlp,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run an action on a JSON payload.
    Execute(PayloadArgs),

    /// Check a payload without running it.
    Validate(PayloadArgs),

    /// Show the actions a criticality routes to.
    Route {
        /// Criticality to route, e.g. `critical`.
        criticality: String,
    },

    /// Resolve the ProjectContext for a project or namespace.
    Lookup(LookupArgs),

    /// List registered actions.
    Actions,

    /// Emit historical demo traffic.
    Demo(DemoArgs),
}

/// Arguments for commands that take a payload.
#[derive(Args, Debug, Clone)]
pub struct PayloadArgs {
    /// JSON payload file. Reads stdin when omitted or `-`.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Action to run.
    #[arg(short, long, default_value = "fox_enrich")]
    pub action: String,

    /// Name of the triggering system, e.g. `grafana`.
    #[arg(short, long)]
    pub source: Option<String>,
}

/// Arguments for the lookup command.
#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    /// Project id to match.
    #[arg(short, long)]
    pub project_id: Option<String>,

    /// Namespace of the workload.
    #[arg(short, long)]
    pub namespace: Option<String>,
}

/// Arguments for the demo command.
#[derive(Args, Debug, Clone)]
pub struct DemoArgs {
    /// Number of alert flows to generate.
    #[arg(short, long, default_value_t = 50)]
    pub count: usize,

    /// Spread flows over this many past hours.
    #[arg(long, default_value_t = 24)]
    pub hours_back: u32,

    /// Seed for reproducible data.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_execute_with_file() {
        let cli = Cli::parse_from(["wayfinder-fox", "execute", "--file", "alert.json"]);
        match cli.command {
            Commands::Execute(args) => {
                assert_eq!(args.file, Some(PathBuf::from("alert.json")));
                assert_eq!(args.action, "fox_enrich");
                assert!(args.source.is_none());
            }
            other => panic!("expected execute, got {other:?}"),
        }
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from([
            "wayfinder-fox",
            "--format",
            "json",
            "--exporter",
            "otlp",
            "--otlp-endpoint",
            "collector:4317",
            "--kubernetes",
            "actions",
        ]);
        assert_eq!(cli.format, Format::Json);
        assert_eq!(cli.exporter, ExporterKind::Otlp);
        assert_eq!(cli.otlp_endpoint.as_deref(), Some("collector:4317"));
        assert!(cli.kubernetes);
        assert!(matches!(cli.command, Commands::Actions));
    }

    #[test]
    fn cli_parses_route() {
        let cli = Cli::parse_from(["wayfinder-fox", "route", "critical"]);
        assert!(matches!(cli.command, Commands::Route { criticality } if criticality == "critical"));
    }

    #[test]
    fn cli_parses_demo_defaults() {
        let cli = Cli::parse_from(["wayfinder-fox", "demo"]);
        match cli.command {
            Commands::Demo(args) => {
                assert_eq!(args.count, 50);
                assert_eq!(args.hours_back, 24);
                assert!(args.seed.is_none());
            }
            other => panic!("expected demo, got {other:?}"),
        }
    }

    #[test]
    fn cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["wayfinder-fox"]).is_err());
    }
}
