//! Lookup command implementation.

use std::io::Write;

use fox_enrich::{ContextLookup, FoxConfig, LookupQuery, ProjectContextReader};

use crate::cli::LookupArgs;
use crate::error::CliError;
use crate::output::{LookupReport, OutputFormat};

/// Handler for the lookup command.
pub struct LookupCommand<'a> {
    config: &'a FoxConfig,
}

impl<'a> LookupCommand<'a> {
    /// Creates a new lookup command handler.
    #[must_use]
    pub const fn new(config: &'a FoxConfig) -> Self {
        Self { config }
    }

    /// Resolves and prints the ProjectContext. Absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if writing fails.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &LookupArgs,
    ) -> Result<(), CliError> {
        let reader = ProjectContextReader::from_config(self.config);

        let query = LookupQuery {
            namespace: args.namespace.as_deref(),
            labels: None,
            project_id: args.project_id.as_deref(),
        };

        let report = LookupReport {
            key: query.cache_key().to_string(),
            sources: reader.source_names().into_iter().map(str::to_string).collect(),
            context: reader.lookup(&query).map(|ctx| (*ctx).clone()),
        };
        format.write(out, &report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;

    #[test]
    fn finds_context_in_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".contextcore.yaml");
        std::fs::write(&path, "project:\n  id: checkout\nbusiness:\n  criticality: high\n").unwrap();
        let config = FoxConfig {
            contextcore_yaml_path: path,
            ..FoxConfig::default()
        };

        let mut out = Vec::new();
        LookupCommand::new(&config)
            .execute(
                &mut out,
                &OutputFormat::new(Format::Json),
                &LookupArgs {
                    project_id: Some("checkout".into()),
                    namespace: None,
                },
            )
            .unwrap();

        let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(report["key"], "checkout");
        assert_eq!(report["context"]["criticality"], "high");
        assert_eq!(report["sources"], serde_json::json!(["yaml"]));
    }

    #[test]
    fn missing_context_is_not_an_error() {
        let config = FoxConfig {
            contextcore_yaml_path: "/nonexistent/.contextcore.yaml".into(),
            ..FoxConfig::default()
        };
        let mut out = Vec::new();
        LookupCommand::new(&config)
            .execute(
                &mut out,
                &OutputFormat::default(),
                &LookupArgs {
                    project_id: None,
                    namespace: Some("commerce".into()),
                },
            )
            .unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("No ProjectContext found"));
    }
}
