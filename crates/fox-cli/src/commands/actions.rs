//! Actions command implementation.

use std::io::Write;
use std::sync::Arc;

use fox_enrich::{ContextCache, FoxEnrichAction, ProjectContextReader, RoutingTable, build_registry};
use fox_telemetry::FoxTracer;

use crate::error::CliError;
use crate::output::{ActionList, OutputFormat};

/// Handler for the actions command.
#[derive(Debug, Default)]
pub struct ActionsCommand;

impl ActionsCommand {
    /// Creates a new actions command handler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Prints the registered actions.
    ///
    /// # Errors
    ///
    /// Returns error if the registry cannot be built or writing fails.
    pub fn execute<W: Write>(&self, out: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let action = FoxEnrichAction::from_parts(
            Arc::new(ProjectContextReader::new(ContextCache::default())),
            FoxTracer::default(),
            RoutingTable::default(),
        );
        let registry = build_registry(action)?;

        format.write(
            out,
            &ActionList {
                actions: registry.list(),
            },
        )
    }
}
