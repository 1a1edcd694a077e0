//! Route command implementation.

use std::io::Write;

use fox_enrich::{CriticalityRouter, RoutingTable};
use fox_telemetry::FoxTracer;

use crate::error::CliError;
use crate::output::{OutputFormat, RouteReport};

/// Handler for the route command.
pub struct RouteCommand<'a> {
    table: &'a RoutingTable,
}

impl<'a> RouteCommand<'a> {
    /// Creates a new route command handler.
    #[must_use]
    pub const fn new(table: &'a RoutingTable) -> Self {
        Self { table }
    }

    /// Prints the actions `criticality` routes to. Emits no spans.
    ///
    /// # Errors
    ///
    /// Returns error if writing fails.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        criticality: &str,
    ) -> Result<(), CliError> {
        let router = CriticalityRouter::new(FoxTracer::default(), self.table.clone());
        let report = RouteReport {
            criticality: criticality.to_string(),
            actions: router.route_criticality(criticality),
        };
        format.write(out, &report)
    }
}
