//! Demo command implementation.

use std::io::Write;

use fox_enrich::{RoutingTable, generate_demo_data};
use fox_telemetry::FoxTracer;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::cli::DemoArgs;
use crate::error::CliError;
use crate::output::{DemoReport, OutputFormat};

/// Handler for the demo command.
pub struct DemoCommand<'a> {
    tracer: &'a FoxTracer,
    table: &'a RoutingTable,
}

impl<'a> DemoCommand<'a> {
    /// Creates a new demo command handler.
    #[must_use]
    pub const fn new(tracer: &'a FoxTracer, table: &'a RoutingTable) -> Self {
        Self { tracer, table }
    }

    /// Emits demo flows through the tracer.
    ///
    /// # Errors
    ///
    /// Returns error if writing fails.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &DemoArgs,
    ) -> Result<(), CliError> {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let spans = generate_demo_data(self.tracer, self.table, args.count, args.hours_back, &mut rng);

        format.write(
            out,
            &DemoReport {
                flows: args.count,
                spans,
                exporter: self.tracer.exporter_name().to_string(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fox_telemetry::CollectingExporter;
    use std::sync::Arc;

    #[test]
    fn reports_emitted_spans() {
        let exporter = CollectingExporter::new();
        let tracer = FoxTracer::new(Arc::new(exporter.clone()));
        let table = RoutingTable::default();
        let mut out = Vec::new();

        DemoCommand::new(&tracer, &table)
            .execute(
                &mut out,
                &OutputFormat::default(),
                &DemoArgs {
                    count: 3,
                    hours_back: 1,
                    seed: Some(1),
                },
            )
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Generated 3 alert flows"));
        assert!(text.contains(&format!("({} spans)", exporter.len())));
    }
}
