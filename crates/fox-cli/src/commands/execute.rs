//! Execute and validate command implementation.

use std::io::Write;

use fox_enrich::{Action, ActionContext, ActionStatus, FoxConfig, FoxEnrichAction, build_registry};
use fox_telemetry::FoxTracer;
use tracing::info;

use super::read_payload;
use crate::cli::PayloadArgs;
use crate::error::CliError;
use crate::output::{OutputFormat, ValidationReport};

/// Handler for the execute and validate commands.
pub struct ExecuteCommand<'a> {
    config: &'a FoxConfig,
    tracer: &'a FoxTracer,
}

impl<'a> ExecuteCommand<'a> {
    /// Creates a new execute command handler.
    #[must_use]
    pub const fn new(config: &'a FoxConfig, tracer: &'a FoxTracer) -> Self {
        Self { config, tracer }
    }

    /// Runs the payload through the named action and prints the result.
    ///
    /// # Errors
    ///
    /// Returns `CliError::ActionFailed` if the action reports failure, after
    /// the result has been written.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &PayloadArgs,
    ) -> Result<(), CliError> {
        let payload = read_payload(args.file.as_deref())?;
        let registry = build_registry(FoxEnrichAction::new(self.config, self.tracer.clone()))?;

        let mut context = ActionContext::new();
        if let Some(source) = &args.source {
            context = context.with_source(source);
        }

        let result = registry.execute(&args.action, &payload, &context);
        info!(action = %args.action, status = %result.status, "executed payload");
        format.write(out, &result)?;

        if result.status == ActionStatus::Failed {
            return Err(CliError::ActionFailed(result.message));
        }
        Ok(())
    }

    /// Validates the payload against the named action without running it.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Invalid` if the payload is rejected, after the
    /// report has been written.
    pub fn validate<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &PayloadArgs,
    ) -> Result<(), CliError> {
        let payload = read_payload(args.file.as_deref())?;
        let registry = build_registry(FoxEnrichAction::new(self.config, self.tracer.clone()))?;

        let action = registry
            .get(&args.action)
            .ok_or_else(|| CliError::Input(format!("Action not found: {}", args.action)))?;
        let reason = action.validate(&payload);

        let report = ValidationReport {
            action: args.action.clone(),
            valid: reason.is_none(),
            reason: reason.clone(),
        };
        format.write(out, &report)?;

        match reason {
            Some(reason) => Err(CliError::Invalid(reason)),
            None => Ok(()),
        }
    }
}
