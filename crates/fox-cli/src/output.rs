//! Output formatting for CLI commands.
//!
//! Supports text (human-readable) and JSON output formats.

use std::io::Write;

use fox_enrich::{ActionInfo, ActionResult, ProjectContext};
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both text and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TextDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Text => {
                value.write_text(writer)?;
            }
        }
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TextDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Text)
    }
}

/// Trait for types that can be displayed as text.
pub trait TextDisplay {
    /// Write the value as human-readable text.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_text<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

impl TextDisplay for ActionResult {
    fn write_text<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Action:    {}", self.action_name)?;
        writeln!(writer, "Status:    {}", self.status)?;
        writeln!(writer, "Message:   {}", self.message)?;
        writeln!(writer, "Duration:  {:.2} ms", self.duration_ms)?;
        if !self.data.is_null() {
            let data = serde_json::to_string_pretty(&self.data)
                .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
            writeln!(writer, "Data:")?;
            writeln!(writer, "{data}")?;
        }
        Ok(())
    }
}

/// Outcome of validating a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// The action the payload was checked against.
    pub action: String,
    /// Whether the payload was accepted.
    pub valid: bool,
    /// Why the payload was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TextDisplay for ValidationReport {
    fn write_text<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        match &self.reason {
            None => writeln!(writer, "✓ Payload is valid for '{}'", self.action)?,
            Some(reason) => writeln!(writer, "✗ Payload rejected by '{}': {reason}", self.action)?,
        }
        Ok(())
    }
}

/// Actions a criticality routes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteReport {
    /// The routed criticality.
    pub criticality: String,
    /// Actions in dispatch order.
    pub actions: Vec<String>,
}

impl TextDisplay for RouteReport {
    fn write_text<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "{} → {}", self.criticality, self.actions.join(", "))?;
        Ok(())
    }
}

/// Result of a ProjectContext lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupReport {
    /// The cache key the lookup used.
    pub key: String,
    /// Sources consulted, in order.
    pub sources: Vec<String>,
    /// The resolved context, if any.
    pub context: Option<ProjectContext>,
}

impl TextDisplay for LookupReport {
    fn write_text<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let Some(ctx) = &self.context else {
            writeln!(
                writer,
                "No ProjectContext found (sources: {})",
                self.sources.join(", ")
            )?;
            return Ok(());
        };

        writeln!(writer, "Project Context")?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Project:        {}", ctx.project_id)?;
        writeln!(writer, "Criticality:    {}", ctx.criticality)?;
        writeln!(writer, "Owner:          {}", or_dash(&ctx.owner))?;
        writeln!(writer, "Channels:       {}", or_dash(&ctx.alert_channels.join(", ")))?;
        writeln!(writer, "Availability:   {}", or_dash(&ctx.availability_slo))?;
        writeln!(writer, "Latency P99:    {}", or_dash(&ctx.latency_p99))?;
        Ok(())
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

/// Registered actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionList {
    /// Actions sorted by name.
    pub actions: Vec<ActionInfo>,
}

impl TextDisplay for ActionList {
    fn write_text<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "{:<16} DESCRIPTION", "NAME")?;
        for action in &self.actions {
            writeln!(writer, "{:<16} {}", action.name, action.description)?;
        }
        Ok(())
    }
}

/// Summary of generated demo traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoReport {
    /// Alert flows generated.
    pub flows: usize,
    /// Spans emitted.
    pub spans: usize,
    /// Exporter the spans went to.
    pub exporter: String,
}

impl TextDisplay for DemoReport {
    fn write_text<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(
            writer,
            "Generated {} alert flows ({} spans) via {} exporter",
            self.flows, self.spans, self.exporter
        )?;
        Ok(())
    }
}
