//! The Fox span builder.
//!
//! [`FoxTracer`] emits the three span kinds of an alert flow with a fixed
//! attribute contract:
//!
//! | Span                       | Attributes                                                   |
//! |----------------------------|--------------------------------------------------------------|
//! | `fox.alert.received`       | `alert.name`, `alert.criticality`, `alert.source`            |
//! | `fox.context.enrich`       | `alert.name`, `project.id`, `alert.criticality`, `business.owner` |
//! | `fox.action.<action_name>` | `alert.name`, `project.id`, `action.name`                    |
//!
//! Extra attributes can be added with [`ActiveSpan::set_attribute`].

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::error::Result;
use crate::exporter::{LogExporter, SpanExporter};
use crate::span::{ActiveSpan, SpanContext};

/// Name of the alert intake span.
pub const SPAN_ALERT_RECEIVED: &str = "fox.alert.received";
/// Name of the context enrichment span.
pub const SPAN_CONTEXT_ENRICH: &str = "fox.context.enrich";
/// Prefix of the per-action spans.
pub const SPAN_ACTION_PREFIX: &str = "fox.action.";

/// Attribute keys used by the span contract.
pub mod attributes {
    /// The alert name.
    pub const ALERT_NAME: &str = "alert.name";
    /// The alert criticality.
    pub const ALERT_CRITICALITY: &str = "alert.criticality";
    /// The system the alert came from.
    pub const ALERT_SOURCE: &str = "alert.source";
    /// The resolved project id.
    pub const PROJECT_ID: &str = "project.id";
    /// The owning team.
    pub const BUSINESS_OWNER: &str = "business.owner";
    /// The dispatched action name.
    pub const ACTION_NAME: &str = "action.name";
}

/// Default service name reported by exporters.
pub const SERVICE_NAME: &str = "wayfinder-fox";

/// Builds Fox spans and hands them to a [`SpanExporter`].
///
/// Cloning is cheap; clones share the exporter.
#[derive(Clone)]
pub struct FoxTracer {
    exporter: Arc<dyn SpanExporter>,
}

impl FoxTracer {
    /// Creates a tracer that exports to the given sink.
    #[must_use]
    pub fn new(exporter: Arc<dyn SpanExporter>) -> Self {
        Self { exporter }
    }

    /// Creates a tracer that writes spans to the debug log.
    #[must_use]
    pub fn with_log_exporter() -> Self {
        Self::new(Arc::new(LogExporter))
    }

    /// Returns the name of the configured exporter.
    #[must_use]
    pub fn exporter_name(&self) -> &str {
        self.exporter.name()
    }

    /// Starts a `fox.alert.received` span.
    ///
    /// This is always the root of a new trace.
    pub fn alert_received(&self, alert_name: &str, criticality: &str, source: &str) -> ActiveSpan {
        let mut span = ActiveSpan::start(SPAN_ALERT_RECEIVED, None, Arc::clone(&self.exporter));
        span.set_attribute(attributes::ALERT_NAME, alert_name);
        span.set_attribute(attributes::ALERT_CRITICALITY, criticality);
        span.set_attribute(attributes::ALERT_SOURCE, source);
        span
    }

    /// Starts a `fox.context.enrich` span.
    pub fn context_enrich(
        &self,
        parent: Option<&SpanContext>,
        alert_name: &str,
        project_id: &str,
        criticality: &str,
        business_owner: &str,
    ) -> ActiveSpan {
        let mut span = ActiveSpan::start(SPAN_CONTEXT_ENRICH, parent, Arc::clone(&self.exporter));
        span.set_attribute(attributes::ALERT_NAME, alert_name);
        span.set_attribute(attributes::PROJECT_ID, project_id);
        span.set_attribute(attributes::ALERT_CRITICALITY, criticality);
        span.set_attribute(attributes::BUSINESS_OWNER, business_owner);
        span
    }

    /// Starts a `fox.action.<action_name>` span.
    pub fn action(
        &self,
        parent: Option<&SpanContext>,
        action_name: &str,
        alert_name: &str,
        project_id: &str,
    ) -> ActiveSpan {
        let mut span = ActiveSpan::start(
            format!("{SPAN_ACTION_PREFIX}{action_name}"),
            parent,
            Arc::clone(&self.exporter),
        );
        span.set_attribute(attributes::ALERT_NAME, alert_name);
        span.set_attribute(attributes::PROJECT_ID, project_id);
        span.set_attribute(attributes::ACTION_NAME, action_name);
        span
    }

    /// Flushes and shuts down the exporter.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::Shutdown` if the exporter fails to flush.
    pub fn shutdown(&self) -> Result<()> {
        self.exporter.shutdown().inspect_err(|e| {
            warn!(exporter = %self.exporter.name(), error = %e, "tracer shutdown failed");
        })
    }
}

impl Default for FoxTracer {
    fn default() -> Self {
        Self::with_log_exporter()
    }
}

impl fmt::Debug for FoxTracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FoxTracer")
            .field("exporter", &self.exporter.name())
            .finish()
    }
}
