//! Span exporters.
//!
//! This module provides the [`SpanExporter`] trait and the in-process
//! implementations. The OTLP bridge lives in [`crate::otlp`] behind the
//! `otlp` feature.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::span::SpanRecord;

/// Trait for span sinks.
///
/// `export` is called once per ended span and must not block on network I/O;
/// batching exporters queue the record and return.
pub trait SpanExporter: Send + Sync + fmt::Debug {
    /// Returns the name of this exporter.
    fn name(&self) -> &str;

    /// Accepts one finished span.
    fn export(&self, span: SpanRecord);

    /// Flushes pending spans and releases resources.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::Shutdown` if pending spans could not be flushed.
    fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

/// Collects finished spans in memory.
///
/// Clones share the same buffer, so a test can keep one handle and give the
/// other to a tracer.
#[derive(Debug, Clone, Default)]
pub struct CollectingExporter {
    spans: Arc<Mutex<Vec<SpanRecord>>>,
}

impl CollectingExporter {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all collected spans in export order.
    #[must_use]
    pub fn spans(&self) -> Vec<SpanRecord> {
        self.spans.lock().clone()
    }

    /// Returns the first collected span with the given name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<SpanRecord> {
        self.spans.lock().iter().find(|s| s.name == name).cloned()
    }

    /// Returns all collected spans with the given name.
    #[must_use]
    pub fn find_all(&self, name: &str) -> Vec<SpanRecord> {
        self.spans
            .lock()
            .iter()
            .filter(|s| s.name == name)
            .cloned()
            .collect()
    }

    /// Returns the collected span names in export order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.spans.lock().iter().map(|s| s.name.clone()).collect()
    }

    /// Returns the number of collected spans.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.lock().len()
    }

    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.lock().is_empty()
    }

    /// Drops all collected spans.
    pub fn clear(&self) {
        self.spans.lock().clear();
    }
}

impl SpanExporter for CollectingExporter {
    fn name(&self) -> &str {
        "collecting"
    }

    fn export(&self, span: SpanRecord) {
        self.spans.lock().push(span);
    }
}

/// Writes every finished span to the `tracing` log at debug level.
///
/// Used when no collector is configured.
#[derive(Debug, Clone, Default)]
pub struct LogExporter;

impl SpanExporter for LogExporter {
    fn name(&self) -> &str {
        "log"
    }

    fn export(&self, span: SpanRecord) {
        debug!(
            span = %span.name,
            trace_id = %span.context.trace_id,
            span_id = %span.context.span_id,
            parent_span_id = ?span.parent_span_id.map(|id| id.to_string()),
            duration_us = span.duration().num_microseconds().unwrap_or_default(),
            attributes = ?span.attributes,
            "span ended"
        );
    }
}
