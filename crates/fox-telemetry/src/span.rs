//! Span identifiers, finished span records and the in-flight span handle.
//!
//! - [`TraceId`] / [`SpanId`]: random non-zero identifiers rendered as W3C hex
//! - [`SpanContext`]: the pair identifying a span within its trace
//! - [`SpanRecord`]: an ended span, as handed to a [`SpanExporter`]
//! - [`ActiveSpan`]: a started span that exports itself when ended or dropped

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Serialize, Serializer};

use crate::exporter::SpanExporter;

/// A 128-bit trace identifier shared by every span of one alert flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraceId(u128);

impl TraceId {
    /// Generates a random, non-zero trace id.
    #[must_use]
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let value: u128 = rng.r#gen();
            if value != 0 {
                return Self(value);
            }
        }
    }

    /// Creates a trace id from a raw value.
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn to_u128(self) -> u128 {
        self.0
    }

    /// Returns the big-endian byte representation.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl Serialize for TraceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A 64-bit span identifier, unique within a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanId(u64);

impl SpanId {
    /// Generates a random, non-zero span id.
    #[must_use]
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let value: u64 = rng.r#gen();
            if value != 0 {
                return Self(value);
            }
        }
    }

    /// Creates a span id from a raw value.
    #[must_use]
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn to_u64(self) -> u64 {
        self.0
    }

    /// Returns the big-endian byte representation.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl Serialize for SpanId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Identifies a span and the trace it belongs to.
///
/// Passing a `SpanContext` as the parent of a new span is how nesting is
/// expressed; there is no implicit "current span".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SpanContext {
    /// The trace this span belongs to.
    pub trace_id: TraceId,
    /// The span's own id.
    pub span_id: SpanId,
}

impl SpanContext {
    /// Creates a context for a new root span in a fresh trace.
    #[must_use]
    pub fn new_root() -> Self {
        Self {
            trace_id: TraceId::random(),
            span_id: SpanId::random(),
        }
    }

    /// Creates a context for a new child span of `self`.
    #[must_use]
    pub fn new_child(&self) -> Self {
        Self {
            trace_id: self.trace_id,
            span_id: SpanId::random(),
        }
    }
}

/// A finished span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanRecord {
    /// The span name, e.g. `fox.context.enrich`.
    pub name: String,
    /// The span's identity.
    pub context: SpanContext,
    /// The parent span id, `None` for a root span.
    pub parent_span_id: Option<SpanId>,
    /// String attributes, ordered by key.
    pub attributes: BTreeMap<String, String>,
    /// When the span started.
    pub start_time: DateTime<Utc>,
    /// When the span ended.
    pub end_time: DateTime<Utc>,
}

impl SpanRecord {
    /// Returns the value of an attribute.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Returns true if this span has no parent.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_span_id.is_none()
    }

    /// Returns true if this span is a direct child of `parent`.
    #[must_use]
    pub fn is_child_of(&self, parent: &SpanContext) -> bool {
        self.context.trace_id == parent.trace_id && self.parent_span_id == Some(parent.span_id)
    }

    /// Returns how long the span lasted.
    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.end_time.signed_duration_since(self.start_time)
    }
}

/// A started span.
///
/// The span is exported exactly once: when [`ActiveSpan::end`] or
/// [`ActiveSpan::end_at`] is called, or when the handle is dropped.
pub struct ActiveSpan {
    name: String,
    context: SpanContext,
    parent_span_id: Option<SpanId>,
    attributes: BTreeMap<String, String>,
    start_time: DateTime<Utc>,
    exporter: Option<Arc<dyn SpanExporter>>,
}

impl ActiveSpan {
    pub(crate) fn start(
        name: impl Into<String>,
        parent: Option<&SpanContext>,
        exporter: Arc<dyn SpanExporter>,
    ) -> Self {
        let (context, parent_span_id) = match parent {
            Some(parent) => (parent.new_child(), Some(parent.span_id)),
            None => (SpanContext::new_root(), None),
        };

        Self {
            name: name.into(),
            context,
            parent_span_id,
            attributes: BTreeMap::new(),
            start_time: Utc::now(),
            exporter: Some(exporter),
        }
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the span's context, used as the parent of nested spans.
    #[must_use]
    pub const fn context(&self) -> SpanContext {
        self.context
    }

    /// Returns the parent span id, if any.
    #[must_use]
    pub const fn parent_span_id(&self) -> Option<SpanId> {
        self.parent_span_id
    }

    /// Returns the value of an attribute.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Overrides the start time. Used to back-date generated spans.
    #[must_use]
    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    /// Ends the span now and hands it to the exporter.
    pub fn end(mut self) {
        self.finish(Utc::now());
    }

    /// Ends the span at the given time and hands it to the exporter.
    pub fn end_at(mut self, end_time: DateTime<Utc>) {
        self.finish(end_time);
    }

    fn finish(&mut self, end_time: DateTime<Utc>) {
        let Some(exporter) = self.exporter.take() else {
            return;
        };

        exporter.export(SpanRecord {
            name: std::mem::take(&mut self.name),
            context: self.context,
            parent_span_id: self.parent_span_id,
            attributes: std::mem::take(&mut self.attributes),
            start_time: self.start_time,
            end_time,
        });
    }
}

impl Drop for ActiveSpan {
    fn drop(&mut self) {
        self.finish(Utc::now());
    }
}

impl fmt::Debug for ActiveSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveSpan")
            .field("name", &self.name)
            .field("context", &self.context)
            .field("parent_span_id", &self.parent_span_id)
            .field("attributes", &self.attributes)
            .field("start_time", &self.start_time)
            .finish_non_exhaustive()
    }
}
