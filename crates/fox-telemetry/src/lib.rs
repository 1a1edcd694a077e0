//! Span model and span builder for the Wayfinder Fox alert pipeline.
//!
//! Every alert Fox handles produces a small trace:
//!
//! ```text
//! fox.alert.received            (root, ended immediately)
//! └── fox.context.enrich        (open while actions are dispatched)
//!     ├── fox.action.claude_analysis
//!     └── fox.action.context_notify
//! ```
//!
//! Nesting is explicit: a span's parent is the [`SpanContext`] passed when it
//! is started. Ended spans are handed to a [`SpanExporter`]; the crate ships an
//! in-memory collector for tests, a debug-log exporter, and an OTLP bridge
//! behind the `otlp` feature.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use fox_telemetry::{CollectingExporter, FoxTracer};
//!
//! let exporter = CollectingExporter::new();
//! let tracer = FoxTracer::new(Arc::new(exporter.clone()));
//!
//! let received = tracer.alert_received("HighErrorRate", "critical", "grafana");
//! let root = received.context();
//! received.end();
//!
//! let enrich = tracer.context_enrich(Some(&root), "HighErrorRate", "checkout", "critical", "commerce-team");
//! tracer.action(Some(&enrich.context()), "context_notify", "HighErrorRate", "checkout").end();
//! enrich.end();
//!
//! assert_eq!(exporter.len(), 3);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod exporter;
#[cfg(feature = "otlp")]
pub mod otlp;
pub mod span;
pub mod tracer;

pub use error::{Result, TelemetryError};
pub use exporter::{CollectingExporter, LogExporter, SpanExporter};
#[cfg(feature = "otlp")]
pub use otlp::OtlpExporter;
pub use span::{ActiveSpan, SpanContext, SpanId, SpanRecord, TraceId};
pub use tracer::{
    FoxTracer, SERVICE_NAME, SPAN_ACTION_PREFIX, SPAN_ALERT_RECEIVED, SPAN_CONTEXT_ENRICH,
    attributes,
};
