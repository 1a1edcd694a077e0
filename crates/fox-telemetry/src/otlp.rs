//! OTLP export through the OpenTelemetry SDK.
//!
//! Each finished [`SpanRecord`] is replayed into an SDK tracer with its
//! original ids, parent and timestamps, so the trace tree seen by the
//! collector matches the one built by [`crate::FoxTracer`]. The SDK batch
//! span processor performs the actual network export on the Tokio runtime.
//!
//! The exporter must be built from within a Tokio runtime context.

use std::fmt;
use std::time::SystemTime;

use opentelemetry::trace::{
    Span as _, SpanBuilder, SpanContext as OtelSpanContext, SpanId as OtelSpanId,
    TraceContextExt, TraceFlags, TraceId as OtelTraceId, TraceState, Tracer as _,
    TracerProvider as _,
};
use opentelemetry::{Context, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::{Tracer, TracerProvider};
use opentelemetry_sdk::{Resource, runtime};
use tracing::info;

use crate::error::{Result, TelemetryError};
use crate::exporter::SpanExporter;
use crate::span::SpanRecord;

/// Exports Fox spans to an OTLP/gRPC collector.
pub struct OtlpExporter {
    endpoint: String,
    provider: TracerProvider,
    tracer: Tracer,
}

impl OtlpExporter {
    /// Creates an exporter for the given collector endpoint.
    ///
    /// Endpoints without a scheme (`localhost:4317`) are treated as plain
    /// `http://`.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::Setup` if the OTLP exporter cannot be built.
    pub fn new(endpoint: &str, service_name: &str) -> Result<Self> {
        let endpoint = normalize_endpoint(endpoint);

        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint.clone())
            .build()
            .map_err(|e| TelemetryError::Setup {
                reason: format!("failed to build OTLP span exporter: {e}"),
            })?;

        let provider = TracerProvider::builder()
            .with_batch_exporter(exporter, runtime::Tokio)
            .with_resource(Resource::new(vec![
                KeyValue::new("service.name", service_name.to_string()),
                KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            ]))
            .build();
        let tracer = provider.tracer(crate::tracer::SERVICE_NAME);

        info!(endpoint = %endpoint, service = %service_name, "OTLP span export enabled");

        Ok(Self {
            endpoint,
            provider,
            tracer,
        })
    }

    /// Returns the normalized collector endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SpanExporter for OtlpExporter {
    fn name(&self) -> &str {
        "otlp"
    }

    fn export(&self, span: SpanRecord) {
        let trace_id = OtelTraceId::from_bytes(span.context.trace_id.to_bytes());

        let parent_cx = match span.parent_span_id {
            Some(parent) => Context::new().with_remote_span_context(OtelSpanContext::new(
                trace_id,
                OtelSpanId::from_bytes(parent.to_bytes()),
                TraceFlags::SAMPLED,
                true,
                TraceState::default(),
            )),
            None => Context::new(),
        };

        let attributes: Vec<KeyValue> = span
            .attributes
            .into_iter()
            .map(|(k, v)| KeyValue::new(k, v))
            .collect();

        let builder = SpanBuilder::from_name(span.name)
            .with_trace_id(trace_id)
            .with_span_id(OtelSpanId::from_bytes(span.context.span_id.to_bytes()))
            .with_start_time(SystemTime::from(span.start_time))
            .with_attributes(attributes);

        let mut otel_span = self.tracer.build_with_context(builder, &parent_cx);
        otel_span.end_with_timestamp(SystemTime::from(span.end_time));
    }

    fn shutdown(&self) -> Result<()> {
        self.provider
            .shutdown()
            .map_err(|e| TelemetryError::Shutdown {
                reason: e.to_string(),
            })
    }
}

impl fmt::Debug for OtlpExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtlpExporter")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Adds an `http://` scheme to bare `host:port` endpoints.
#[must_use]
pub fn normalize_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim();
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("http://{endpoint}")
    }
}
