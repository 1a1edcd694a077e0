//! The `fox_enrich` action: the pipeline entry point.
//!
//! Accepts either an Alertmanager-style batch (`{"alerts": [...]}`) or a
//! single direct-trigger alert (`{"alert_name": ...}`) and drives each alert
//! through received → enrich → route → dispatch, emitting this span tree:
//!
//! ```text
//! fox.alert.received
//! └── fox.context.enrich
//!     └── fox.action.<name>   (one per routed action)
//! ```

use std::sync::Arc;

use fox_telemetry::FoxTracer;
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::action::{Action, ActionContext, ActionRegistry, ActionResult};
use crate::actions::LogAction;
use crate::config::{FoxConfig, RoutingTable};
use crate::context::{ContextLookup, ProjectContextReader};
use crate::enricher::ProjectContextEnricher;
use crate::error::{FoxError, Result};
use crate::router::CriticalityRouter;
use crate::types::{Alert, AlertSummary, DEFAULT_CRITICALITY, non_empty_str};

/// Rejection message for an empty or non-object payload.
pub const EMPTY_PAYLOAD: &str = "Empty payload";
/// Rejection message for a batch without alerts.
pub const EMPTY_ALERTS: &str = "Alertmanager payload must have non-empty 'alerts' array";
/// Rejection message for a direct payload without an alert name.
pub const MISSING_ALERT_NAME: &str = "Payload must have 'alert_name' or 'alertname'";

/// Enriches alerts with ProjectContext metadata and routes them by
/// criticality.
#[derive(Debug, Clone)]
pub struct FoxEnrichAction {
    tracer: FoxTracer,
    enricher: ProjectContextEnricher,
    router: CriticalityRouter,
}

impl FoxEnrichAction {
    /// Registry name of the action.
    pub const NAME: &'static str = "fox_enrich";

    /// Builds the action from configuration.
    ///
    /// Checks Kubernetes availability once if `use_kubernetes` is set.
    #[must_use]
    pub fn new(config: &FoxConfig, tracer: FoxTracer) -> Self {
        let reader = ProjectContextReader::from_config(config);
        Self::from_parts(Arc::new(reader), tracer, config.routing_table.clone())
    }

    /// Builds the action from an explicit lookup and routing table.
    #[must_use]
    pub fn from_parts(lookup: Arc<dyn ContextLookup>, tracer: FoxTracer, table: RoutingTable) -> Self {
        Self {
            enricher: ProjectContextEnricher::new(lookup, tracer.clone()),
            router: CriticalityRouter::new(tracer.clone(), table),
            tracer,
        }
    }

    /// Returns the router.
    #[must_use]
    pub const fn router(&self) -> &CriticalityRouter {
        &self.router
    }

    /// Returns the enricher.
    #[must_use]
    pub const fn enricher(&self) -> &ProjectContextEnricher {
        &self.enricher
    }

    /// Processes one alert record.
    ///
    /// # Errors
    ///
    /// Returns `FoxError::InvalidAlert` if the record cannot be parsed. No
    /// spans are emitted in that case.
    pub fn process_alert(&self, record: &Value, context: &ActionContext) -> Result<AlertSummary> {
        let alert = Alert::from_record(record, context.source.as_deref())?;

        let received = self.tracer.alert_received(
            &alert.name,
            alert.label("severity").unwrap_or(DEFAULT_CRITICALITY),
            &alert.source,
        );
        let root = received.context();
        received.end();

        let (enriched, enrich_span) = self.enricher.enrich(&alert, Some(&root));
        let actions = self.router.dispatch(&enriched, &enrich_span.context());
        enrich_span.end();

        Ok(AlertSummary {
            alert_name: enriched.alert.name,
            project_id: enriched.project_id,
            criticality: enriched.criticality,
            enriched: enriched.enriched,
            actions_dispatched: actions,
        })
    }

    fn execute_batch(&self, alerts: &[Value], context: &ActionContext) -> ActionResult {
        let mut results = Vec::with_capacity(alerts.len());
        let mut failures = 0usize;

        for (index, record) in alerts.iter().enumerate() {
            let outcome = self
                .process_alert(record, context)
                .and_then(|summary| Ok(serde_json::to_value(summary)?));

            match outcome {
                Ok(summary) => results.push(summary),
                Err(e) => {
                    failures += 1;
                    warn!(index, error = %e, "alert in batch failed");

                    let mut entry = Map::new();
                    entry.insert("index".to_string(), json!(index));
                    if let Some(name) = record_alert_name(record) {
                        entry.insert("alert_name".to_string(), json!(name));
                    }
                    entry.insert("error".to_string(), json!(e.to_string()));
                    results.push(Value::Object(entry));
                }
            }
        }

        info!(alerts = alerts.len(), failures, "processed alert batch");

        let message = format!("Processed {} alerts ({failures} failed)", alerts.len());
        let result = if failures > 0 {
            ActionResult::failed(Self::NAME, message)
        } else {
            ActionResult::success(Self::NAME, message)
        };

        result.with_data(json!({
            "alerts_processed": alerts.len(),
            "failures": failures,
            "results": results,
        }))
    }

    fn execute_direct(&self, payload: &Value, context: &ActionContext) -> ActionResult {
        let outcome = self
            .process_alert(payload, context)
            .and_then(|summary| Ok((summary.alert_name.clone(), serde_json::to_value(summary)?)));

        match outcome {
            Ok((name, data)) => {
                ActionResult::success(Self::NAME, format!("Processed alert {name}")).with_data(data)
            }
            Err(e) => {
                warn!(error = %e, "direct alert failed");
                ActionResult::failed(Self::NAME, e.to_string())
            }
        }
    }
}

/// How a payload is to be processed.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PayloadShape<'a> {
    /// An Alertmanager batch.
    Batch(&'a [Value]),
    /// A single alert. A missing or null `alerts` key means direct.
    Direct,
}

impl<'a> PayloadShape<'a> {
    fn of(payload: &'a Value) -> Result<Self> {
        match payload.get("alerts") {
            None | Some(Value::Null) => Ok(Self::Direct),
            Some(Value::Array(alerts)) if !alerts.is_empty() => Ok(Self::Batch(alerts)),
            Some(_) => Err(FoxError::InvalidPayload {
                reason: EMPTY_ALERTS.to_string(),
            }),
        }
    }
}

/// Best-effort alert name of a raw record, for error entries.
fn record_alert_name(record: &Value) -> Option<String> {
    let fields = record.as_object()?;
    fields
        .get("labels")
        .and_then(Value::as_object)
        .and_then(|labels| non_empty_str(labels, "alertname"))
        .or_else(|| non_empty_str(fields, "alert_name"))
        .or_else(|| non_empty_str(fields, "alertname"))
}

impl Action for FoxEnrichAction {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Enrich alerts with ProjectContext business metadata and route by criticality"
    }

    fn validate(&self, payload: &Value) -> Option<String> {
        let fields = match payload.as_object() {
            Some(fields) if !fields.is_empty() => fields,
            _ => return Some(EMPTY_PAYLOAD.to_string()),
        };

        match PayloadShape::of(payload) {
            Ok(PayloadShape::Batch(_)) => return None,
            Ok(PayloadShape::Direct) => {}
            Err(FoxError::InvalidPayload { reason }) => return Some(reason),
            Err(e) => return Some(e.to_string()),
        }

        if non_empty_str(fields, "alert_name").is_none() && non_empty_str(fields, "alertname").is_none() {
            return Some(MISSING_ALERT_NAME.to_string());
        }

        None
    }

    fn execute(&self, payload: &Value, context: &ActionContext) -> ActionResult {
        match PayloadShape::of(payload) {
            Ok(PayloadShape::Batch(alerts)) => self.execute_batch(alerts, context),
            Ok(PayloadShape::Direct) => self.execute_direct(payload, context),
            Err(e) => {
                warn!(error = %e, "payload rejected");
                ActionResult::failed(Self::NAME, e.to_string())
            }
        }
    }
}

/// Builds a registry holding `fox_enrich` and the built-in `log` action.
///
/// # Errors
///
/// Returns `FoxError::DuplicateAction` only if the built-in names collide.
pub fn build_registry(action: FoxEnrichAction) -> Result<ActionRegistry> {
    let registry = ActionRegistry::new();
    registry.register(Arc::new(action))?;
    registry.register(Arc::new(LogAction))?;
    Ok(registry)
}
