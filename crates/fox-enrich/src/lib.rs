//! # fox-enrich
//!
//! Alert enrichment for Wayfinder Fox.
//!
//! Inbound alerts are matched to the business context of the project that
//! raised them, then routed to actions by that project's criticality:
//!
//! - [`context`]: cached ProjectContext lookup from Kubernetes custom
//!   resources or a local `.contextcore.yaml`
//! - [`enricher`]: attaches owner, channels, SLOs and criticality to an alert
//! - [`router`]: maps criticality to an ordered list of action names
//! - [`pipeline`]: the `fox_enrich` action that accepts batch or direct
//!   payloads and drives each alert through the steps above
//! - [`action`]: the named-action registry the pipeline plugs into
//!
//! Every alert produces a `fox.alert.received` → `fox.context.enrich` →
//! `fox.action.*` trace through [`fox_telemetry`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use fox_enrich::{ActionContext, ActionRegistry, ContextCache, FoxEnrichAction,
//!     ProjectContextReader, RoutingTable, build_registry};
//! use fox_telemetry::{CollectingExporter, FoxTracer};
//! use serde_json::json;
//!
//! let exporter = CollectingExporter::new();
//! let tracer = FoxTracer::new(Arc::new(exporter.clone()));
//! let reader = ProjectContextReader::new(ContextCache::default());
//! let action = FoxEnrichAction::from_parts(Arc::new(reader), tracer, RoutingTable::default());
//! let registry: ActionRegistry = build_registry(action).unwrap();
//!
//! let result = registry.execute(
//!     "fox_enrich",
//!     &json!({"alert_name": "HighErrorRate", "labels": {"severity": "high"}}),
//!     &ActionContext::new(),
//! );
//!
//! assert!(result.is_success());
//! assert_eq!(result.data["actions_dispatched"], json!(["context_notify"]));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod action;
pub mod actions;
pub mod config;
pub mod context;
pub mod demo;
pub mod enricher;
pub mod error;
pub mod pipeline;
pub mod router;
pub mod types;

pub use action::{Action, ActionContext, ActionInfo, ActionRegistry, ActionResult, ActionStatus};
pub use actions::LogAction;
pub use config::{CacheConfig, DEFAULT_ACTION, FoxConfig, RoutingTable};
pub use context::{
    ContextCache, ContextLookup, ContextSource, KubernetesCapability, KubernetesContextSource,
    LookupQuery, ProjectContextReader, YamlContextSource,
};
pub use demo::generate_demo_data;
pub use enricher::ProjectContextEnricher;
pub use error::{FoxError, Result};
pub use pipeline::{FoxEnrichAction, build_registry};
pub use router::CriticalityRouter;
pub use types::{Alert, AlertStatus, AlertSummary, EnrichedAlert, ProjectContext};
