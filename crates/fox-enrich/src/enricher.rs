//! Attaches ProjectContext business metadata to alerts.

use std::sync::Arc;

use fox_telemetry::{ActiveSpan, FoxTracer, SpanContext};
use tracing::debug;

use crate::context::{ContextLookup, LookupQuery};
use crate::types::{Alert, EnrichedAlert};

/// Label holding the project id.
pub const LABEL_PROJECT_ID: &str = "project_id";
/// Synonym of [`LABEL_PROJECT_ID`].
pub const LABEL_PROJECT: &str = "project";
/// Label holding the workload namespace.
pub const LABEL_NAMESPACE: &str = "namespace";

/// Enriches alerts with their project's business context.
#[derive(Clone)]
pub struct ProjectContextEnricher {
    lookup: Arc<dyn ContextLookup>,
    tracer: FoxTracer,
}

impl ProjectContextEnricher {
    /// Creates an enricher.
    #[must_use]
    pub fn new(lookup: Arc<dyn ContextLookup>, tracer: FoxTracer) -> Self {
        Self { lookup, tracer }
    }

    /// Enriches one alert.
    ///
    /// Always returns a `fox.context.enrich` span, left open so the caller
    /// can nest action spans under it before ending it.
    pub fn enrich(&self, alert: &Alert, parent: Option<&SpanContext>) -> (EnrichedAlert, ActiveSpan) {
        let project_id = alert
            .label(LABEL_PROJECT_ID)
            .or_else(|| alert.label(LABEL_PROJECT))
            .filter(|id| !id.is_empty());
        let namespace = alert.label(LABEL_NAMESPACE).filter(|ns| !ns.is_empty());

        let query = LookupQuery {
            namespace,
            labels: Some(&alert.labels),
            project_id,
        };

        let enriched = match self.lookup.lookup(&query) {
            Some(context) => EnrichedAlert::from_context(alert.clone(), &context),
            None => {
                debug!(
                    alert = %alert.name,
                    project_id = ?project_id,
                    namespace = ?namespace,
                    "no project context, using label fallback"
                );
                EnrichedAlert::unenriched(alert.clone(), project_id.unwrap_or_default())
            }
        };

        let span = self.tracer.context_enrich(
            parent,
            &alert.name,
            &enriched.project_id,
            &enriched.criticality,
            &enriched.business_owner,
        );

        (enriched, span)
    }
}

impl std::fmt::Debug for ProjectContextEnricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectContextEnricher")
            .field("exporter", &self.tracer.exporter_name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProjectContext;
    use fox_telemetry::{CollectingExporter, SPAN_CONTEXT_ENRICH, attributes};
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Serves contexts by cache key and records the queries it saw.
    #[derive(Default)]
    struct StaticLookup {
        contexts: HashMap<String, Arc<ProjectContext>>,
        seen: Mutex<Vec<(Option<String>, Option<String>)>>,
    }

    impl StaticLookup {
        fn with(mut self, key: &str, context: ProjectContext) -> Self {
            self.contexts.insert(key.to_string(), Arc::new(context));
            self
        }
    }

    impl ContextLookup for StaticLookup {
        fn lookup(&self, query: &LookupQuery<'_>) -> Option<Arc<ProjectContext>> {
            self.seen.lock().push((
                query.namespace.map(str::to_string),
                query.project_id.map(str::to_string),
            ));
            self.contexts.get(query.cache_key()).cloned()
        }
    }

    fn checkout() -> ProjectContext {
        ProjectContext::new("checkout-service")
            .with_criticality("critical")
            .with_owner("commerce-team")
            .with_alert_channel("commerce-oncall")
            .with_slos("99.95", "200ms")
    }

    fn enricher(lookup: StaticLookup) -> (ProjectContextEnricher, Arc<StaticLookup>, CollectingExporter) {
        let exporter = CollectingExporter::new();
        let lookup = Arc::new(lookup);
        let enricher = ProjectContextEnricher::new(
            Arc::clone(&lookup) as Arc<dyn ContextLookup>,
            FoxTracer::new(Arc::new(exporter.clone())),
        );
        (enricher, lookup, exporter)
    }

    #[test]
    fn found_context_is_copied() {
        let (enricher, _, _) = enricher(StaticLookup::default().with("checkout-service", checkout()));
        let alert = Alert::new("HighErrorRate").with_label("project_id", "checkout-service");

        let (enriched, span) = enricher.enrich(&alert, None);
        span.end();

        assert!(enriched.enriched);
        assert_eq!(enriched.criticality, "critical");
        assert_eq!(enriched.business_owner, "commerce-team");
        assert_eq!(enriched.alert_channels, vec!["commerce-oncall"]);
    }

    #[test]
    fn project_label_is_a_synonym() {
        let (enricher, lookup, _) = enricher(StaticLookup::default().with("checkout-service", checkout()));
        let alert = Alert::new("A").with_label("project", "checkout-service");

        let (enriched, _span) = enricher.enrich(&alert, None);
        assert!(enriched.enriched);
        assert_eq!(lookup.seen.lock()[0].1.as_deref(), Some("checkout-service"));
    }

    #[test]
    fn namespace_is_passed_to_lookup() {
        let (enricher, lookup, _) = enricher(StaticLookup::default().with("commerce", checkout()));
        let alert = Alert::new("A").with_label("namespace", "commerce");

        let (enriched, _span) = enricher.enrich(&alert, None);
        assert!(enriched.enriched);
        assert_eq!(lookup.seen.lock()[0], (Some("commerce".to_string()), None));
    }

    #[test]
    fn missing_context_uses_severity() {
        let (enricher, _, _) = enricher(StaticLookup::default());
        let alert = Alert::new("A")
            .with_label("project_id", "unknown-svc")
            .with_label("severity", "high");

        let (enriched, _span) = enricher.enrich(&alert, None);
        assert!(!enriched.enriched);
        assert_eq!(enriched.project_id, "unknown-svc");
        assert_eq!(enriched.criticality, "high");
        assert!(enriched.alert_channels.is_empty());
    }

    #[test]
    fn missing_context_and_severity_is_medium() {
        let (enricher, _, _) = enricher(StaticLookup::default());
        let (enriched, _span) = enricher.enrich(&Alert::new("A"), None);
        assert_eq!(enriched.criticality, "medium");
        assert!(enriched.project_id.is_empty());
    }

    #[test]
    fn span_is_open_until_caller_ends_it() {
        let (enricher, _, exporter) = enricher(StaticLookup::default().with("checkout-service", checkout()));
        let root = SpanContext::new_root();
        let alert = Alert::new("HighErrorRate").with_label("project_id", "checkout-service");

        let (_, span) = enricher.enrich(&alert, Some(&root));
        assert!(exporter.is_empty());
        span.end();

        let record = exporter.find(SPAN_CONTEXT_ENRICH).unwrap();
        assert!(record.is_child_of(&root));
        assert_eq!(record.attribute(attributes::PROJECT_ID), Some("checkout-service"));
        assert_eq!(record.attribute(attributes::ALERT_CRITICALITY), Some("critical"));
        assert_eq!(record.attribute(attributes::BUSINESS_OWNER), Some("commerce-team"));
    }

    #[test]
    fn span_is_produced_without_context() {
        let (enricher, _, exporter) = enricher(StaticLookup::default());
        let (_, span) = enricher.enrich(&Alert::new("A"), None);
        span.end();
        assert_eq!(exporter.names(), vec![SPAN_CONTEXT_ENRICH]);
    }
}
