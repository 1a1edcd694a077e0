//! Criticality-based action routing.

use fox_telemetry::{FoxTracer, SpanContext};
use tracing::info;

use crate::config::{DEFAULT_ACTION, RoutingTable};
use crate::types::EnrichedAlert;

/// Routes enriched alerts to actions by criticality.
#[derive(Debug, Clone)]
pub struct CriticalityRouter {
    tracer: FoxTracer,
    table: RoutingTable,
}

impl CriticalityRouter {
    /// Creates a router over the given table.
    #[must_use]
    pub fn new(tracer: FoxTracer, table: RoutingTable) -> Self {
        Self { tracer, table }
    }

    /// Returns the routing table.
    #[must_use]
    pub const fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// Returns the actions for a criticality, `["log"]` if it is not routed.
    #[must_use]
    pub fn route_criticality(&self, criticality: &str) -> Vec<String> {
        self.table
            .get(criticality)
            .map_or_else(|| vec![DEFAULT_ACTION.to_string()], <[String]>::to_vec)
    }

    /// Returns the actions for an enriched alert, in table order.
    #[must_use]
    pub fn route(&self, enriched: &EnrichedAlert) -> Vec<String> {
        self.route_criticality(&enriched.criticality)
    }

    /// Routes the alert and emits one ended `fox.action.<name>` span per
    /// action, each a child of `parent`.
    pub fn dispatch(&self, enriched: &EnrichedAlert, parent: &SpanContext) -> Vec<String> {
        let actions = self.route(enriched);

        for action in &actions {
            self.tracer
                .action(Some(parent), action, &enriched.alert.name, &enriched.project_id)
                .end();
        }

        info!(
            alert = %enriched.alert.name,
            project_id = %enriched.project_id,
            criticality = %enriched.criticality,
            actions = ?actions,
            "dispatched alert"
        );

        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Alert, ProjectContext};
    use fox_telemetry::{CollectingExporter, SPAN_ACTION_PREFIX, attributes};
    use proptest::prelude::*;
    use std::sync::Arc;
    use test_case::test_case;

    fn router() -> (CriticalityRouter, CollectingExporter) {
        let exporter = CollectingExporter::new();
        let router = CriticalityRouter::new(
            FoxTracer::new(Arc::new(exporter.clone())),
            RoutingTable::default(),
        );
        (router, exporter)
    }

    fn enriched(criticality: &str) -> EnrichedAlert {
        EnrichedAlert::from_context(
            Alert::new("HighErrorRate"),
            &ProjectContext::new("checkout-service").with_criticality(criticality),
        )
    }

    mod route_tests {
        use super::*;
        use test_case::test_case;

        #[test_case("critical", &["claude_analysis", "context_notify"] ; "critical")]
        #[test_case("high", &["context_notify"] ; "high")]
        #[test_case("medium", &["log"] ; "medium")]
        #[test_case("low", &["log"] ; "low")]
        #[test_case("CRITICAL", &["claude_analysis", "context_notify"] ; "uppercase")]
        #[test_case("High", &["context_notify"] ; "mixed case")]
        #[test_case("warning", &["log"] ; "unknown")]
        #[test_case("", &["log"] ; "empty")]
        fn default_table(criticality: &str, expected: &[&str]) {
            let (router, _) = router();
            assert_eq!(router.route(&enriched(criticality)), expected);
        }

        #[test]
        fn custom_table_is_used() {
            let table = RoutingTable::empty().with_route("critical", ["page", "ticket"]);
            let router = CriticalityRouter::new(FoxTracer::default(), table);
            assert_eq!(router.route(&enriched("critical")), vec!["page", "ticket"]);
            assert_eq!(router.route(&enriched("high")), vec!["log"]);
        }

        #[test]
        fn route_emits_no_spans() {
            let (router, exporter) = router();
            let _ = router.route(&enriched("critical"));
            assert!(exporter.is_empty());
        }
    }

    mod dispatch_tests {
        use super::*;

        #[test]
        fn one_span_per_action_in_order() {
            let (router, exporter) = router();
            let parent = SpanContext::new_root();

            let actions = router.dispatch(&enriched("critical"), &parent);

            assert_eq!(actions, vec!["claude_analysis", "context_notify"]);
            assert_eq!(
                exporter.names(),
                vec!["fox.action.claude_analysis", "fox.action.context_notify"]
            );
            for span in exporter.spans() {
                assert!(span.is_child_of(&parent));
                assert_eq!(span.attribute(attributes::ALERT_NAME), Some("HighErrorRate"));
                assert_eq!(span.attribute(attributes::PROJECT_ID), Some("checkout-service"));
                assert!(span.name.starts_with(SPAN_ACTION_PREFIX));
            }
        }

        #[test]
        fn action_name_attribute_matches_span() {
            let (router, exporter) = router();
            router.dispatch(&enriched("high"), &SpanContext::new_root());
            let span = exporter.find("fox.action.context_notify").unwrap();
            assert_eq!(span.attribute(attributes::ACTION_NAME), Some("context_notify"));
        }

        #[test]
        fn empty_route_emits_nothing() {
            let table = RoutingTable::empty().with_route("low", Vec::<String>::new());
            let exporter = CollectingExporter::new();
            let router = CriticalityRouter::new(FoxTracer::new(Arc::new(exporter.clone())), table);

            assert!(router.dispatch(&enriched("low"), &SpanContext::new_root()).is_empty());
            assert!(exporter.is_empty());
        }
    }

    proptest! {
        #[test]
        fn prop_route_is_deterministic(criticality in "[a-zA-Z]{0,12}") {
            let (router, _) = router();
            let alert = enriched(&criticality);
            prop_assert_eq!(router.route(&alert), router.route(&alert));
        }

        #[test]
        fn prop_route_ignores_case(criticality in "[a-zA-Z]{1,12}") {
            let (router, _) = router();
            prop_assert_eq!(
                router.route(&enriched(&criticality.to_uppercase())),
                router.route(&enriched(&criticality.to_lowercase()))
            );
        }

        #[test]
        fn prop_dispatch_matches_route(criticality in prop::sample::select(vec!["critical", "high", "medium", "low", "other"])) {
            let (router, exporter) = router();
            let alert = enriched(criticality);
            let routed = router.route(&alert);
            let dispatched = router.dispatch(&alert, &SpanContext::new_root());
            prop_assert_eq!(&routed, &dispatched);
            prop_assert_eq!(exporter.len(), routed.len());
        }
    }
}
