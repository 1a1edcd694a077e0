//! Historical demo traffic for dashboards.
//!
//! Generates complete alert flows with back-dated timestamps so a fresh
//! collector has something to show. Each flow has the same shape as live
//! traffic: a received root, an enrich child and one action span per routed
//! action under it.

use chrono::{Duration, Utc};
use fox_telemetry::FoxTracer;
use rand::Rng;
use tracing::info;

use crate::config::{DEFAULT_ACTION, RoutingTable};

/// A canned alert used to build demo flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoScenario {
    /// Alert name.
    pub alert_name: &'static str,
    /// Project id.
    pub project_id: &'static str,
    /// Criticality of the project.
    pub criticality: &'static str,
    /// Owning team.
    pub owner: &'static str,
    /// Alert source.
    pub source: &'static str,
}

/// The scenarios demo flows are drawn from.
pub const SCENARIOS: &[DemoScenario] = &[
    DemoScenario {
        alert_name: "HighErrorRate",
        project_id: "checkout-service",
        criticality: "critical",
        owner: "commerce-team",
        source: "grafana",
    },
    DemoScenario {
        alert_name: "PaymentLatencyHigh",
        project_id: "payment-gateway",
        criticality: "critical",
        owner: "payments-team",
        source: "alertmanager",
    },
    DemoScenario {
        alert_name: "KubePodCrashLooping",
        project_id: "inventory-api",
        criticality: "high",
        owner: "supply-team",
        source: "alertmanager",
    },
    DemoScenario {
        alert_name: "DiskSpaceLow",
        project_id: "search-indexer",
        criticality: "medium",
        owner: "search-team",
        source: "alertmanager",
    },
    DemoScenario {
        alert_name: "CertificateExpiringSoon",
        project_id: "docs-site",
        criticality: "low",
        owner: "platform-team",
        source: "grafana",
    },
];

/// Emits `count` alert flows spread over the last `hours_back` hours.
///
/// Returns the number of spans emitted.
pub fn generate_demo_data<R: Rng + ?Sized>(
    tracer: &FoxTracer,
    table: &RoutingTable,
    count: usize,
    hours_back: u32,
    rng: &mut R,
) -> usize {
    let window_ms = i64::from(hours_back.max(1)) * 3_600_000;
    let now = Utc::now();
    let mut spans = 0;

    for _ in 0..count {
        let scenario = SCENARIOS[rng.gen_range(0..SCENARIOS.len())];
        let start = now - Duration::milliseconds(rng.gen_range(0..window_ms));

        let received = tracer
            .alert_received(scenario.alert_name, scenario.criticality, scenario.source)
            .with_start_time(start);
        let root = received.context();
        let enrich_start = start + Duration::milliseconds(rng.gen_range(1..5));
        received.end_at(enrich_start);
        spans += 1;

        let enrich = tracer
            .context_enrich(
                Some(&root),
                scenario.alert_name,
                scenario.project_id,
                scenario.criticality,
                scenario.owner,
            )
            .with_start_time(enrich_start);
        let parent = enrich.context();
        spans += 1;

        let actions: Vec<String> = table
            .get(scenario.criticality)
            .map_or_else(|| vec![DEFAULT_ACTION.to_string()], <[String]>::to_vec);

        let mut cursor = enrich_start + Duration::milliseconds(rng.gen_range(5..50));
        for action in &actions {
            let end = cursor + Duration::milliseconds(rng.gen_range(10..500));
            tracer
                .action(Some(&parent), action, scenario.alert_name, scenario.project_id)
                .with_start_time(cursor)
                .end_at(end);
            cursor = end;
            spans += 1;
        }

        enrich.end_at(cursor + Duration::milliseconds(1));
    }

    info!(flows = count, spans, hours_back, "generated demo data");
    spans
}
