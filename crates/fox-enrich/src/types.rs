//! Core types for the enrichment pipeline.
//!
//! - [`AlertStatus`]: the lifecycle state reported by the alert source
//! - [`Alert`]: an inbound alert, immutable once parsed
//! - [`ProjectContext`]: stored business metadata for a project
//! - [`EnrichedAlert`]: an alert plus its resolved business context

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FoxError, Result};

/// Default criticality when neither a context nor a `severity` label exists.
pub const DEFAULT_CRITICALITY: &str = "medium";

/// Default alert source when the payload and context do not name one.
pub const DEFAULT_SOURCE: &str = "alertmanager";

/// Name used when the payload carries no alert name.
pub const UNKNOWN_ALERT_NAME: &str = "unknown";

/// The status of an inbound alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// The alert is actively firing.
    #[default]
    Firing,
    /// The alert has been resolved.
    Resolved,
    /// The alert condition is true but has not fired yet.
    Pending,
}

impl AlertStatus {
    /// Returns the status as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Firing => "firing",
            Self::Resolved => "resolved",
            Self::Pending => "pending",
        }
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AlertStatus {
    type Err = FoxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firing" => Ok(Self::Firing),
            "resolved" => Ok(Self::Resolved),
            "pending" => Ok(Self::Pending),
            other => Err(FoxError::InvalidAlert {
                reason: format!("unknown alert status '{other}'"),
            }),
        }
    }
}

/// An inbound alert from Alertmanager, Grafana or a manual trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// The alert name.
    pub name: String,
    /// Labels attached to the alert.
    pub labels: HashMap<String, String>,
    /// Annotations attached to the alert.
    pub annotations: HashMap<String, String>,
    /// The alert status.
    pub status: AlertStatus,
    /// The originating system.
    pub source: String,
}

impl Alert {
    /// Creates a firing alert from Alertmanager with no labels.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: HashMap::new(),
            annotations: HashMap::new(),
            status: AlertStatus::Firing,
            source: DEFAULT_SOURCE.to_string(),
        }
    }

    /// Adds a label.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Adds an annotation.
    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: AlertStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Returns a label value.
    #[must_use]
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Parses one alert record from an inbound payload.
    ///
    /// The name is taken from `labels.alertname`, then `alert_name`, then
    /// `alertname`, falling back to `"unknown"`. The source is
    /// `context_source`, then the record's `source`, then `"alertmanager"`.
    /// Scalar label and annotation values are stringified.
    ///
    /// # Errors
    ///
    /// Returns `FoxError::InvalidAlert` if the record is not an object, if
    /// labels or annotations are not flat objects, or if the status is unknown.
    pub fn from_record(record: &Value, context_source: Option<&str>) -> Result<Self> {
        let Value::Object(fields) = record else {
            return Err(FoxError::InvalidAlert {
                reason: "alert record must be an object".to_string(),
            });
        };

        let labels = string_map(fields, "labels")?;
        let annotations = string_map(fields, "annotations")?;

        let name = labels
            .get("alertname")
            .filter(|n| !n.is_empty())
            .cloned()
            .or_else(|| non_empty_str(fields, "alert_name"))
            .or_else(|| non_empty_str(fields, "alertname"))
            .unwrap_or_else(|| UNKNOWN_ALERT_NAME.to_string());

        let source = context_source
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| non_empty_str(fields, "source"))
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

        let status = match fields.get("status") {
            None | Some(Value::Null) => AlertStatus::default(),
            Some(Value::String(s)) => s.parse()?,
            Some(other) => {
                return Err(FoxError::InvalidAlert {
                    reason: format!("status must be a string, got {other}"),
                });
            }
        };

        Ok(Self {
            name,
            labels,
            annotations,
            status,
            source,
        })
    }
}

/// Returns a non-empty string field of a JSON object.
pub(crate) fn non_empty_str(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_map(fields: &Map<String, Value>, key: &str) -> Result<HashMap<String, String>> {
    let entries = match fields.get(key) {
        None | Some(Value::Null) => return Ok(HashMap::new()),
        Some(Value::Object(entries)) => entries,
        Some(other) => {
            return Err(FoxError::InvalidAlert {
                reason: format!("{key} must be an object, got {other}"),
            });
        }
    };

    entries
        .iter()
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(FoxError::InvalidAlert {
                        reason: format!("{key}.{k} must be a scalar value"),
                    });
                }
            };
            Ok((k.clone(), value))
        })
        .collect()
}

/// Business context for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectContext {
    /// The project identifier, the primary lookup key.
    pub project_id: String,
    /// Business criticality: critical, high, medium or low.
    pub criticality: String,
    /// The owning team.
    pub owner: String,
    /// Channels to notify, in order.
    pub alert_channels: Vec<String>,
    /// Availability objective, e.g. `99.95`.
    pub availability_slo: String,
    /// P99 latency objective, e.g. `200ms`.
    pub latency_p99: String,
}

impl ProjectContext {
    /// Creates a context with default business fields.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            criticality: DEFAULT_CRITICALITY.to_string(),
            owner: String::new(),
            alert_channels: Vec::new(),
            availability_slo: String::new(),
            latency_p99: String::new(),
        }
    }

    /// Sets the criticality.
    #[must_use]
    pub fn with_criticality(mut self, criticality: impl Into<String>) -> Self {
        self.criticality = criticality.into();
        self
    }

    /// Sets the owner.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Adds an alert channel.
    #[must_use]
    pub fn with_alert_channel(mut self, channel: impl Into<String>) -> Self {
        self.alert_channels.push(channel.into());
        self
    }

    /// Sets the availability and latency objectives.
    #[must_use]
    pub fn with_slos(mut self, availability: impl Into<String>, latency_p99: impl Into<String>) -> Self {
        self.availability_slo = availability.into();
        self.latency_p99 = latency_p99.into();
        self
    }
}

/// An alert enriched with business metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedAlert {
    /// The original alert.
    pub alert: Alert,
    /// The resolved (or label-derived) project id.
    pub project_id: String,
    /// The resolved criticality, or the `severity` label when unenriched.
    pub criticality: String,
    /// The owning team.
    pub business_owner: String,
    /// Channels to notify.
    pub alert_channels: Vec<String>,
    /// Availability objective.
    pub availability_slo: String,
    /// P99 latency objective.
    pub latency_p99: String,
    /// True if a stored ProjectContext was found.
    pub enriched: bool,
}

impl EnrichedAlert {
    /// Builds an enriched alert from a stored context.
    #[must_use]
    pub fn from_context(alert: Alert, context: &ProjectContext) -> Self {
        Self {
            alert,
            project_id: context.project_id.clone(),
            criticality: context.criticality.clone(),
            business_owner: context.owner.clone(),
            alert_channels: context.alert_channels.clone(),
            availability_slo: context.availability_slo.clone(),
            latency_p99: context.latency_p99.clone(),
            enriched: true,
        }
    }

    /// Builds the label-derived fallback for an alert without a context.
    #[must_use]
    pub fn unenriched(alert: Alert, project_id: impl Into<String>) -> Self {
        let criticality = alert
            .label("severity")
            .unwrap_or(DEFAULT_CRITICALITY)
            .to_string();

        Self {
            alert,
            project_id: project_id.into(),
            criticality,
            business_owner: String::new(),
            alert_channels: Vec::new(),
            availability_slo: String::new(),
            latency_p99: String::new(),
            enriched: false,
        }
    }
}

/// The per-alert outcome reported by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSummary {
    /// The alert name.
    pub alert_name: String,
    /// The resolved project id.
    pub project_id: String,
    /// The criticality used for routing.
    pub criticality: String,
    /// Whether a stored context was found.
    pub enriched: bool,
    /// Actions dispatched, in routing order.
    pub actions_dispatched: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    mod status_tests {
        use super::*;
        use test_case::test_case;

        #[test_case("firing", AlertStatus::Firing ; "firing")]
        #[test_case("resolved", AlertStatus::Resolved ; "resolved")]
        #[test_case("pending", AlertStatus::Pending ; "pending")]
        #[test_case("FIRING", AlertStatus::Firing ; "uppercase")]
        fn parse_status(raw: &str, expected: AlertStatus) {
            assert_eq!(raw.parse::<AlertStatus>().unwrap(), expected);
        }

        #[test]
        fn unknown_status_is_rejected() {
            let err = "exploded".parse::<AlertStatus>().unwrap_err();
            assert!(matches!(err, FoxError::InvalidAlert { .. }));
        }

        #[test]
        fn status_display() {
            assert_eq!(AlertStatus::Resolved.to_string(), "resolved");
            assert_eq!(AlertStatus::default(), AlertStatus::Firing);
        }
    }

    mod record_tests {
        use super::*;
        use test_case::test_case;

        #[test]
        fn alertmanager_record() {
            let record = json!({
                "labels": {"alertname": "KubePodCrashLooping", "namespace": "commerce"},
                "annotations": {"summary": "Pod is crash-looping"},
                "status": "firing"
            });
            let alert = Alert::from_record(&record, None).unwrap();
            assert_eq!(alert.name, "KubePodCrashLooping");
            assert_eq!(alert.label("namespace"), Some("commerce"));
            assert_eq!(alert.annotations["summary"], "Pod is crash-looping");
            assert_eq!(alert.status, AlertStatus::Firing);
            assert_eq!(alert.source, "alertmanager");
        }

        #[test_case(json!({"alert_name": "Direct"}), "Direct" ; "alert_name key")]
        #[test_case(json!({"alertname": "Plain"}), "Plain" ; "alertname key")]
        #[test_case(json!({"labels": {"alertname": "FromLabel"}, "alert_name": "Other"}), "FromLabel" ; "label wins")]
        #[test_case(json!({"labels": {}}), "unknown" ; "missing")]
        fn name_resolution(record: Value, expected: &str) {
            assert_eq!(Alert::from_record(&record, None).unwrap().name, expected);
        }

        #[test]
        fn context_source_wins() {
            let record = json!({"alert_name": "A", "source": "manual"});
            assert_eq!(Alert::from_record(&record, Some("grafana")).unwrap().source, "grafana");
            assert_eq!(Alert::from_record(&record, None).unwrap().source, "manual");
        }

        #[test]
        fn scalar_labels_are_stringified() {
            let record = json!({"alert_name": "A", "labels": {"replicas": 3, "canary": true}});
            let alert = Alert::from_record(&record, None).unwrap();
            assert_eq!(alert.label("replicas"), Some("3"));
            assert_eq!(alert.label("canary"), Some("true"));
        }

        #[test_case(json!("not an object") ; "string record")]
        #[test_case(json!({"labels": "severity=critical"}) ; "string labels")]
        #[test_case(json!({"labels": {"nested": {"a": 1}}}) ; "nested label")]
        #[test_case(json!({"annotations": [1, 2]}) ; "array annotations")]
        #[test_case(json!({"status": "exploded"}) ; "unknown status")]
        #[test_case(json!({"status": 1}) ; "numeric status")]
        fn malformed_records_are_rejected(record: Value) {
            let err = Alert::from_record(&record, None).unwrap_err();
            assert!(matches!(err, FoxError::InvalidAlert { .. }));
        }
    }

    mod enriched_tests {
        use super::*;

        fn context() -> ProjectContext {
            ProjectContext::new("checkout-service")
                .with_criticality("critical")
                .with_owner("commerce-team")
                .with_alert_channel("commerce-oncall")
                .with_slos("99.95", "200ms")
        }

        #[test]
        fn from_context_copies_every_field() {
            let enriched = EnrichedAlert::from_context(Alert::new("A"), &context());
            assert!(enriched.enriched);
            assert_eq!(enriched.project_id, "checkout-service");
            assert_eq!(enriched.criticality, "critical");
            assert_eq!(enriched.business_owner, "commerce-team");
            assert_eq!(enriched.alert_channels, vec!["commerce-oncall"]);
            assert_eq!(enriched.availability_slo, "99.95");
            assert_eq!(enriched.latency_p99, "200ms");
        }

        #[test]
        fn unenriched_uses_severity() {
            let alert = Alert::new("A").with_label("severity", "warning");
            let enriched = EnrichedAlert::unenriched(alert, "proj");
            assert!(!enriched.enriched);
            assert_eq!(enriched.criticality, "warning");
            assert_eq!(enriched.project_id, "proj");
            assert!(enriched.business_owner.is_empty());
        }

        #[test]
        fn unenriched_defaults_to_medium() {
            let enriched = EnrichedAlert::unenriched(Alert::new("A"), "");
            assert_eq!(enriched.criticality, DEFAULT_CRITICALITY);
        }
    }
}
