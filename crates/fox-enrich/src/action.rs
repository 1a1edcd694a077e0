//! Action framework: named actions resolved from a registry at call time.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{FoxError, Result};

/// Outcome of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    /// The action completed.
    Success,
    /// The action failed or was rejected.
    Failed,
    /// The action chose not to run.
    Skipped,
}

impl ActionStatus {
    /// Returns the status as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    /// Returns true for [`ActionStatus::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The result of executing an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Outcome.
    pub status: ActionStatus,
    /// Name of the action that produced the result.
    pub action_name: String,
    /// Human-readable summary.
    pub message: String,
    /// Structured output.
    pub data: Value,
    /// Wall-clock execution time in milliseconds.
    pub duration_ms: f64,
    /// When the result was produced.
    pub timestamp: DateTime<Utc>,
}

impl ActionResult {
    /// Creates a result with the given status and no data.
    pub fn new(status: ActionStatus, action_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            action_name: action_name.into(),
            message: message.into(),
            data: Value::Null,
            duration_ms: 0.0,
            timestamp: Utc::now(),
        }
    }

    /// Creates a successful result.
    pub fn success(action_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ActionStatus::Success, action_name, message)
    }

    /// Creates a failed result.
    pub fn failed(action_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ActionStatus::Failed, action_name, message)
    }

    /// Creates a skipped result.
    pub fn skipped(action_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ActionStatus::Skipped, action_name, message)
    }

    /// Attaches structured output.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Returns true if the action succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Serializes the result to JSON.
    ///
    /// # Errors
    ///
    /// Returns `FoxError::SerializationError` if `data` holds a non-finite
    /// number.
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Information about the caller of an action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionContext {
    /// The system that triggered the action, e.g. `grafana`.
    pub source: Option<String>,
    /// Free-form attributes.
    pub attributes: HashMap<String, String>,
}

impl ActionContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// A named unit of work triggered with a JSON payload.
pub trait Action: Send + Sync {
    /// Unique registry name.
    fn name(&self) -> &str;

    /// One-line description.
    fn description(&self) -> &str;

    /// Checks the payload before execution. `Some(message)` rejects it.
    fn validate(&self, _payload: &Value) -> Option<String> {
        None
    }

    /// Runs the action. Failures are reported in the result.
    fn execute(&self, payload: &Value, context: &ActionContext) -> ActionResult;
}

/// Name and description of a registered action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionInfo {
    /// Registry name.
    pub name: String,
    /// Description.
    pub description: String,
}

/// Actions keyed by name.
#[derive(Default)]
pub struct ActionRegistry {
    actions: RwLock<BTreeMap<String, Arc<dyn Action>>>,
}

impl ActionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action under its name.
    ///
    /// # Errors
    ///
    /// Returns `FoxError::DuplicateAction` if the name is taken.
    pub fn register(&self, action: Arc<dyn Action>) -> Result<()> {
        let name = action.name().to_string();
        let mut actions = self.actions.write();
        if actions.contains_key(&name) {
            return Err(FoxError::DuplicateAction { name });
        }
        debug!(action = %name, "registered action");
        actions.insert(name, action);
        Ok(())
    }

    /// Returns the action with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.read().get(name).cloned()
    }

    /// Lists registered actions sorted by name.
    #[must_use]
    pub fn list(&self) -> Vec<ActionInfo> {
        self.actions
            .read()
            .values()
            .map(|action| ActionInfo {
                name: action.name().to_string(),
                description: action.description().to_string(),
            })
            .collect()
    }

    /// Returns the number of registered actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.read().is_empty()
    }

    /// Removes every action.
    pub fn clear(&self) {
        self.actions.write().clear();
    }

    /// Validates and executes the named action.
    ///
    /// An unknown name or a rejected payload yields a `Failed` result without
    /// calling the action. The measured duration is recorded on the result.
    pub fn execute(&self, name: &str, payload: &Value, context: &ActionContext) -> ActionResult {
        let Some(action) = self.get(name) else {
            warn!(action = %name, "action not found");
            return ActionResult::failed(name, format!("Action not found: {name}"));
        };

        if let Some(reason) = action.validate(payload) {
            debug!(action = %name, reason = %reason, "payload rejected");
            return ActionResult::failed(name, format!("Validation failed: {reason}"));
        }

        let started = Instant::now();
        let mut result = action.execute(payload, context);
        result.duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        debug!(
            action = %name,
            status = %result.status,
            duration_ms = result.duration_ms,
            "action executed"
        );
        result
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.actions.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes the payload and counts calls.
    #[derive(Default)]
    struct EchoAction {
        calls: AtomicUsize,
    }

    impl Action for EchoAction {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the payload"
        }

        fn validate(&self, payload: &Value) -> Option<String> {
            payload
                .get("reject")
                .map(|_| "payload asked to be rejected".to_string())
        }

        fn execute(&self, payload: &Value, context: &ActionContext) -> ActionResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ActionResult::success(self.name(), "echoed").with_data(json!({
                "payload": payload,
                "source": context.source,
            }))
        }
    }

    mod result_tests {
        use super::*;

        #[test]
        fn constructors_set_status() {
            assert_eq!(ActionResult::success("a", "").status, ActionStatus::Success);
            assert_eq!(ActionResult::failed("a", "").status, ActionStatus::Failed);
            assert_eq!(ActionResult::skipped("a", "").status, ActionStatus::Skipped);
            assert!(ActionResult::success("a", "").is_success());
        }

        #[test]
        fn to_json_shape() {
            let json = ActionResult::failed("fox_enrich", "boom")
                .with_data(json!({"k": 1}))
                .to_json()
                .unwrap();
            assert_eq!(json["status"], "failed");
            assert_eq!(json["action_name"], "fox_enrich");
            assert_eq!(json["message"], "boom");
            assert_eq!(json["data"]["k"], 1);
            assert!(json["timestamp"].as_str().unwrap().contains('T'));
        }

        #[test]
        fn context_builder() {
            let ctx = ActionContext::new()
                .with_source("grafana")
                .with_attribute("tenant", "acme");
            assert_eq!(ctx.source.as_deref(), Some("grafana"));
            assert_eq!(ctx.attributes["tenant"], "acme");
        }
    }

    mod registry_tests {
        use super::*;

        fn registry() -> (ActionRegistry, Arc<EchoAction>) {
            let registry = ActionRegistry::new();
            let echo = Arc::new(EchoAction::default());
            registry.register(Arc::clone(&echo) as Arc<dyn Action>).unwrap();
            (registry, echo)
        }

        #[test]
        fn register_and_get() {
            let (registry, _) = registry();
            assert_eq!(registry.get("echo").unwrap().name(), "echo");
            assert!(registry.get("missing").is_none());
            assert_eq!(registry.len(), 1);
        }

        #[test]
        fn duplicate_names_are_rejected() {
            let (registry, _) = registry();
            let err = registry.register(Arc::new(EchoAction::default())).unwrap_err();
            assert!(matches!(err, FoxError::DuplicateAction { name } if name == "echo"));
        }

        #[test]
        fn list_reports_descriptions() {
            let (registry, _) = registry();
            assert_eq!(
                registry.list(),
                vec![ActionInfo {
                    name: "echo".to_string(),
                    description: "Echo the payload".to_string(),
                }]
            );
        }

        #[test]
        fn execute_passes_payload_and_context() {
            let (registry, echo) = registry();
            let ctx = ActionContext::new().with_source("manual");
            let result = registry.execute("echo", &json!({"x": 1}), &ctx);

            assert!(result.is_success());
            assert_eq!(result.data["payload"]["x"], 1);
            assert_eq!(result.data["source"], "manual");
            assert!(result.duration_ms >= 0.0);
            assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
        }

        #[test]
        fn unknown_action_fails() {
            let (registry, _) = registry();
            let result = registry.execute("nope", &json!({}), &ActionContext::new());
            assert_eq!(result.status, ActionStatus::Failed);
            assert_eq!(result.message, "Action not found: nope");
        }

        #[test]
        fn validation_failure_skips_execute() {
            let (registry, echo) = registry();
            let result = registry.execute("echo", &json!({"reject": true}), &ActionContext::new());
            assert_eq!(result.status, ActionStatus::Failed);
            assert_eq!(result.message, "Validation failed: payload asked to be rejected");
            assert_eq!(echo.calls.load(Ordering::SeqCst), 0);
        }

        #[test]
        fn clear_removes_everything() {
            let (registry, _) = registry();
            registry.clear();
            assert!(registry.is_empty());
            assert!(registry.list().is_empty());
        }
    }
}
