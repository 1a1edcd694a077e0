//! The `log` action: records the payload in the service log.

use serde_json::{Value, json};
use tracing::info;

use crate::action::{Action, ActionContext, ActionResult};

/// Logs the top-level keys of the payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAction;

impl LogAction {
    /// Registry name of the action.
    pub const NAME: &'static str = "log";
}

impl Action for LogAction {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Log the payload"
    }

    fn execute(&self, payload: &Value, context: &ActionContext) -> ActionResult {
        let keys: Vec<&str> = payload
            .as_object()
            .map(|fields| fields.keys().map(String::as_str).collect())
            .unwrap_or_default();

        info!(
            source = context.source.as_deref().unwrap_or("-"),
            payload_keys = ?keys,
            "log action"
        );

        ActionResult::success(Self::NAME, format!("Logged payload with {} keys", keys.len()))
            .with_data(json!({ "payload_keys": keys }))
    }
}
