//! CLI command implementations.
//!
//! Each submodule implements a specific CLI command:
//! - [`execute`] - Run or validate an action payload
//! - [`route`] - Show routing for a criticality
//! - [`lookup`] - Resolve a ProjectContext
//! - [`actions`] - List registered actions
//! - [`demo`] - Generate historical demo spans

pub mod actions;
pub mod demo;
pub mod execute;
pub mod lookup;
pub mod route;

use std::io::Read;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::CliError;

pub use actions::ActionsCommand;
pub use demo::DemoCommand;
pub use execute::ExecuteCommand;
pub use lookup::LookupCommand;
pub use route::RouteCommand;

/// Reads a JSON payload from a file, or from stdin for `None` and `-`.
///
/// Blank input reads as an empty object, which validation then rejects.
///
/// # Errors
///
/// Returns `CliError::Input` if the payload cannot be read or parsed.
pub fn read_payload(path: Option<&Path>) -> Result<Value, CliError> {
    let raw = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .map_err(|e| CliError::Input(format!("cannot read {}: {e}", path.display())))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    if raw.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_str(&raw).map_err(|e| CliError::Input(format!("payload is not valid JSON: {e}")))
}
