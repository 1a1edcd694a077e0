//! `.contextcore.yaml` fallback source.
//!
//! ```yaml
//! project:
//!   id: checkout-service
//! business:
//!   criticality: critical
//!   owner: commerce-team
//! requirements:
//!   availability: 99.95
//!   latencyP99: 200ms
//! observability:          # optional
//!   alertChannels: [commerce-oncall]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use super::{ContextSource, LookupQuery};
use crate::error::{FoxError, Result};
use crate::types::{DEFAULT_CRITICALITY, ProjectContext};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContextFile {
    project: ProjectSection,
    business: BusinessSection,
    requirements: RequirementsSection,
    observability: ObservabilitySection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProjectSection {
    #[serde(deserialize_with = "scalar_string")]
    id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BusinessSection {
    #[serde(deserialize_with = "scalar_string")]
    criticality: String,
    #[serde(deserialize_with = "scalar_string")]
    owner: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RequirementsSection {
    #[serde(deserialize_with = "scalar_string")]
    availability: String,
    #[serde(deserialize_with = "scalar_string")]
    latency_p99: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ObservabilitySection {
    alert_channels: Vec<String>,
}

/// Accepts any YAML scalar and renders it as a string, so unquoted values
/// such as `availability: 99.95` parse.
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    use serde::de::Error;

    match Option::<serde_yaml::Value>::deserialize(deserializer)? {
        None | Some(serde_yaml::Value::Null) => Ok(String::new()),
        Some(serde_yaml::Value::String(s)) => Ok(s),
        Some(serde_yaml::Value::Number(n)) => Ok(n.to_string()),
        Some(serde_yaml::Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(D::Error::custom(format!("expected a scalar, got {other:?}"))),
    }
}

impl From<ContextFile> for ProjectContext {
    fn from(file: ContextFile) -> Self {
        let criticality = if file.business.criticality.is_empty() {
            DEFAULT_CRITICALITY.to_string()
        } else {
            file.business.criticality
        };

        Self {
            project_id: file.project.id,
            criticality,
            owner: file.business.owner,
            alert_channels: file.observability.alert_channels,
            availability_slo: file.requirements.availability,
            latency_p99: file.requirements.latency_p99,
        }
    }
}

/// Parses a ProjectContext document.
///
/// Returns `Ok(None)` for an empty document.
///
/// # Errors
///
/// Returns `FoxError::SerializationError` if the YAML is malformed.
pub fn parse_context_yaml(content: &str) -> Result<Option<ProjectContext>> {
    if content.trim().is_empty() {
        return Ok(None);
    }
    let file: Option<ContextFile> = serde_yaml::from_str(content)?;
    Ok(file.map(ProjectContext::from))
}

/// Reads a single ProjectContext from a local YAML file.
///
/// The file is re-read on every lookup; results are cached by the reader.
#[derive(Debug, Clone)]
pub struct YamlContextSource {
    path: PathBuf,
}

impl YamlContextSource {
    /// Creates a source for the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContextSource for YamlContextSource {
    fn name(&self) -> &str {
        "yaml"
    }

    fn find(&self, query: &LookupQuery<'_>) -> Result<Option<ProjectContext>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "context file not found");
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let context = parse_context_yaml(&content).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "failed to parse context file");
            FoxError::ContextSource {
                source_name: self.name().to_string(),
                reason: format!("{}: {e}", self.path.display()),
            }
        })?;

        Ok(context.filter(|ctx| query.project_id.is_none_or(|id| ctx.project_id == id)))
    }
}
