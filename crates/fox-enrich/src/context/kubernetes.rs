//! ProjectContext lookup from Kubernetes custom resources.
//!
//! Resources are namespaced objects of group `contextcore.io`, version `v1`,
//! plural `projectcontexts`. Availability of the cluster API is checked once,
//! when the reader is built, and captured as a [`KubernetesCapability`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::{ContextSource, LookupQuery};
use crate::error::Result;
use crate::types::{DEFAULT_CRITICALITY, ProjectContext};

/// API group of the ProjectContext resource.
pub const GROUP: &str = "contextcore.io";
/// API version of the ProjectContext resource.
pub const VERSION: &str = "v1";
/// Plural resource name.
pub const PLURAL: &str = "projectcontexts";

/// A ProjectContext custom resource as returned by the API server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectContextResource {
    /// Object metadata.
    pub metadata: ResourceMetadata,
    /// The resource spec.
    pub spec: ProjectContextSpec,
}

/// The subset of object metadata Fox uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResourceMetadata {
    /// Object name.
    pub name: String,
    /// Object namespace.
    pub namespace: String,
}

/// `spec` of a ProjectContext resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectContextSpec {
    /// `spec.project`.
    pub project: ProjectSpec,
    /// `spec.business`.
    pub business: BusinessSpec,
    /// `spec.observability`.
    pub observability: ObservabilitySpec,
    /// `spec.requirements`.
    pub requirements: RequirementsSpec,
}

/// `spec.project`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectSpec {
    /// Project identifier.
    pub id: String,
}

/// `spec.business`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BusinessSpec {
    /// Business criticality.
    pub criticality: String,
    /// Owning team.
    pub owner: String,
}

/// `spec.observability`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObservabilitySpec {
    /// Channels to notify.
    pub alert_channels: Vec<String>,
}

/// `spec.requirements`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequirementsSpec {
    /// Availability objective.
    pub availability: String,
    /// P99 latency objective.
    pub latency_p99: String,
}

/// A list response from the API server.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectContextList {
    /// The listed resources.
    pub items: Vec<ProjectContextResource>,
}

impl From<&ProjectContextResource> for ProjectContext {
    fn from(resource: &ProjectContextResource) -> Self {
        let spec = &resource.spec;
        let criticality = if spec.business.criticality.is_empty() {
            DEFAULT_CRITICALITY.to_string()
        } else {
            spec.business.criticality.clone()
        };

        Self {
            project_id: spec.project.id.clone(),
            criticality,
            owner: spec.business.owner.clone(),
            alert_channels: spec.observability.alert_channels.clone(),
            availability_slo: spec.requirements.availability.clone(),
            latency_p99: spec.requirements.latency_p99.clone(),
        }
    }
}

/// Access to ProjectContext resources in a cluster.
pub trait CustomResourceApi: Send + Sync + fmt::Debug {
    /// Lists the ProjectContext resources in a namespace.
    ///
    /// # Errors
    ///
    /// Returns `FoxError::ContextSource` if the API cannot be reached or
    /// answers with an error.
    fn list_project_contexts(&self, namespace: &str) -> Result<Vec<ProjectContextResource>>;
}

/// Whether the cluster API can be used, decided once at startup.
#[derive(Debug, Clone)]
pub enum KubernetesCapability {
    /// The API is reachable through the given client.
    Available(Arc<dyn CustomResourceApi>),
    /// Kubernetes lookups are skipped.
    Unavailable {
        /// Why the API cannot be used.
        reason: String,
    },
}

impl KubernetesCapability {
    /// Inspects the in-cluster service account environment.
    #[must_use]
    pub fn detect(timeout: Duration) -> Self {
        #[cfg(feature = "kubernetes")]
        {
            match in_cluster::InClusterApi::from_environment(timeout) {
                Ok(api) => {
                    debug!(api = %api.base_url(), "kubernetes context lookup available");
                    Self::Available(Arc::new(api))
                }
                Err(e) => {
                    debug!(error = %e, "kubernetes not available for ProjectContext lookup");
                    Self::Unavailable {
                        reason: e.to_string(),
                    }
                }
            }
        }

        #[cfg(not(feature = "kubernetes"))]
        {
            let _ = timeout;
            debug!("kubernetes not available for ProjectContext lookup");
            Self::Unavailable {
                reason: "built without kubernetes support".to_string(),
            }
        }
    }

    /// Returns true if the API can be used.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Turns an available capability into a context source.
    #[must_use]
    pub fn into_source(self) -> Option<KubernetesContextSource> {
        match self {
            Self::Available(api) => Some(KubernetesContextSource::new(api)),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Looks up ProjectContext resources in the alert's namespace.
#[derive(Debug, Clone)]
pub struct KubernetesContextSource {
    api: Arc<dyn CustomResourceApi>,
}

impl KubernetesContextSource {
    /// Creates a source backed by the given API client.
    #[must_use]
    pub fn new(api: Arc<dyn CustomResourceApi>) -> Self {
        Self { api }
    }
}

impl ContextSource for KubernetesContextSource {
    fn name(&self) -> &str {
        "kubernetes"
    }

    fn find(&self, query: &LookupQuery<'_>) -> Result<Option<ProjectContext>> {
        let Some(namespace) = query.namespace.filter(|ns| !ns.is_empty()) else {
            return Ok(None);
        };
        if !is_valid_namespace(namespace) {
            debug!(namespace = %namespace, "skipping invalid namespace");
            return Ok(None);
        }

        let items = self.api.list_project_contexts(namespace)?;
        let found = items.iter().find(|item| {
            query
                .project_id
                .is_none_or(|id| item.spec.project.id == id)
        });

        if found.is_none() {
            debug!(
                namespace = %namespace,
                project_id = ?query.project_id,
                candidates = items.len(),
                "no matching ProjectContext resource"
            );
        }

        Ok(found.map(ProjectContext::from))
    }
}

/// Returns true for RFC 1123 label names, the format of namespace names.
fn is_valid_namespace(namespace: &str) -> bool {
    namespace.len() <= 63
        && namespace
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !namespace.starts_with('-')
        && !namespace.ends_with('-')
}

#[cfg(feature = "kubernetes")]
mod in_cluster {
    use std::fmt;
    use std::path::Path;
    use std::time::Duration;

    use super::{CustomResourceApi, GROUP, PLURAL, ProjectContextList, ProjectContextResource, VERSION};
    use crate::error::{FoxError, Result};

    const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

    fn source_error(reason: impl Into<String>) -> FoxError {
        FoxError::ContextSource {
            source_name: "kubernetes".to_string(),
            reason: reason.into(),
        }
    }

    /// Talks to the API server with the pod's service account.
    pub(super) struct InClusterApi {
        base_url: String,
        token: String,
        client: reqwest::blocking::Client,
    }

    impl InClusterApi {
        pub(super) fn from_environment(timeout: Duration) -> Result<Self> {
            let host = std::env::var("KUBERNETES_SERVICE_HOST")
                .map_err(|_| source_error("KUBERNETES_SERVICE_HOST is not set"))?;
            let port =
                std::env::var("KUBERNETES_SERVICE_PORT").unwrap_or_else(|_| "443".to_string());

            let dir = Path::new(SERVICE_ACCOUNT_DIR);
            let token = std::fs::read_to_string(dir.join("token"))
                .map_err(|e| source_error(format!("cannot read service account token: {e}")))?
                .trim()
                .to_string();
            let ca = std::fs::read(dir.join("ca.crt"))
                .map_err(|e| source_error(format!("cannot read cluster CA: {e}")))?;
            let ca = reqwest::Certificate::from_pem(&ca)
                .map_err(|e| source_error(format!("invalid cluster CA: {e}")))?;

            let client = reqwest::blocking::Client::builder()
                .add_root_certificate(ca)
                .timeout(timeout)
                .build()
                .map_err(|e| source_error(format!("cannot build HTTP client: {e}")))?;

            let host = if host.contains(':') {
                format!("[{host}]")
            } else {
                host
            };

            Ok(Self {
                base_url: format!("https://{host}:{port}"),
                token,
                client,
            })
        }

        pub(super) fn base_url(&self) -> &str {
            &self.base_url
        }
    }

    impl CustomResourceApi for InClusterApi {
        fn list_project_contexts(&self, namespace: &str) -> Result<Vec<ProjectContextResource>> {
            let url = format!(
                "{}/apis/{GROUP}/{VERSION}/namespaces/{namespace}/{PLURAL}",
                self.base_url
            );

            let list: ProjectContextList = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .and_then(reqwest::blocking::Response::error_for_status)
                .and_then(reqwest::blocking::Response::json)
                .map_err(|e| source_error(format!("GET {url}: {e}")))?;

            Ok(list.items)
        }
    }

    impl fmt::Debug for InClusterApi {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("InClusterApi")
                .field("base_url", &self.base_url)
                .finish_non_exhaustive()
        }
    }
}
