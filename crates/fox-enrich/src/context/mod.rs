//! ProjectContext resolution.
//!
//! A [`ProjectContextReader`] consults its [`ContextCache`] first, then each
//! [`ContextSource`] in order (Kubernetes before the YAML file when both are
//! configured). The first source that yields a context wins and the result is
//! cached under the lookup key. Source failures are logged and treated as
//! absence, so a lookup never fails.

mod cache;
mod kubernetes;
mod yaml;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

pub use cache::ContextCache;
pub use kubernetes::{
    BusinessSpec, CustomResourceApi, GROUP, KubernetesCapability, KubernetesContextSource,
    ObservabilitySpec, PLURAL, ProjectContextList, ProjectContextResource, ProjectContextSpec,
    ProjectSpec, RequirementsSpec, ResourceMetadata, VERSION,
};
pub use yaml::{YamlContextSource, parse_context_yaml};

use crate::config::FoxConfig;
use crate::error::Result;
use crate::types::ProjectContext;

/// The inputs of a context lookup. Every field is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupQuery<'a> {
    /// Namespace of the alerting workload.
    pub namespace: Option<&'a str>,
    /// Labels of the alert.
    pub labels: Option<&'a HashMap<String, String>>,
    /// Candidate project identifier.
    pub project_id: Option<&'a str>,
}

impl<'a> LookupQuery<'a> {
    /// Creates an empty query.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            namespace: None,
            labels: None,
            project_id: None,
        }
    }

    /// Sets the namespace.
    #[must_use]
    pub const fn with_namespace(mut self, namespace: &'a str) -> Self {
        self.namespace = Some(namespace);
        self
    }

    /// Sets the project id.
    #[must_use]
    pub const fn with_project_id(mut self, project_id: &'a str) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Sets the alert labels.
    #[must_use]
    pub const fn with_labels(mut self, labels: &'a HashMap<String, String>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Returns the cache key: the project id, else the namespace, else `""`.
    #[must_use]
    pub fn cache_key(&self) -> &'a str {
        self.project_id.or(self.namespace).unwrap_or("")
    }
}

/// An authority that can resolve a ProjectContext.
pub trait ContextSource: Send + Sync + fmt::Debug {
    /// Returns the source name, used in logs.
    fn name(&self) -> &str;

    /// Looks up a context. A mismatch is `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the authority cannot be queried.
    fn find(&self, query: &LookupQuery<'_>) -> Result<Option<ProjectContext>>;
}

/// Resolves alert metadata to a ProjectContext.
///
/// Implemented by [`ProjectContextReader`]; tests substitute their own.
pub trait ContextLookup: Send + Sync {
    /// Returns the context for the query, or `None` if no authority has one.
    fn lookup(&self, query: &LookupQuery<'_>) -> Option<Arc<ProjectContext>>;
}

/// Cached lookup over an ordered list of context sources.
#[derive(Debug)]
pub struct ProjectContextReader {
    sources: Vec<Box<dyn ContextSource>>,
    cache: ContextCache,
}

impl ProjectContextReader {
    /// Creates a reader with no sources.
    #[must_use]
    pub fn new(cache: ContextCache) -> Self {
        Self {
            sources: Vec::new(),
            cache,
        }
    }

    /// Appends a source. Sources are consulted in insertion order.
    #[must_use]
    pub fn with_source(mut self, source: impl ContextSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Builds the reader described by the configuration.
    ///
    /// When Kubernetes lookups are enabled, the cluster API is checked once
    /// here; if it is unavailable only the YAML file is used.
    #[must_use]
    pub fn from_config(config: &FoxConfig) -> Self {
        let mut reader = Self::new(ContextCache::from_config(&config.cache));

        if config.use_kubernetes {
            match KubernetesCapability::detect(config.kubernetes_timeout()).into_source() {
                Some(source) => reader = reader.with_source(source),
                None => debug!("falling back to YAML context only"),
            }
        }

        reader.with_source(YamlContextSource::new(&config.contextcore_yaml_path))
    }

    /// Returns the cache.
    #[must_use]
    pub const fn cache(&self) -> &ContextCache {
        &self.cache
    }

    /// Returns the names of the configured sources, in lookup order.
    #[must_use]
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }
}

impl ContextLookup for ProjectContextReader {
    fn lookup(&self, query: &LookupQuery<'_>) -> Option<Arc<ProjectContext>> {
        let key = query.cache_key();

        if let Some(hit) = self.cache.get(key) {
            debug!(key = %key, "context cache hit");
            return Some(hit);
        }

        for source in &self.sources {
            match source.find(query) {
                Ok(Some(context)) => {
                    debug!(key = %key, source = %source.name(), project_id = %context.project_id, "resolved project context");
                    let context = Arc::new(context);
                    self.cache.insert(key, Arc::clone(&context));
                    return Some(context);
                }
                Ok(None) => {}
                Err(e) => {
                    debug!(key = %key, source = %source.name(), error = %e, "context source failed");
                }
            }
        }

        debug!(key = %key, "no project context found");
        None
    }
}
