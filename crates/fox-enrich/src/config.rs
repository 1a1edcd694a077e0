//! Configuration for the Fox pipeline.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables. Each option can be overridden independently.
//!
//! | Environment variable           | Field                    |
//! |--------------------------------|--------------------------|
//! | `OTEL_EXPORTER_OTLP_ENDPOINT`  | `otlp_endpoint`          |
//! | `CONTEXTCORE_YAML_PATH`        | `contextcore_yaml_path`  |
//! | `FOX_USE_KUBERNETES`           | `use_kubernetes`         |
//! | `FOX_ROUTING_TABLE`            | `routing_table` (JSON)   |
//! | `FOX_CONTEXT_CACHE_TTL_SECS`   | `cache.ttl_secs`         |
//! | `FOX_CONTEXT_CACHE_MAX_ENTRIES`| `cache.max_entries`      |

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{FoxError, Result};

/// Environment variable for the OTLP collector endpoint.
pub const ENV_OTLP_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
/// Environment variable for the fallback YAML context file.
pub const ENV_YAML_PATH: &str = "CONTEXTCORE_YAML_PATH";
/// Environment variable enabling Kubernetes lookups.
pub const ENV_USE_KUBERNETES: &str = "FOX_USE_KUBERNETES";
/// Environment variable holding a JSON routing table.
pub const ENV_ROUTING_TABLE: &str = "FOX_ROUTING_TABLE";
/// Environment variable for the context cache TTL.
pub const ENV_CACHE_TTL_SECS: &str = "FOX_CONTEXT_CACHE_TTL_SECS";
/// Environment variable for the context cache capacity.
pub const ENV_CACHE_MAX_ENTRIES: &str = "FOX_CONTEXT_CACHE_MAX_ENTRIES";

/// The action used for criticalities missing from the routing table.
pub const DEFAULT_ACTION: &str = "log";

/// Maps a criticality to an ordered list of action names.
///
/// Keys are stored lowercased, so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoutingTable {
    routes: BTreeMap<String, Vec<String>>,
}

impl RoutingTable {
    /// Creates an empty table. Every lookup falls back to `["log"]`.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            routes: BTreeMap::new(),
        }
    }

    /// Sets the actions for a criticality.
    #[must_use]
    pub fn with_route<I, S>(mut self, criticality: &str, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(criticality, actions.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the actions for a criticality, replacing any previous entry.
    pub fn insert(&mut self, criticality: &str, actions: Vec<String>) {
        self.routes.insert(criticality.to_lowercase(), actions);
    }

    /// Returns the actions for a criticality, if configured.
    #[must_use]
    pub fn get(&self, criticality: &str) -> Option<&[String]> {
        self.routes
            .get(&criticality.to_lowercase())
            .map(Vec::as_slice)
    }

    /// Returns the configured criticalities.
    pub fn criticalities(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Returns the number of configured criticalities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if nothing is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Parses a table from a JSON object of criticality to action list.
    ///
    /// # Errors
    ///
    /// Returns `FoxError::Config` if the JSON is not such an object.
    pub fn from_json(raw: &str) -> Result<Self> {
        let routes: BTreeMap<String, Vec<String>> =
            serde_json::from_str(raw).map_err(|e| FoxError::Config {
                reason: format!("{ENV_ROUTING_TABLE} must be a JSON object of string arrays: {e}"),
            })?;
        Ok(Self::from(routes))
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::empty()
            .with_route("critical", ["claude_analysis", "context_notify"])
            .with_route("high", ["context_notify"])
            .with_route("medium", [DEFAULT_ACTION])
            .with_route("low", [DEFAULT_ACTION])
    }
}

impl From<BTreeMap<String, Vec<String>>> for RoutingTable {
    fn from(routes: BTreeMap<String, Vec<String>>) -> Self {
        let mut table = Self::empty();
        for (criticality, actions) in routes {
            table.insert(&criticality, actions);
        }
        table
    }
}

impl<'de> Deserialize<'de> for RoutingTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        BTreeMap::<String, Vec<String>>::deserialize(deserializer).map(Self::from)
    }
}

/// Longest accepted cache TTL, one year.
pub const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Bounds of the ProjectContext cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long a resolved context stays valid (in seconds).
    pub ttl_secs: u64,
    /// Maximum number of cached contexts.
    pub max_entries: usize,
}

impl CacheConfig {
    /// Returns the TTL as a [`Duration`].
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            max_entries: 256,
        }
    }
}

/// Configuration for Fox context enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoxConfig {
    /// Service name reported on exported spans.
    pub service_name: String,
    /// OTLP collector endpoint.
    pub otlp_endpoint: String,
    /// Path of the fallback `.contextcore.yaml` file.
    pub contextcore_yaml_path: PathBuf,
    /// Whether to look up ProjectContext custom resources in the cluster.
    pub use_kubernetes: bool,
    /// Timeout for Kubernetes API calls (in seconds).
    pub kubernetes_timeout_secs: u64,
    /// Criticality to action routing.
    pub routing_table: RoutingTable,
    /// ProjectContext cache bounds.
    pub cache: CacheConfig,
}

impl Default for FoxConfig {
    fn default() -> Self {
        Self {
            service_name: fox_telemetry::SERVICE_NAME.to_string(),
            otlp_endpoint: "localhost:4317".to_string(),
            contextcore_yaml_path: PathBuf::from(".contextcore.yaml"),
            use_kubernetes: false,
            kubernetes_timeout_secs: 5,
            routing_table: RoutingTable::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl FoxConfig {
    /// Builds the configuration from defaults and the process environment.
    ///
    /// # Errors
    ///
    /// Returns `FoxError::Config` if an environment variable is malformed.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Loads configuration from a TOML file. Missing fields keep defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| FoxError::Config {
            reason: format!(
                "failed to read config file '{}': {e}",
                path.as_ref().display()
            ),
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `FoxError::Config` if the TOML is invalid.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides fields from environment-style variables.
    ///
    /// `lookup` returns the value of a variable, so tests can supply a map
    /// instead of touching the process environment. Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns `FoxError::Config` if a value cannot be parsed.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = get(ENV_OTLP_ENDPOINT) {
            self.otlp_endpoint = endpoint;
        }
        if let Some(path) = get(ENV_YAML_PATH) {
            self.contextcore_yaml_path = PathBuf::from(path);
        }
        if let Some(flag) = get(ENV_USE_KUBERNETES) {
            self.use_kubernetes = parse_bool(ENV_USE_KUBERNETES, &flag)?;
        }
        if let Some(table) = get(ENV_ROUTING_TABLE) {
            self.routing_table = RoutingTable::from_json(&table)?;
        }
        if let Some(ttl) = get(ENV_CACHE_TTL_SECS) {
            self.cache.ttl_secs = parse_number(ENV_CACHE_TTL_SECS, &ttl)?;
        }
        if let Some(max) = get(ENV_CACHE_MAX_ENTRIES) {
            self.cache.max_entries = parse_number(ENV_CACHE_MAX_ENTRIES, &max)?;
        }

        self.validate()
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `FoxError::Config` if the cache has no capacity, the cache TTL
    /// exceeds [`MAX_CACHE_TTL_SECS`], or the Kubernetes timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.cache.max_entries == 0 {
            return Err(FoxError::Config {
                reason: "cache.max_entries must be at least 1".to_string(),
            });
        }
        if self.cache.ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(FoxError::Config {
                reason: format!(
                    "cache.ttl_secs must be at most {MAX_CACHE_TTL_SECS}, got {}",
                    self.cache.ttl_secs
                ),
            });
        }
        if self.kubernetes_timeout_secs == 0 {
            return Err(FoxError::Config {
                reason: "kubernetes_timeout_secs must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the Kubernetes API timeout as a [`Duration`].
    #[must_use]
    pub const fn kubernetes_timeout(&self) -> Duration {
        Duration::from_secs(self.kubernetes_timeout_secs)
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(FoxError::Config {
            reason: format!("{key} must be true or false, got '{other}'"),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| FoxError::Config {
        reason: format!("{key} must be a non-negative integer, got '{raw}'"),
    })
}
