// src/config/model.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::errors::Result;
use crate::resource::{
    FilesystemResource, FilterChain, HttpClientConfig, HttpResource, PropertyReplacementFilter,
    Resource,
};
use crate::types::{PollFailureMode, ResourceKind};
use crate::watch::WatchOptions;

/// Configuration file exactly as read from TOML.
///
/// ```toml
/// [config]
/// poll_interval = "30s"
/// retry_attempts = 2
///
/// [http]
/// connect_timeout = "5s"
///
/// [resource.metadata]
/// location = "https://example.org/metadata.xml"
///
/// [resource.metadata.replace]
/// ENTITY_ID = "https://sp.example.org"
/// ```
///
/// All sections are optional at this level; [`ConfigFile::try_from`]
/// decides what is actually acceptable.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub http: HttpSection,

    /// All resources from `[resource.<name>]`.
    #[serde(default)]
    pub resource: BTreeMap<String, ResourceConfig>,
}

/// `[config]` section: watch defaults shared by every resource.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    #[serde(default)]
    pub retry_attempts: u32,

    #[serde(default)]
    pub poll_failure: PollFailureMode,

    /// Upper bound on the poll delay when `poll_failure = "backoff"`.
    #[serde(default = "default_max_backoff")]
    pub max_backoff: String,
}

fn default_poll_interval() -> String {
    "12h".to_string()
}

fn default_max_backoff() -> String {
    "24h".to_string()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            retry_attempts: 0,
            poll_failure: PollFailureMode::default(),
            max_backoff: default_max_backoff(),
        }
    }
}

/// `[http]` section. Unset keys keep the `HttpClientConfig` defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct HttpSection {
    #[serde(default)]
    pub connect_timeout: Option<String>,
    #[serde(default)]
    pub read_timeout: Option<String>,
    #[serde(default)]
    pub max_idle_connections: Option<usize>,
    #[serde(default)]
    pub max_idle_connections_per_host: Option<usize>,
    #[serde(default)]
    pub connection_retry_attempts: Option<u32>,
    #[serde(default)]
    pub tcp_nodelay: Option<bool>,
    #[serde(default)]
    pub proxy_host: Option<String>,
    #[serde(default)]
    pub proxy_port: Option<u16>,
    #[serde(default)]
    pub proxy_username: Option<String>,
    #[serde(default)]
    pub proxy_password: Option<String>,
}

/// `[resource.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    /// Filesystem path or HTTP(S) URL.
    pub location: String,

    /// Provider override; inferred from `location` when absent.
    #[serde(default)]
    pub kind: Option<ResourceKind>,

    #[serde(default)]
    pub poll_interval: Option<String>,

    #[serde(default)]
    pub retry_attempts: Option<u32>,

    /// `${NAME}` placeholders to replace in the content.
    #[serde(default)]
    pub replace: BTreeMap<String, String>,
}

impl ResourceConfig {
    pub fn effective_kind(&self) -> ResourceKind {
        self.kind
            .unwrap_or_else(|| ResourceKind::infer(&self.location))
    }
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub http: HttpClientConfig,
    pub resources: Vec<ResourceSpec>,
}

impl ConfigFile {
    /// Construct without validation. Prefer `ConfigFile::try_from`.
    pub fn new_unchecked(http: HttpClientConfig, resources: Vec<ResourceSpec>) -> Self {
        Self { http, resources }
    }
}

/// One fully-resolved resource to watch.
#[derive(Debug, Clone)]
pub struct ResourceSpec {
    pub name: String,
    pub location: String,
    pub kind: ResourceKind,
    pub options: WatchOptions,
    pub replace: BTreeMap<String, String>,
}

impl ResourceSpec {
    /// Ad-hoc resource for a location given on the command line.
    pub fn from_location(location: &str, options: WatchOptions) -> Self {
        Self {
            name: location.to_string(),
            location: location.to_string(),
            kind: ResourceKind::infer(location),
            options,
            replace: BTreeMap::new(),
        }
    }

    pub fn filter_chain(&self) -> FilterChain {
        let mut chain = FilterChain::new();
        if !self.replace.is_empty() {
            chain.push(PropertyReplacementFilter::new(self.replace.clone()));
        }
        chain
    }

    /// Build the resource. HTTP resources share `agent` and therefore its
    /// connection pool.
    pub fn build_resource(
        &self,
        agent: &ureq::Agent,
        http: &HttpClientConfig,
    ) -> Result<Arc<dyn Resource>> {
        let filter = self.filter_chain();
        let resource: Arc<dyn Resource> = match self.kind {
            ResourceKind::File => {
                Arc::new(FilesystemResource::new(&self.location)?.with_filter(filter))
            }
            ResourceKind::Http => Arc::new(
                HttpResource::with_agent(&self.location, agent.clone())?
                    .with_connection_retries(http.connection_retry_attempts)
                    .with_filter(filter),
            ),
        };
        Ok(resource)
    }
}
