#![allow(dead_code)]

use std::collections::BTreeMap;
use reswatch::config::{ConfigFile, ConfigSection, HttpSection, RawConfigFile, ResourceConfig};
use reswatch::errors::Result;
use reswatch::types::{PollFailureMode, ResourceKind};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                http: HttpSection::default(),
                resource: BTreeMap::new(),
            },
        }
    }

    pub fn with_resource(mut self, name: &str, resource: ResourceConfig) -> Self {
        self.config.resource.insert(name.to_string(), resource);
        self
    }

    pub fn with_poll_interval(mut self, interval: &str) -> Self {
        self.config.config.poll_interval = interval.to_string();
        self
    }

    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.config.config.retry_attempts = attempts;
        self
    }

    pub fn with_backoff(mut self, max: &str) -> Self {
        self.config.config.poll_failure = PollFailureMode::Backoff;
        self.config.config.max_backoff = max.to_string();
        self
    }

    pub fn with_http(mut self, http: HttpSection) -> Self {
        self.config.http = http;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ResourceConfig`.
pub struct ResourceConfigBuilder {
    resource: ResourceConfig,
}

impl ResourceConfigBuilder {
    pub fn new(location: &str) -> Self {
        Self {
            resource: ResourceConfig {
                location: location.to_string(),
                kind: None,
                poll_interval: None,
                retry_attempts: None,
                replace: BTreeMap::new(),
            },
        }
    }

    pub fn kind(mut self, kind: ResourceKind) -> Self {
        self.resource.kind = Some(kind);
        self
    }

    pub fn poll_interval(mut self, interval: &str) -> Self {
        self.resource.poll_interval = Some(interval.to_string());
        self
    }

    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.resource.retry_attempts = Some(attempts);
        self
    }

    pub fn replace(mut self, name: &str, value: &str) -> Self {
        self.resource
            .replace
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> ResourceConfig {
        self.resource
    }
}
