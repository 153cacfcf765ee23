// src/config/validate.rs

use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{
    ConfigFile, ConfigSection, HttpSection, RawConfigFile, ResourceConfig, ResourceSpec,
};
use crate::errors::{ReswatchError, Result};
use crate::resource::{HttpClientConfig, ProxyConfig};
use crate::types::PollFailureMode;
use crate::watch::{PollFailurePolicy, WatchOptions};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::ReswatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_resources(&raw)?;
        let defaults = validate_global_config(&raw.config)?;
        let http = validate_http(&raw.http)?;

        let resources = raw
            .resource
            .iter()
            .map(|(name, res)| validate_resource(name, res, &defaults))
            .collect::<Result<Vec<_>>>()?;

        Ok(ConfigFile::new_unchecked(http, resources))
    }
}

fn config_error(msg: impl Into<String>) -> ReswatchError {
    ReswatchError::ConfigError(msg.into())
}

fn ensure_has_resources(cfg: &RawConfigFile) -> Result<()> {
    if cfg.resource.is_empty() {
        return Err(config_error(
            "config must contain at least one [resource.<name>] section",
        ));
    }
    Ok(())
}

fn positive_duration(field: &str, value: &str) -> Result<Duration> {
    let duration = parse_duration(value).map_err(|e| config_error(format!("{field}: {e}")))?;
    if duration.is_zero() {
        return Err(config_error(format!("{field} must be greater than zero (got {value:?})")));
    }
    Ok(duration)
}

fn validate_global_config(cfg: &ConfigSection) -> Result<WatchOptions> {
    let poll_interval = positive_duration("[config].poll_interval", &cfg.poll_interval)?;

    let failure_policy = match cfg.poll_failure {
        PollFailureMode::Tolerate => PollFailurePolicy::Tolerate,
        PollFailureMode::Backoff => PollFailurePolicy::Backoff {
            max_interval: positive_duration("[config].max_backoff", &cfg.max_backoff)?,
        },
    };

    Ok(WatchOptions {
        poll_interval,
        retry_attempts: cfg.retry_attempts,
        failure_policy,
    })
}

fn validate_http(section: &HttpSection) -> Result<HttpClientConfig> {
    let mut http = HttpClientConfig::default();

    if let Some(ref s) = section.connect_timeout {
        http.connect_timeout = positive_duration("[http].connect_timeout", s)?;
    }
    if let Some(ref s) = section.read_timeout {
        http.read_timeout = positive_duration("[http].read_timeout", s)?;
    }
    if let Some(max) = section.max_idle_connections {
        if max == 0 {
            return Err(config_error("[http].max_idle_connections must be >= 1 (got 0)"));
        }
        http.max_idle_connections = max;
    }
    if let Some(max) = section.max_idle_connections_per_host {
        http.max_idle_connections_per_host = max;
    }
    if let Some(n) = section.connection_retry_attempts {
        http.connection_retry_attempts = n;
    }
    if let Some(nodelay) = section.tcp_nodelay {
        http.tcp_nodelay = nodelay;
    }

    http.proxy = validate_proxy(section)?;
    Ok(http)
}

fn validate_proxy(section: &HttpSection) -> Result<Option<ProxyConfig>> {
    let host = section
        .proxy_host
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty());

    let Some(host) = host else {
        if section.proxy_port.is_some() || section.proxy_username.is_some() {
            return Err(config_error(
                "[http].proxy_port and proxy_username require proxy_host",
            ));
        }
        return Ok(None);
    };

    let mut proxy = ProxyConfig::new(host, section.proxy_port);
    if let Some(ref user) = section.proxy_username {
        proxy = proxy.with_credentials(
            user.trim(),
            section.proxy_password.as_deref().unwrap_or_default(),
        );
    }
    proxy
        .validate()
        .map_err(|e| config_error(format!("[http] proxy settings: {e}")))?;
    Ok(Some(proxy))
}

fn validate_resource(
    name: &str,
    res: &ResourceConfig,
    defaults: &WatchOptions,
) -> Result<ResourceSpec> {
    let location = res.location.trim();
    if location.is_empty() {
        return Err(config_error(format!(
            "resource '{}' has an empty `location`",
            name
        )));
    }

    let mut options = *defaults;
    if let Some(ref s) = res.poll_interval {
        options.poll_interval =
            positive_duration(&format!("[resource.{name}].poll_interval"), s)?;
    }
    if let Some(n) = res.retry_attempts {
        options.retry_attempts = n;
    }

    if let PollFailurePolicy::Backoff { max_interval } = options.failure_policy {
        if max_interval < options.poll_interval {
            return Err(config_error(format!(
                "resource '{}': [config].max_backoff ({:?}) is shorter than its poll_interval ({:?})",
                name, max_interval, options.poll_interval
            )));
        }
    }

    Ok(ResourceSpec {
        name: name.to_string(),
        location: location.to_string(),
        kind: res.effective_kind(),
        options,
        replace: res.replace.clone(),
    })
}
