// src/resource/http/client.rs

//! Transport configuration for `HttpResource`.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::errors::{ReswatchError, Result};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(90);
pub const DEFAULT_MAX_IDLE_CONNECTIONS: usize = 20;
pub const DEFAULT_MAX_IDLE_CONNECTIONS_PER_HOST: usize = 5;

/// Knobs for the pooled agent an `HttpResource` talks through.
///
/// Every request made with the resulting agent is bounded by
/// `connect_timeout` and `read_timeout`.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Idle connections kept in the pool across all hosts. Must be >= 1.
    pub max_idle_connections: usize,
    pub max_idle_connections_per_host: usize,
    /// Extra attempts made when a request fails at the transport level.
    /// HTTP status failures are never retried.
    pub connection_retry_attempts: u32,
    pub tcp_nodelay: bool,
    pub proxy: Option<ProxyConfig>,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            max_idle_connections: DEFAULT_MAX_IDLE_CONNECTIONS,
            max_idle_connections_per_host: DEFAULT_MAX_IDLE_CONNECTIONS_PER_HOST,
            connection_retry_attempts: 0,
            tcp_nodelay: true,
            proxy: None,
            user_agent: concat!("reswatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout.is_zero() {
            return Err(ReswatchError::InvalidArgument(
                "connect timeout must be greater than zero".to_string(),
            ));
        }
        if self.read_timeout.is_zero() {
            return Err(ReswatchError::InvalidArgument(
                "read timeout must be greater than zero".to_string(),
            ));
        }
        if self.max_idle_connections < 1 {
            return Err(ReswatchError::InvalidArgument(
                "maximum total number of connections must be greater than zero".to_string(),
            ));
        }
        if let Some(proxy) = &self.proxy {
            proxy.validate()?;
        }
        Ok(())
    }

    /// Build the pooled agent described by this config.
    pub fn build_agent(&self) -> Result<ureq::Agent> {
        self.validate()?;

        let mut builder = ureq::AgentBuilder::new()
            .timeout_connect(self.connect_timeout)
            .timeout_read(self.read_timeout)
            .max_idle_connections(self.max_idle_connections)
            .max_idle_connections_per_host(self.max_idle_connections_per_host)
            .no_delay(self.tcp_nodelay)
            .user_agent(&self.user_agent);

        if let Some(proxy) = &self.proxy {
            debug!(proxy = %proxy, "routing resource requests through proxy");
            let proxy = ureq::Proxy::new(proxy.to_url()).map_err(|e| {
                ReswatchError::InvalidArgument(format!("invalid proxy configuration: {e}"))
            })?;
            builder = builder.proxy(proxy);
        }

        Ok(builder.build())
    }
}

/// HTTP proxy settings. Credentials, when present, are sent as basic auth.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyConfig {
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Reject settings `ureq::Proxy::new` would split in the wrong place.
    ///
    /// ureq does not percent-decode proxy credentials: it takes everything
    /// after the last `@` as `host[:port]` and splits the credentials at
    /// the first `:`. So the password may hold any character, but the
    /// username cannot contain `:` and the host cannot contain `@`, `:`
    /// or `/`.
    pub fn validate(&self) -> Result<()> {
        let host = self.host.trim();
        if host.is_empty() || host.contains(['@', ':', '/']) {
            return Err(ReswatchError::InvalidArgument(format!(
                "invalid proxy host {:?}",
                self.host
            )));
        }
        if let Some(user) = &self.username {
            if user.contains(':') {
                return Err(ReswatchError::InvalidArgument(
                    "proxy username must not contain ':'".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Proxy URL in the form `ureq::Proxy::new` expects. Credentials are
    /// spliced in verbatim since ureq passes them on undecoded.
    pub fn to_url(&self) -> String {
        let mut url = String::from("http://");
        if let Some(user) = &self.username {
            url.push_str(user);
            // ureq needs the separator even when the password is empty.
            url.push(':');
            if let Some(pass) = &self.password {
                url.push_str(pass);
            }
            url.push('@');
        }
        url.push_str(&self.host);
        if let Some(port) = self.port {
            url.push(':');
            url.push_str(&port.to_string());
        }
        url
    }
}

impl fmt::Display for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => f.write_str(&self.host),
        }
    }
}

// Keeps the password out of logs.
impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
