// src/resource/http/mod.rs

//! HTTP(S) resources.
//!
//! Existence and modification time come from `HEAD` requests, content from
//! a `GET`. Only the small contract the watcher needs is implemented; the
//! agent handles pooling, timeouts and proxying.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::debug;

use crate::errors::{ReswatchError, Result};
use crate::resource::filter::{FilterChain, ResourceFilter};
use crate::resource::{validate_location, ByteStream, Resource};

pub mod client;
pub mod stream;

pub use client::{HttpClientConfig, ProxyConfig};
pub use stream::ReleasingReader;

use stream::ConnectionGuard;

/// A resource fetched from an HTTP(S) URL.
#[derive(Clone)]
pub struct HttpResource {
    url: String,
    agent: ureq::Agent,
    connection_retry_attempts: u32,
    filter: FilterChain,
    in_flight: Arc<AtomicUsize>,
}

impl HttpResource {
    /// Resource with a private agent built from [`HttpClientConfig::default`].
    pub fn new(url: &str) -> Result<Self> {
        Self::with_config(url, &HttpClientConfig::default())
    }

    pub fn with_config(url: &str, config: &HttpClientConfig) -> Result<Self> {
        let agent = config.build_agent()?;
        Ok(Self::with_agent(url, agent)?.with_connection_retries(config.connection_retry_attempts))
    }

    /// Resource sharing an existing agent (and so its connection pool) with
    /// other resources.
    pub fn with_agent(url: &str, agent: ureq::Agent) -> Result<Self> {
        let url = validate_location(url)?;
        Ok(Self {
            url,
            agent,
            connection_retry_attempts: 0,
            filter: FilterChain::default(),
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn with_filter(mut self, filter: FilterChain) -> Self {
        self.filter = filter;
        self
    }

    /// Extra attempts for requests that fail before any response arrives.
    pub fn with_connection_retries(mut self, attempts: u32) -> Self {
        self.connection_retry_attempts = attempts;
        self
    }

    /// Number of requests whose transport state has not been released yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Send a request, retrying transport failures. Any status is returned
    /// as a response so callers decide what it means.
    fn call(&self, method: &str) -> Result<ureq::Response> {
        let mut attempt = 0;
        loop {
            let mut request = self.agent.request(method, &self.url);
            if method == "HEAD" {
                request = request.set("Connection", "close");
            }

            match request.call() {
                Ok(response) => return Ok(response),
                Err(ureq::Error::Status(_, response)) => return Ok(response),
                Err(ureq::Error::Transport(err)) => {
                    if attempt < self.connection_retry_attempts {
                        attempt += 1;
                        debug!(
                            location = %self.url,
                            attempt,
                            error = %err,
                            "transport failure; retrying request"
                        );
                        continue;
                    }
                    return Err(ReswatchError::access(
                        &self.url,
                        format!("unable to contact resource URL: {err}"),
                    ));
                }
            }
        }
    }

    fn head(&self) -> Result<ureq::Response> {
        let _guard = ConnectionGuard::acquire(&self.in_flight);
        self.call("HEAD")
    }
}

// Anything but 200, including other 2xx codes, is an error.
fn is_success(status: u16) -> bool {
    status == 200
}

impl Resource for HttpResource {
    fn location(&self) -> &str {
        &self.url
    }

    fn exists(&self) -> Result<bool> {
        let response = self.head()?;
        match response.status() {
            status if is_success(status) => Ok(true),
            404 | 410 => Ok(false),
            status => Err(ReswatchError::status(&self.url, status)),
        }
    }

    fn last_modified(&self) -> Result<DateTime<Utc>> {
        let response = self.head()?;
        let status = response.status();
        if !is_success(status) {
            return Err(ReswatchError::status(&self.url, status));
        }

        match response.header("Last-Modified").map(str::trim) {
            Some(value) if !value.is_empty() => parse_http_date(value).ok_or_else(|| {
                ReswatchError::access(
                    &self.url,
                    format!("unable to parse last modified date {value:?}"),
                )
            }),
            _ => Ok(Utc::now()),
        }
    }

    fn read(&self) -> Result<ByteStream> {
        let guard = ConnectionGuard::acquire(&self.in_flight);
        let response = self.call("GET")?;
        let status = response.status();
        if !is_success(status) {
            return Err(ReswatchError::status(&self.url, status));
        }

        let body = ReleasingReader::new(response.into_reader(), guard, self.url.clone());
        self.filter.apply(Box::new(body)).map_err(|e| match e {
            // The body failed mid-transfer, not the filter.
            ReswatchError::IoError(io) => ReswatchError::access(&self.url, io),
            other => other,
        })
    }
}

/// Parse an HTTP date in any of the three formats RFC 9110 requires
/// recipients to accept.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }
    // RFC 850, e.g. "Sunday, 06-Nov-94 08:49:37 GMT"
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%A, %d-%b-%y %H:%M:%S GMT") {
        return Some(naive.and_utc());
    }
    // asctime, e.g. "Sun Nov  6 08:49:37 1994"
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%a %b %e %H:%M:%S %Y") {
        return Some(naive.and_utc());
    }
    None
}

impl PartialEq for HttpResource {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for HttpResource {}

impl Hash for HttpResource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

impl fmt::Display for HttpResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl fmt::Debug for HttpResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResource")
            .field("url", &self.url)
            .field("filters", &self.filter.len())
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}
