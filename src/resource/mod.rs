// src/resource/mod.rs

//! Addressable artifacts that can be probed, timestamped and read.
//!
//! A [`Resource`] is the only thing the watcher knows about. Providers:
//! - [`FilesystemResource`]: a path, resolved through a [`FileSystem`].
//! - [`HttpResource`]: an HTTP(S) URL, reached through a pooled `ureq` agent.
//!
//! Both apply a [`FilterChain`] to their content before handing it out.
//!
//! [`FileSystem`]: crate::fs::FileSystem

use std::fmt::Debug;
use std::io::Read;

use chrono::{DateTime, Utc};

use crate::errors::{ReswatchError, Result};

pub mod filesystem;
pub mod filter;
pub mod http;

pub use filesystem::FilesystemResource;
pub use filter::{FilterChain, PropertyReplacementFilter, ResourceFilter};
pub use http::{HttpClientConfig, HttpResource, ProxyConfig};

/// Readable resource content. Dropping it releases whatever transport state
/// backs it.
pub type ByteStream = Box<dyn Read + Send>;

/// Capability every watchable artifact provides.
///
/// `exists` and `last_modified` distinguish "determined absent" (`Ok(false)`)
/// from "could not determine" (`Err(ReswatchError::ResourceAccess { .. })`).
/// Implementations must bound every call with a timeout.
pub trait Resource: Send + Sync + Debug {
    /// Stable, non-blank identity used for equality, hashing and logs.
    fn location(&self) -> &str;

    fn exists(&self) -> Result<bool>;

    /// Modification time of the artifact. Providers without modification
    /// metadata return the current time.
    fn last_modified(&self) -> Result<DateTime<Utc>>;

    /// Open the content, with the configured filters applied.
    fn read(&self) -> Result<ByteStream>;
}

/// Trim a location and reject blank ones.
pub(crate) fn validate_location(location: &str) -> Result<String> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err(ReswatchError::InvalidArgument(
            "resource location may not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
