// src/resource/filesystem.rs

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::errors::{ReswatchError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::resource::filter::{FilterChain, ResourceFilter};
use crate::resource::{validate_location, ByteStream, Resource};

/// A resource backed by a path on a [`FileSystem`].
///
/// Relative paths are made absolute against the current directory at
/// construction; the absolute path is the resource location.
#[derive(Debug, Clone)]
pub struct FilesystemResource {
    location: String,
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    filter: FilterChain,
}

impl FilesystemResource {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_fs(path, Arc::new(RealFileSystem))
    }

    pub fn with_fs(path: impl AsRef<Path>, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let raw = validate_location(&path.as_ref().to_string_lossy())?;
        let path = std::path::absolute(&raw).map_err(|e| {
            ReswatchError::InvalidArgument(format!("cannot resolve path {raw:?}: {e}"))
        })?;

        Ok(Self {
            location: path.to_string_lossy().into_owned(),
            path,
            fs,
            filter: FilterChain::default(),
        })
    }

    pub fn with_filter(mut self, filter: FilterChain) -> Self {
        self.filter = filter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn access_error(&self, err: anyhow::Error) -> ReswatchError {
        ReswatchError::access(&self.location, format!("{err:#}"))
    }
}

impl Resource for FilesystemResource {
    fn location(&self) -> &str {
        &self.location
    }

    fn exists(&self) -> Result<bool> {
        self.fs.exists(&self.path).map_err(|e| self.access_error(e))
    }

    fn last_modified(&self) -> Result<DateTime<Utc>> {
        let modified = self.fs.modified(&self.path).map_err(|e| self.access_error(e))?;
        Ok(DateTime::<Utc>::from(modified))
    }

    fn read(&self) -> Result<ByteStream> {
        let raw = self.fs.open_read(&self.path).map_err(|e| self.access_error(e))?;
        self.filter.apply(raw).map_err(|e| match e {
            ReswatchError::IoError(io) => ReswatchError::access(&self.location, io),
            other => other,
        })
    }
}

impl PartialEq for FilesystemResource {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location
    }
}

impl Eq for FilesystemResource {}

impl Hash for FilesystemResource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.location.hash(state);
    }
}

impl fmt::Display for FilesystemResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location)
    }
}
