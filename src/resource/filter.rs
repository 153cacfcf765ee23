// src/resource/filter.rs

//! Content filters applied to a resource stream before it reaches the caller.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::io::{Cursor, Read};
use std::sync::Arc;

use tracing::debug;

use crate::errors::{ReswatchError, Result};
use crate::resource::ByteStream;

/// A transform from one byte stream to another.
///
/// Filters hold no per-invocation state, so one instance can be shared by
/// many resources and many reads.
pub trait ResourceFilter: Send + Sync + Debug {
    fn apply(&self, input: ByteStream) -> Result<ByteStream>;
}

/// Ordered composition of filters. The first filter added sees the raw
/// content; each later one sees the output of the previous.
///
/// An empty chain passes the stream through untouched.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    filters: Vec<Arc<dyn ResourceFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: impl ResourceFilter + 'static) -> Self {
        self.push(filter);
        self
    }

    pub fn push(&mut self, filter: impl ResourceFilter + 'static) {
        self.filters.push(Arc::new(filter));
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl ResourceFilter for FilterChain {
    fn apply(&self, input: ByteStream) -> Result<ByteStream> {
        self.filters
            .iter()
            .try_fold(input, |stream, filter| filter.apply(stream))
    }
}

/// Replaces `${name}` placeholders with configured values.
///
/// Placeholders without a configured value are left as they are. The whole
/// input is buffered, so the source stream is fully consumed (and released)
/// before the filtered stream is returned. A failure reading the source is
/// passed through as [`ReswatchError::IoError`]; only content the filter
/// cannot handle is a [`ReswatchError::Filter`].
#[derive(Debug, Clone, Default)]
pub struct PropertyReplacementFilter {
    properties: BTreeMap<String, String>,
}

impl PropertyReplacementFilter {
    pub fn new(properties: BTreeMap<String, String>) -> Self {
        Self { properties }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}

impl ResourceFilter for PropertyReplacementFilter {
    fn apply(&self, mut input: ByteStream) -> Result<ByteStream> {
        let mut raw = Vec::new();
        input.read_to_end(&mut raw)?;
        drop(input);

        let mut text = String::from_utf8(raw).map_err(|e| {
            ReswatchError::Filter(format!("content is not valid UTF-8: {e}"))
        })?;

        for (name, value) in &self.properties {
            let placeholder = format!("${{{name}}}");
            if text.contains(&placeholder) {
                debug!(property = %name, "replacing property placeholder");
                text = text.replace(&placeholder, value);
            }
        }

        Ok(Box::new(Cursor::new(text.into_bytes())))
    }
}
