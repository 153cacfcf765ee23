// src/resource/http/stream.rs

//! Scoped ownership of one in-flight HTTP request.

use std::io::{self, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::trace;

/// Counts one in-flight request for as long as it is alive.
///
/// Acquired before the request is sent; dropping it is the release.
#[derive(Debug)]
pub(crate) struct ConnectionGuard {
    in_flight: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    pub(crate) fn acquire(in_flight: &Arc<AtomicUsize>) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        Self {
            in_flight: Arc::clone(in_flight),
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Response body that releases its request when dropped or read to the end,
/// whichever happens first. The release happens exactly once.
pub struct ReleasingReader {
    inner: Box<dyn Read + Send + Sync>,
    guard: Option<ConnectionGuard>,
    location: String,
}

impl ReleasingReader {
    pub(crate) fn new(
        inner: Box<dyn Read + Send + Sync>,
        guard: ConnectionGuard,
        location: String,
    ) -> Self {
        Self {
            inner,
            guard: Some(guard),
            location,
        }
    }

    fn release(&mut self) {
        if self.guard.take().is_some() {
            trace!(location = %self.location, "released http request");
        }
    }
}

impl Read for ReleasingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.guard.is_none() {
            return Ok(0);
        }
        let n = self.inner.read(buf)?;
        if n == 0 && !buf.is_empty() {
            self.release();
        }
        Ok(n)
    }
}

impl Drop for ReleasingReader {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ReleasingReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleasingReader")
            .field("location", &self.location)
            .field("released", &self.guard.is_none())
            .finish_non_exhaustive()
    }
}
