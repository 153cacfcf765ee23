// src/watch/probe.rs

//! Blocking calls into a resource: the construction-time probe and the
//! per-tick observation.

use tracing::{debug, warn};

use crate::errors::Result;
use crate::resource::Resource;
use crate::watch::state::ResourceState;

/// Observe a resource once. Any failure fails the whole observation.
pub fn observe(resource: &dyn Resource) -> Result<ResourceState> {
    if !resource.exists()? {
        return Ok(ResourceState::absent());
    }
    let last_modified = resource.last_modified()?;
    Ok(ResourceState::present(last_modified))
}

/// Establish initial reachability.
///
/// Makes up to `retry_attempts + 1` existence checks, back to back. Only
/// access errors are retried. Once existence is known, the modification
/// time is read best effort: if that fails the resource is recorded as
/// present with an unknown age.
pub fn probe(resource: &dyn Resource, retry_attempts: u32) -> Result<ResourceState> {
    let location = resource.location();
    let mut remaining = retry_attempts;
    let mut attempt: u64 = 0;

    loop {
        attempt += 1;
        match resource.exists() {
            Ok(false) => {
                debug!(%location, attempt, "initial probe: resource absent");
                return Ok(ResourceState::absent());
            }
            Ok(true) => {
                debug!(%location, attempt, "initial probe: resource present");
                return match resource.last_modified() {
                    Ok(time) => Ok(ResourceState::present(time)),
                    Err(err) => {
                        warn!(
                            %location,
                            error = %err,
                            "could not read modification time; treating resource as of unknown age"
                        );
                        Ok(ResourceState::present_unknown_age())
                    }
                };
            }
            Err(err) if err.is_access() && remaining > 0 => {
                remaining -= 1;
                warn!(
                    %location,
                    attempt,
                    remaining,
                    error = %err,
                    "initial probe failed; retrying"
                );
            }
            Err(err) => {
                warn!(
                    %location,
                    attempts = attempt,
                    error = %err,
                    "initial probe failed; giving up"
                );
                return Err(err);
            }
        }
    }
}
