#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use reswatch::resource::Resource;

pub use reswatch_test_utils::init_tracing;

/// A fixed point in time, `secs` seconds after a 2024 epoch.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(secs)
}

/// Coerce a shared test resource into the trait object the watcher takes,
/// keeping the original handle for scripting.
pub fn shared<R: Resource + 'static>(resource: &Arc<R>) -> Arc<dyn Resource> {
    Arc::clone(resource) as Arc<dyn Resource>
}
