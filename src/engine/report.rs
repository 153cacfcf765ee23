// src/engine/report.rs

//! Tab-separated lines written to stdout.

use chrono::SecondsFormat;

use crate::watch::{ResourceChange, ResourceState};

/// `<kind>\t<location>\t<last-modified or ->`
pub fn format_change(change: &ResourceChange) -> String {
    format!(
        "{}\t{}\t{}",
        change.kind,
        change.location,
        format_timestamp(&change.state)
    )
}

/// `<name>\t<location>\t<present|absent>\t<last-modified or ->`
pub fn format_state(name: &str, location: &str, state: &ResourceState) -> String {
    let presence = if state.exists { "present" } else { "absent" };
    format!(
        "{}\t{}\t{}\t{}",
        name,
        location,
        presence,
        format_timestamp(state)
    )
}

fn format_timestamp(state: &ResourceState) -> String {
    state
        .last_modified
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "-".to_string())
}
