use std::str::FromStr;
use serde::Deserialize;

/// How the polling loop reacts to ticks whose resource calls failed.
///
/// - `Tolerate`: keep the fixed schedule (default).
/// - `Backoff`: double the delay after each consecutive failure, up to
///   `[config].max_backoff`, and return to the base interval on success.
///
/// Neither mode ever stops the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollFailureMode {
    Tolerate,
    Backoff,
}

impl Default for PollFailureMode {
    fn default() -> Self {
        PollFailureMode::Tolerate
    }
}

impl FromStr for PollFailureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tolerate" => Ok(PollFailureMode::Tolerate),
            "backoff" => Ok(PollFailureMode::Backoff),
            other => Err(format!(
                "invalid poll_failure: {other} (expected \"tolerate\" or \"backoff\")"
            )),
        }
    }
}

/// Which provider backs a configured resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A path on the local filesystem.
    File,
    /// An `http://` or `https://` URL.
    Http,
}

impl ResourceKind {
    /// Infer the provider from a location string: URLs with an HTTP(S)
    /// scheme are `Http`, everything else is treated as a path.
    pub fn infer(location: &str) -> Self {
        let lower = location.trim().to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            ResourceKind::Http
        } else {
            ResourceKind::File
        }
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(ResourceKind::File),
            "http" | "https" => Ok(ResourceKind::Http),
            other => Err(format!(
                "invalid resource kind: {other} (expected \"file\" or \"http\")"
            )),
        }
    }
}
