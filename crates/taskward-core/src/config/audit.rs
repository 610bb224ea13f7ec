//! Audit logging configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default number of audit events held in memory for queries.
pub const DEFAULT_RETAINED_EVENTS: usize = 10_000;

/// Configuration for audit logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Whether audit logging is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Echo every event to stdout.
    #[serde(default = "default_true")]
    pub stdout: bool,

    /// Append events as JSON Lines to this file. Without it events are kept
    /// in memory only.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Upper bound on events returned by a single audit query.
    #[serde(default = "default_max_query_results")]
    pub max_query_results: usize,

    /// Newest events kept in memory and visible to queries. Older events
    /// drop out of memory; with `file_path` set they remain on disk.
    #[serde(default = "default_retained_events")]
    pub retained_events: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stdout: true,
            file_path: None,
            max_query_results: default_max_query_results(),
            retained_events: default_retained_events(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_query_results() -> usize {
    1000
}

fn default_retained_events() -> usize {
    DEFAULT_RETAINED_EVENTS
}
