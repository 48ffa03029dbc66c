//! Persisted per-match alert deduplication state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Which alerts have already fired for one match.
///
/// Stored as a JSON state object keyed by match id, so deduplication
/// survives a process restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchAlertState {
    /// Lead-time windows (in minutes) whose reminder has fired.
    #[serde(default)]
    pub windows: BTreeSet<i64>,

    /// Whether the late-start alert has fired.
    #[serde(default)]
    pub late: bool,

    /// Whether the live alert has fired.
    #[serde(default)]
    pub live: bool,
}

impl MatchAlertState {
    /// True when no alert has fired for the match yet.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty() && !self.late && !self.live
    }
}
