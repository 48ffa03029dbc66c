//! The notification timing evaluator.
//!
//! Pure logic: given the current time, a snapshot of match records and the
//! ledger of alerts that already fired, decide which alerts are due. The
//! ledger is the only thing mutated here; fetching records and delivering
//! alerts belong to the caller.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::models::{ALERT_WINDOWS_MINUTES, Alert, MatchAlertState, MatchRecord, MatchStatus};

/// The outcome of one evaluation pass.
#[derive(Debug, Default)]
pub struct Evaluation {
    /// Alerts that became due on this pass, in input-record order.
    pub alerts: Vec<Alert>,

    /// Ids of finished matches whose ledger entries were cleared, so a
    /// persisted ledger can drop the corresponding rows.
    pub cleared: Vec<String>,
}

/// In-memory view of which alerts have fired, keyed by match id.
///
/// Hydrated from the persistent store at startup and written back after
/// each cycle; entries touched since the last drain are tracked as dirty.
#[derive(Debug, Default)]
pub struct AlertLedger {
    states: HashMap<String, MatchAlertState>,
    dirty: BTreeSet<String>,
}

impl AlertLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from previously persisted entries.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, MatchAlertState)>) -> Self {
        Self { states: entries.into_iter().collect(), dirty: BTreeSet::new() }
    }

    /// Number of matches with recorded alert state.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True when no match has recorded alert state.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Marks the window alert for a match; returns true if it was not
    /// already marked.
    fn mark_window(&mut self, match_id: &str, window_minutes: i64) -> bool {
        let state = self.states.entry(match_id.to_string()).or_default();
        let newly_marked = state.windows.insert(window_minutes);
        if newly_marked {
            self.dirty.insert(match_id.to_string());
        }
        newly_marked
    }

    /// Marks the late-start alert for a match; returns true if it was not
    /// already marked.
    fn mark_late(&mut self, match_id: &str) -> bool {
        let state = self.states.entry(match_id.to_string()).or_default();
        if state.late {
            return false;
        }
        state.late = true;
        self.dirty.insert(match_id.to_string());
        true
    }

    /// Marks the live alert for a match; returns true if it was not already
    /// marked.
    fn mark_live(&mut self, match_id: &str) -> bool {
        let state = self.states.entry(match_id.to_string()).or_default();
        if state.live {
            return false;
        }
        state.live = true;
        self.dirty.insert(match_id.to_string());
        true
    }

    /// Drops all alert state for a match; returns true if anything was
    /// recorded. A match observed again under the same id afterwards is a
    /// fresh match.
    fn clear(&mut self, match_id: &str) -> bool {
        self.dirty.remove(match_id);
        self.states.remove(match_id).is_some()
    }

    /// Takes the entries touched since the last drain, for persistence.
    pub fn drain_dirty(&mut self) -> Vec<(String, MatchAlertState)> {
        let dirty = std::mem::take(&mut self.dirty);
        dirty
            .into_iter()
            .filter_map(|id| self.states.get(&id).map(|state| (id, state.clone())))
            .collect()
    }
}

/// Decides which alerts are due for the given snapshot of match records.
///
/// For scheduled matches the lead-time windows are considered
/// largest-to-smallest, and only the smallest window containing the
/// remaining time fires; windows skipped over between two passes never fire
/// later. Deltas compare by integer minute truncation of the millisecond
/// difference, so 59m59s is inside the 60-minute window and outside the
/// 30-minute one.
pub fn evaluate(
    now: DateTime<Utc>,
    records: &[MatchRecord],
    ledger: &mut AlertLedger,
    team_name: &str,
) -> Evaluation {
    let mut evaluation = Evaluation::default();

    for record in records {
        match record.status {
            MatchStatus::Scheduled => {
                let delta_ms = (record.scheduled_at - now).num_milliseconds();
                if delta_ms <= 0 {
                    // Past its start time but still marked scheduled.
                    if ledger.mark_late(&record.id) {
                        tracing::debug!(match_id = %record.id, "Match start is overdue.");
                        evaluation.alerts.push(Alert::late(record, team_name));
                    }
                } else if let Some(window_minutes) = smallest_matching_window(delta_ms / 60_000) {
                    if ledger.mark_window(&record.id, window_minutes) {
                        tracing::debug!(
                            match_id = %record.id,
                            window_minutes,
                            "Match entered a reminder window."
                        );
                        evaluation.alerts.push(Alert::upcoming(record, window_minutes, team_name));
                    }
                }
            }
            MatchStatus::Live => {
                if ledger.mark_live(&record.id) {
                    tracing::debug!(match_id = %record.id, "Match went live.");
                    evaluation.alerts.push(Alert::live(record, team_name));
                }
            }
            MatchStatus::Finished => {
                if ledger.clear(&record.id) {
                    evaluation.cleared.push(record.id.clone());
                }
            }
        }
    }

    evaluation
}

/// The smallest lead-time window containing the remaining minutes, if any.
fn smallest_matching_window(delta_minutes: i64) -> Option<i64> {
    ALERT_WINDOWS_MINUTES.iter().copied().filter(|window| delta_minutes <= *window).min()
}
