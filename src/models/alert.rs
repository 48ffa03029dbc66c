//! This module defines the alert descriptors produced by the timing
//! evaluator.

use serde::{Deserialize, Serialize};

use crate::models::match_record::MatchRecord;

/// Lead times, in minutes before the scheduled start, at which a reminder is
/// due. Evaluated largest-to-smallest; only the smallest matching window
/// fires.
pub const ALERT_WINDOWS_MINUTES: [i64; 3] = [60, 30, 10];

/// The kind of alert that is due for a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertKind {
    /// A reminder that the match starts within one of the lead-time windows.
    Upcoming {
        /// Which window fired, in minutes before the scheduled start.
        window_minutes: i64,
    },
    /// The match has gone live.
    Live,
    /// The match should have started but is still marked scheduled.
    Late,
}

impl AlertKind {
    /// Suffix used to derive the deduplication key for this kind.
    fn key_suffix(&self) -> String {
        match self {
            AlertKind::Upcoming { window_minutes } => window_minutes.to_string(),
            AlertKind::Live => "live".to_string(),
            AlertKind::Late => "late".to_string(),
        }
    }
}

/// A fully rendered alert, ready for a channel to deliver.
///
/// Producing one of these has no side effect on the record source; the only
/// state touched is the evaluator's own ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// What triggered the alert.
    #[serde(flatten)]
    pub kind: AlertKind,

    /// Identifier of the match the alert is about.
    pub match_id: String,

    /// Rendered notification title.
    pub title: String,

    /// Rendered notification body.
    pub body: String,

    /// Integer key channels use to deduplicate presented notifications.
    pub dedupe_key: u32,
}

impl Alert {
    /// Builds an upcoming-match reminder for the given window.
    pub fn upcoming(record: &MatchRecord, window_minutes: i64, team_name: &str) -> Self {
        let label = window_label(window_minutes);
        Self::render(
            AlertKind::Upcoming { window_minutes },
            record,
            "Upcoming match".to_string(),
            format!(
                "{team_name} vs {} starts in {label}. Competition: {}",
                record.opponent, record.competition
            ),
        )
    }

    /// Builds the one-shot alert for a match that has gone live.
    pub fn live(record: &MatchRecord, team_name: &str) -> Self {
        let mut body = format!(
            "{team_name} vs {} has started in the {}.",
            record.opponent, record.competition
        );
        if let Some(stream_url) = &record.stream_url {
            body.push_str(&format!(" Watch: {stream_url}"));
        }
        Self::render(AlertKind::Live, record, "Match live!".to_string(), body)
    }

    /// Builds the one-shot alert for a match that is past its start time but
    /// still marked scheduled.
    pub fn late(record: &MatchRecord, team_name: &str) -> Self {
        Self::render(
            AlertKind::Late,
            record,
            "Match start overdue".to_string(),
            format!(
                "{team_name} vs {} was scheduled to start already. Competition: {}",
                record.opponent, record.competition
            ),
        )
    }

    fn render(kind: AlertKind, record: &MatchRecord, title: String, body: String) -> Self {
        let dedupe_key = dedupe_key(&format!("{}:{}", record.id, kind.key_suffix()));
        Self { kind, match_id: record.id.clone(), title, body, dedupe_key }
    }

    /// The string form of this alert's deduplication key,
    /// `"{match_id}:{window|live|late}"`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.match_id, self.kind.key_suffix())
    }
}

/// Human-readable label for a lead-time window.
pub fn window_label(window_minutes: i64) -> String {
    match window_minutes {
        60 => "1 hour".to_string(),
        minutes => format!("{minutes} minutes"),
    }
}

/// Derives a stable non-negative integer from an alert key string.
///
/// Stable across process restarts so the presentation layer can collapse a
/// re-delivered alert onto the one already shown.
fn dedupe_key(seed: &str) -> u32 {
    seed.bytes().fold(0i32, |hash, byte| hash.wrapping_mul(31).wrapping_add(byte as i32)).unsigned_abs()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::match_record::MatchStatus;

    fn record(id: &str) -> MatchRecord {
        MatchRecord {
            id: id.to_string(),
            scheduled_at: Utc::now(),
            opponent: "Heretics".to_string(),
            competition: "LEC".to_string(),
            team: "League of Legends".to_string(),
            status: MatchStatus::Scheduled,
            stream_url: None,
            result: String::new(),
            opponent_logo: String::new(),
        }
    }

    #[test]
    fn upcoming_alert_carries_window_and_label() {
        let alert = Alert::upcoming(&record("m-1"), 60, "KOI");
        assert_eq!(alert.kind, AlertKind::Upcoming { window_minutes: 60 });
        assert_eq!(alert.key(), "m-1:60");
        assert_eq!(alert.title, "Upcoming match");
        assert!(alert.body.contains("KOI vs Heretics"));
        assert!(alert.body.contains("1 hour"));
        assert!(alert.body.contains("LEC"));
    }

    #[test]
    fn live_alert_includes_stream_url_when_present() {
        let mut live_record = record("m-2");
        live_record.status = MatchStatus::Live;
        live_record.stream_url = Some("https://twitch.tv/example".to_string());

        let alert = Alert::live(&live_record, "KOI");
        assert_eq!(alert.key(), "m-2:live");
        assert!(alert.body.contains("https://twitch.tv/example"));
    }

    #[test]
    fn late_alert_uses_its_own_key() {
        let alert = Alert::late(&record("m-3"), "KOI");
        assert_eq!(alert.kind, AlertKind::Late);
        assert_eq!(alert.key(), "m-3:late");
    }

    #[test]
    fn dedupe_keys_are_stable_and_distinct_per_window() {
        let sixty = Alert::upcoming(&record("m-1"), 60, "KOI");
        let thirty = Alert::upcoming(&record("m-1"), 30, "KOI");
        assert_ne!(sixty.dedupe_key, thirty.dedupe_key);
        assert_eq!(sixty.dedupe_key, Alert::upcoming(&record("m-1"), 60, "KOI").dedupe_key);
    }

    #[test]
    fn window_labels() {
        assert_eq!(window_label(60), "1 hour");
        assert_eq!(window_label(30), "30 minutes");
        assert_eq!(window_label(10), "10 minutes");
    }
}
