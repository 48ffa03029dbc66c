//! This module defines the `MatchRecord` document model.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a match.
///
/// Transitions happen out-of-band in the record source and are monotonic in
/// practice (scheduled → live → finished), but nothing enforces the order; a
/// record can be observed to skip `live` entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// The match has a future (or past-due) start time and has not begun.
    Scheduled,
    /// The match is currently being played.
    Live,
    /// The match is over.
    Finished,
}

impl MatchStatus {
    /// The wire representation used in document queries.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(MatchStatus::Scheduled),
            "live" => Ok(MatchStatus::Live),
            "finished" => Ok(MatchStatus::Finished),
            other => Err(format!("unknown match status '{other}'")),
        }
    }
}

/// One scheduled, live or finished competitive match, as stored in the
/// `matches` collection of the document store.
///
/// Records are created and mutated externally (by the admin tooling); this
/// service only ever reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Opaque stable identifier assigned by the record source on creation.
    pub id: String,

    /// Timestamp of the match start.
    #[serde(rename = "date")]
    pub scheduled_at: DateTime<Utc>,

    /// Name of the opposing team.
    pub opponent: String,

    /// Competition the match belongs to.
    pub competition: String,

    /// Which of the organisation's rosters is playing.
    pub team: String,

    /// Lifecycle status of the match.
    pub status: MatchStatus,

    /// Stream URL, only meaningful while the match is live.
    #[serde(rename = "streamUrl", default, skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,

    /// Free-form score/result text, filled in once the match is over.
    #[serde(default)]
    pub result: String,

    /// URL of the opponent's logo asset.
    #[serde(rename = "opponentLogo", default)]
    pub opponent_logo: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_a_full_document() {
        let document = json!({
            "id": "m-42",
            "date": "2025-06-01T18:00:00Z",
            "opponent": "Heretics",
            "competition": "LEC",
            "team": "League of Legends",
            "status": "scheduled",
            "streamUrl": "https://twitch.tv/example",
            "result": "",
            "opponentLogo": "https://cdn.example.com/heretics.png"
        });

        let record: MatchRecord = serde_json::from_value(document).unwrap();
        assert_eq!(record.id, "m-42");
        assert_eq!(record.status, MatchStatus::Scheduled);
        assert_eq!(record.stream_url.as_deref(), Some("https://twitch.tv/example"));
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let document = json!({
            "id": "m-1",
            "date": "2025-06-01T18:00:00Z",
            "opponent": "Fnatic",
            "competition": "LEC",
            "team": "League of Legends",
            "status": "live"
        });

        let record: MatchRecord = serde_json::from_value(document).unwrap();
        assert!(record.stream_url.is_none());
        assert!(record.result.is_empty());
        assert!(record.opponent_logo.is_empty());
    }

    #[test]
    fn unknown_status_fails_to_decode() {
        let document = json!({
            "id": "m-1",
            "date": "2025-06-01T18:00:00Z",
            "opponent": "Fnatic",
            "competition": "LEC",
            "team": "League of Legends",
            "status": "postponed"
        });

        assert!(serde_json::from_value::<MatchRecord>(document).is_err());
    }

    #[test]
    fn status_round_trips_through_from_str() {
        for status in [MatchStatus::Scheduled, MatchStatus::Live, MatchStatus::Finished] {
            assert_eq!(status.as_str().parse::<MatchStatus>().unwrap(), status);
        }
        assert!("cancelled".parse::<MatchStatus>().is_err());
    }
}
