//! Builder for `MatchRecord` test fixtures.

use chrono::{DateTime, TimeZone, Utc};

use crate::models::{MatchRecord, MatchStatus};

/// A fluent builder for match records with sensible defaults.
pub struct MatchRecordBuilder {
    record: MatchRecord,
}

impl MatchRecordBuilder {
    /// Creates a builder for a scheduled match with the given id.
    pub fn new(id: &str) -> Self {
        Self {
            record: MatchRecord {
                id: id.to_string(),
                scheduled_at: Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap(),
                opponent: "Heretics".to_string(),
                competition: "LEC".to_string(),
                team: "League of Legends".to_string(),
                status: MatchStatus::Scheduled,
                stream_url: None,
                result: String::new(),
                opponent_logo: String::new(),
            },
        }
    }

    /// Sets the scheduled start time.
    pub fn scheduled_at(mut self, scheduled_at: DateTime<Utc>) -> Self {
        self.record.scheduled_at = scheduled_at;
        self
    }

    /// Sets the opponent name.
    pub fn opponent(mut self, opponent: &str) -> Self {
        self.record.opponent = opponent.to_string();
        self
    }

    /// Sets the competition name.
    pub fn competition(mut self, competition: &str) -> Self {
        self.record.competition = competition.to_string();
        self
    }

    /// Sets the lifecycle status.
    pub fn status(mut self, status: MatchStatus) -> Self {
        self.record.status = status;
        self
    }

    /// Sets the stream URL.
    pub fn stream_url(mut self, stream_url: &str) -> Self {
        self.record.stream_url = Some(stream_url.to_string());
        self
    }

    /// Builds the record.
    pub fn build(self) -> MatchRecord {
        self.record
    }
}
