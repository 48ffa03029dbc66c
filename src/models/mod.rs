//! Data models shared across the service.

pub mod alert;
pub mod alert_state;
pub mod channel;
pub mod match_record;

pub use alert::{ALERT_WINDOWS_MINUTES, Alert, AlertKind};
pub use alert_state::MatchAlertState;
pub use match_record::{MatchRecord, MatchStatus};
