//! The evaluation engine: pure alert-timing logic and the periodic monitor
//! that drives it.

pub mod evaluator;
pub mod monitor;

pub use evaluator::{AlertLedger, Evaluation, evaluate};
pub use monitor::{MatchMonitor, MatchMonitorError};
