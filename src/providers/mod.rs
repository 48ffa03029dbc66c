//! Match record sources.

pub mod rest;
pub mod traits;

pub use rest::RestMatchSource;
pub use traits::{MatchSource, MatchSourceError};
