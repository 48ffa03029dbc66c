//! A set of helpers for testing

mod channel;
mod match_record;

pub use channel::ChannelBuilder;
pub use match_record::MatchRecordBuilder;
