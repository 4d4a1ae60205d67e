//! Priority ranking store

mod query;
mod store;

pub use query::{PriorityFilter, PrioritySort};
pub use store::{RankingStore, RecordedAnalysis, DEFAULT_TOP_LIMIT};
