//! Database access layer for fbswarm-sa
//!
//! Thin query functions over the shared schema created by
//! `fbswarm_common::db::init_database`. Ranking writes live in
//! [`crate::ranking`] because they must be atomic with the score appends.

pub mod feedback;
pub mod scores;

pub use feedback::{create_feedback, feedback_exists, get_feedback, NewFeedback};
pub use scores::{
    append_score, get_score, group_by_agent, list_scores, scores_for_run, NewScore, ScoreFilter,
    ScoreSort,
};
