//! Database models
//!
//! Row types for the feedback, swarm_scores and top_priorities tables.
//! Serialized with camelCase keys, which is what the HTTP API returns.

use serde::{Deserialize, Serialize};

/// One customer feedback item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub source: String,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub cluster_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// One agent's score for one feedback item (append-only history)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SwarmScore {
    pub id: i64,
    pub feedback_id: i64,
    /// Shared by the five records of one analysis run; NULL for records
    /// submitted individually
    pub run_id: Option<String>,
    pub agent_type: String,
    pub score: Option<f64>,
    pub reasoning: Option<String>,
    pub created_at: String,
}

/// Priority ranking entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopPriority {
    pub id: i64,
    pub feedback_id: i64,
    pub rank: i64,
    pub consensus_score: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// Ranking entry joined with the feedback it points at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RankedFeedback {
    pub id: i64,
    pub feedback_id: i64,
    pub rank: i64,
    pub consensus_score: f64,
    pub created_at: String,
    pub updated_at: String,
    pub feedback_title: String,
    pub feedback_description: String,
    pub feedback_source: String,
    pub feedback_customer_email: Option<String>,
    pub feedback_customer_name: Option<String>,
}
