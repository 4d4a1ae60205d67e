//! Persistent priority ranking
//!
//! Each feedback item gets at most one ranking entry. Ranks are unique,
//! positive and allocated as `max(rank) + 1`; they are never compacted, so
//! gaps are possible once entries are removed by other tooling.

use fbswarm_common::config::RescorePolicy;
use fbswarm_common::db::{RankedFeedback, TopPriority};
use fbswarm_common::time::timestamp;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use super::query::{PriorityFilter, RANKED_SELECT};
use crate::db::scores::{append_score, NewScore};
use crate::error::SwarmError;
use crate::swarm::{consensus_score, AgentScore};

/// `top` when the caller does not give one
pub const DEFAULT_TOP_LIMIT: i64 = 10;

/// Outcome of persisting one swarm run
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedAnalysis {
    /// Shared by the five score records of this run
    pub run_id: String,
    pub feedback_id: i64,
    pub scores: Vec<AgentScore>,
    /// Consensus of this run, even when the stored entry keeps an older one
    pub consensus_score: f64,
    /// Ranking entry after the run
    pub entry: TopPriority,
    /// True when this run created the entry
    pub newly_ranked: bool,
}

/// Ranking persistence over the shared pool
#[derive(Debug, Clone)]
pub struct RankingStore {
    db: SqlitePool,
    policy: RescorePolicy,
    max_top_limit: i64,
}

impl RankingStore {
    pub fn new(db: SqlitePool, policy: RescorePolicy, max_top_limit: i64) -> Self {
        Self {
            db,
            policy,
            max_top_limit: max_top_limit.max(1),
        }
    }

    pub fn policy(&self) -> RescorePolicy {
        self.policy
    }

    pub fn max_top_limit(&self) -> i64 {
        self.max_top_limit
    }

    /// Append a run's five scores and rank the feedback item if it is new
    ///
    /// Consensus is computed before anything is written, so an incomplete
    /// swarm never touches the database. An unknown `feedback_id` fails with
    /// [`SwarmError::FeedbackNotFound`] and the transaction is rolled back. Score appends, the rank allocation
    /// and the entry read-back share one transaction.
    pub async fn record_analysis(
        &self,
        feedback_id: i64,
        scores: &[AgentScore],
    ) -> Result<RecordedAnalysis, SwarmError> {
        let consensus = consensus_score(scores)?;
        let run_id = Uuid::new_v4().to_string();
        let now = timestamp();

        // The first statement is a write, so the transaction takes the write
        // lock up front and waits on busy_timeout instead of failing on a
        // stale read snapshot.
        let mut tx = self.db.begin().await?;

        for score in scores {
            append_score(
                &mut *tx,
                &NewScore {
                    feedback_id,
                    run_id: Some(&run_id),
                    agent_type: score.agent_type,
                    score: Some(score.score),
                    reasoning: Some(&score.reasoning),
                    created_at: &now,
                },
            )
            .await
            .map_err(|e| missing_feedback(e, feedback_id))?;
        }

        let already_ranked: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM top_priorities WHERE feedback_id = ?)")
                .bind(feedback_id)
                .fetch_one(&mut *tx)
                .await?;

        // Rank allocation is a single statement: the max is read and the row
        // inserted under the same write lock.
        let insert = format!(
            r#"
            INSERT INTO top_priorities (feedback_id, rank, consensus_score, created_at, updated_at)
            SELECT ?, COALESCE(MAX(rank), 0) + 1, ?, ?, ?
            FROM top_priorities
            WHERE 1
            {}
            "#,
            conflict_clause(self.policy)
        );
        sqlx::query(&insert)
            .bind(feedback_id)
            .bind(consensus)
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await?;

        let entry = sqlx::query_as::<_, TopPriority>(
            r#"
            SELECT id, feedback_id, rank, consensus_score, created_at, updated_at
            FROM top_priorities
            WHERE feedback_id = ?
            "#,
        )
        .bind(feedback_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let newly_ranked = !already_ranked;
        if newly_ranked {
            info!(feedback_id, rank = entry.rank, consensus, "Feedback ranked");
        } else {
            debug!(
                feedback_id,
                rank = entry.rank,
                consensus,
                stored = entry.consensus_score,
                policy = ?self.policy,
                "Feedback re-analyzed"
            );
        }

        Ok(RecordedAnalysis {
            run_id,
            feedback_id,
            scores: scores.to_vec(),
            consensus_score: consensus,
            entry,
            newly_ranked,
        })
    }

    /// Clamp a requested `top` to `1..=max_top_limit`
    ///
    /// A missing or non-positive request yields [`DEFAULT_TOP_LIMIT`].
    pub fn clamp_limit(&self, requested: Option<i64>) -> i64 {
        match requested {
            Some(n) if n > 0 => n.min(self.max_top_limit),
            _ => DEFAULT_TOP_LIMIT.min(self.max_top_limit),
        }
    }

    /// Highest-priority entries, ascending by rank, joined with their feedback
    pub async fn top_priorities(&self, limit: Option<i64>) -> sqlx::Result<Vec<RankedFeedback>> {
        let limit = self.clamp_limit(limit);
        sqlx::query_as::<_, RankedFeedback>(&format!(
            "{} ORDER BY tp.rank ASC LIMIT ?",
            RANKED_SELECT
        ))
        .bind(limit)
        .fetch_all(&self.db)
        .await
    }

    /// One entry by its own id
    pub async fn get(&self, id: i64) -> sqlx::Result<Option<RankedFeedback>> {
        sqlx::query_as::<_, RankedFeedback>(&format!("{} WHERE tp.id = ?", RANKED_SELECT))
            .bind(id)
            .fetch_optional(&self.db)
            .await
    }

    /// The entry for a feedback item, if it has been ranked
    pub async fn entry_for_feedback(&self, feedback_id: i64) -> sqlx::Result<Option<RankedFeedback>> {
        sqlx::query_as::<_, RankedFeedback>(&format!(
            "{} WHERE tp.feedback_id = ?",
            RANKED_SELECT
        ))
        .bind(feedback_id)
        .fetch_optional(&self.db)
        .await
    }

    /// Filtered, sorted and paged listing
    pub async fn list(&self, filter: &PriorityFilter) -> sqlx::Result<Vec<RankedFeedback>> {
        let mut query = filter.build();
        let rows = query
            .build_query_as::<RankedFeedback>()
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }
}

/// The one place re-analysis behavior is decided
fn conflict_clause(policy: RescorePolicy) -> &'static str {
    match policy {
        RescorePolicy::KeepExisting => "ON CONFLICT(feedback_id) DO NOTHING",
        RescorePolicy::RefreshScore => {
            "ON CONFLICT(feedback_id) DO UPDATE SET \
             consensus_score = excluded.consensus_score, \
             updated_at = excluded.updated_at"
        }
    }
}

/// Score rows reference `feedback(id)`; a foreign key failure on append
/// means the item does not exist.
fn missing_feedback(err: sqlx::Error, feedback_id: i64) -> SwarmError {
    match err {
        sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
            SwarmError::FeedbackNotFound(feedback_id)
        }
        other => SwarmError::Storage(other),
    }
}
