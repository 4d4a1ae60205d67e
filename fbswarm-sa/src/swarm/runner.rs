//! Analyze-by-id: load a feedback item, score it, persist the run

use std::sync::{Arc, Mutex, PoisonError};

use sqlx::SqlitePool;
use tracing::{debug, warn};

use super::analyzer::analyze;
use super::jitter::JitterSource;
use crate::db::feedback::get_feedback;
use crate::error::SwarmError;
use crate::ranking::{RankingStore, RecordedAnalysis};

/// Jitter source shared by every request handled by one runner
pub type SharedJitter = Arc<Mutex<Box<dyn JitterSource + Send>>>;

/// Runs the swarm for stored feedback items
#[derive(Clone)]
pub struct SwarmRunner {
    db: SqlitePool,
    store: RankingStore,
    jitter: SharedJitter,
}

impl SwarmRunner {
    pub fn new(db: SqlitePool, store: RankingStore, jitter: Box<dyn JitterSource + Send>) -> Self {
        Self {
            db,
            store,
            jitter: Arc::new(Mutex::new(jitter)),
        }
    }

    pub fn store(&self) -> &RankingStore {
        &self.store
    }

    /// Score a feedback item and record the run
    ///
    /// Fails with [`SwarmError::FeedbackNotFound`] before any scoring when the
    /// id is unknown.
    pub async fn analyze_feedback(&self, feedback_id: i64) -> Result<RecordedAnalysis, SwarmError> {
        let feedback = get_feedback(&self.db, feedback_id)
            .await?
            .ok_or(SwarmError::FeedbackNotFound(feedback_id))?;

        let analysis = {
            // A panic mid-sample cannot leave a jitter source inconsistent
            let mut jitter = self.jitter.lock().unwrap_or_else(PoisonError::into_inner);
            analyze(&feedback.title, &feedback.description, &mut **jitter)?
        };
        debug!(
            feedback_id,
            consensus = analysis.consensus_score,
            "Swarm scored feedback"
        );

        let recorded = self
            .store
            .record_analysis(feedback_id, &analysis.scores)
            .await
            .map_err(|e| {
                warn!(feedback_id, error = %e, "Failed to record swarm analysis");
                e
            })?;

        Ok(recorded)
    }
}

impl std::fmt::Debug for SwarmRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwarmRunner")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
