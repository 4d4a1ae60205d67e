//! Swarm analysis endpoint

use std::collections::BTreeMap;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::params::feedback_id_from_json;
use crate::error::ApiResult;
use crate::ranking::RecordedAnalysis;
use crate::swarm::AgentType;
use crate::AppState;

/// POST /api/swarm-analyze body
///
/// The id is kept as raw JSON so both `7` and `"7"` are accepted.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub feedback_id: Option<Value>,
}

/// One agent's entry in the analysis response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentVerdict {
    pub score: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub feedback_id: i64,
    pub run_id: String,
    /// Keyed by agent type
    pub scores: BTreeMap<AgentType, AgentVerdict>,
    /// Consensus of this run
    pub consensus_score: f64,
    /// Rank of the feedback item after this run
    pub rank: i64,
    /// Consensus stored on the ranking entry; differs from `consensus_score`
    /// when an existing entry was kept
    pub ranked_consensus_score: f64,
    pub newly_ranked: bool,
    pub message: String,
}

impl From<RecordedAnalysis> for AnalyzeResponse {
    fn from(recorded: RecordedAnalysis) -> Self {
        let scores = recorded
            .scores
            .into_iter()
            .map(|s| {
                (
                    s.agent_type,
                    AgentVerdict {
                        score: s.score,
                        reasoning: s.reasoning,
                    },
                )
            })
            .collect();

        Self {
            feedback_id: recorded.feedback_id,
            run_id: recorded.run_id,
            scores,
            consensus_score: recorded.consensus_score,
            rank: recorded.entry.rank,
            ranked_consensus_score: recorded.entry.consensus_score,
            newly_ranked: recorded.newly_ranked,
            message: "Swarm analysis completed successfully".to_string(),
        }
    }
}

/// POST /api/swarm-analyze
pub async fn analyze_feedback(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let feedback_id = feedback_id_from_json(request.feedback_id.as_ref())?;
    let recorded = state.runner.analyze_feedback(feedback_id).await?;
    Ok(Json(recorded.into()))
}

/// Build swarm analysis routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/api/swarm-analyze", post(analyze_feedback))
}
