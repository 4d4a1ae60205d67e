//! Agent score history endpoints
//!
//! History is append-only, so there is no update or delete route.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use fbswarm_common::db::SwarmScore;
use fbswarm_common::time::timestamp;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::params::{feedback_id_from_json, parse_int, parse_order, parse_page, parse_score_bound};
use crate::db::feedback::feedback_exists;
use crate::db::scores::{append_score, get_score, group_by_agent, list_scores, NewScore, ScoreFilter, ScoreSort};
use crate::error::{ApiError, ApiResult, SwarmError};
use crate::pagination::{Page, SortOrder};
use crate::swarm::AgentType;
use crate::AppState;

pub const MAX_REASONING_CHARS: usize = 2000;

/// GET /api/swarm-scores query
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoresQuery {
    pub id: Option<String>,
    pub feedback_id: Option<String>,
    pub group_by: Option<String>,
    pub agent_type: Option<String>,
    pub min_score: Option<String>,
    pub max_score: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

fn parse_agent_type(raw: &str) -> ApiResult<AgentType> {
    raw.parse::<AgentType>()
        .map_err(|_| ApiError::bad_request("INVALID_AGENT_TYPE", invalid_agent_type_message(raw)))
}

fn invalid_agent_type_message(raw: &str) -> String {
    let names: Vec<&str> = AgentType::ALL.iter().map(|a| a.as_str()).collect();
    format!("Invalid agent type '{}'. Must be one of: {}", raw, names.join(", "))
}

impl ScoresQuery {
    fn filter(&self) -> ApiResult<ScoreFilter> {
        let agent_type = match self.agent_type.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            None => None,
            Some(raw) => Some(parse_agent_type(raw)?),
        };

        let sort = match self.sort.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => ScoreSort::default(),
            Some(raw) => ScoreSort::parse(raw).ok_or_else(|| {
                ApiError::bad_request("INVALID_SORT", format!("sort must be 'createdAt' or 'score', got '{}'", raw))
            })?,
        };

        Ok(ScoreFilter {
            feedback_id: parse_int("feedbackId", "INVALID_FEEDBACK_ID", self.feedback_id.as_deref())?,
            agent_type,
            min_score: parse_score_bound("minScore", "INVALID_MIN_SCORE", self.min_score.as_deref())?,
            max_score: parse_score_bound("maxScore", "INVALID_MAX_SCORE", self.max_score.as_deref())?,
            sort,
            order: parse_order(self.order.as_deref(), SortOrder::Desc)?,
            page: parse_page(self.limit.as_deref(), self.offset.as_deref())?,
        })
    }

    fn grouped(&self) -> bool {
        self.group_by.as_deref().map(str::trim) == Some("true")
    }
}

/// GET /api/swarm-scores
///
/// Three shapes: a single record (`id`), records for one feedback item
/// grouped by agent (`feedbackId` + `groupBy=true`), or a filtered list.
pub async fn get_scores(
    State(state): State<AppState>,
    Query(query): Query<ScoresQuery>,
) -> ApiResult<Response> {
    if let Some(id) = parse_int("id", "INVALID_ID", query.id.as_deref())? {
        let record = get_score(&state.db, id)
            .await?
            .ok_or_else(|| ApiError::not_found("SCORE_NOT_FOUND", format!("Swarm score {} not found", id)))?;
        return Ok(Json(record).into_response());
    }

    let filter = query.filter()?;

    if query.grouped() {
        if filter.feedback_id.is_none() {
            return Err(ApiError::bad_request(
                "MISSING_FEEDBACK_ID",
                "groupBy=true requires feedbackId",
            ));
        }
        // Grouping covers the whole history of one item, not one page
        let all = ScoreFilter {
            feedback_id: filter.feedback_id,
            page: Page::unbounded(),
            ..Default::default()
        };
        let records = list_scores(&state.db, &all).await?;
        return Ok(Json(group_by_agent(records)).into_response());
    }

    let records = list_scores(&state.db, &filter).await?;
    Ok(Json(records).into_response())
}

/// POST /api/swarm-scores body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScoreRequest {
    #[serde(default)]
    pub feedback_id: Option<Value>,
    pub agent_type: Option<String>,
    pub score: Option<f64>,
    pub reasoning: Option<String>,
}

/// POST /api/swarm-scores
///
/// Appends one externally produced record. It carries no run id and never
/// affects the ranking.
pub async fn post_score(
    State(state): State<AppState>,
    Json(request): Json<CreateScoreRequest>,
) -> ApiResult<(StatusCode, Json<SwarmScore>)> {
    let feedback_id = feedback_id_from_json(request.feedback_id.as_ref())?;

    let raw_agent = request
        .agent_type
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ApiError::bad_request("MISSING_AGENT_TYPE", "Agent type is required"))?;
    let agent_type = parse_agent_type(raw_agent)?;

    if let Some(score) = request.score {
        if !(0.0..=100.0).contains(&score) {
            return Err(ApiError::bad_request(
                "INVALID_SCORE_RANGE",
                "Score must be a number between 0 and 100",
            ));
        }
    }

    let reasoning = request
        .reasoning
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());
    if reasoning.is_some_and(|r| r.chars().count() > MAX_REASONING_CHARS) {
        return Err(ApiError::bad_request(
            "REASONING_TOO_LONG",
            format!("Reasoning must be {} characters or less", MAX_REASONING_CHARS),
        ));
    }

    if !feedback_exists(&state.db, feedback_id).await? {
        return Err(SwarmError::FeedbackNotFound(feedback_id).into());
    }

    let now = timestamp();
    let id = append_score(
        &state.db,
        &NewScore {
            feedback_id,
            run_id: None,
            agent_type,
            score: request.score,
            reasoning,
            created_at: &now,
        },
    )
    .await?;

    let record = get_score(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("Swarm score {} vanished after insert", id)))?;

    info!(feedback_id, agent = %agent_type, score_id = id, "External swarm score recorded");
    Ok((StatusCode::CREATED, Json(record)))
}

/// Build score history routes
pub fn score_routes() -> Router<AppState> {
    Router::new().route("/api/swarm-scores", get(get_scores).post(post_score))
}
