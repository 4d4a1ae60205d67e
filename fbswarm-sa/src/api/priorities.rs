//! Priority ranking endpoints

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::params::{parse_int, parse_order, parse_page};
use crate::error::{ApiError, ApiResult};
use crate::pagination::SortOrder;
use crate::ranking::{PriorityFilter, PrioritySort};
use crate::AppState;

/// GET /api/top-priorities query
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritiesQuery {
    pub id: Option<String>,
    pub top: Option<String>,
    pub feedback_id: Option<String>,
    pub min_rank: Option<String>,
    pub max_rank: Option<String>,
    pub min_score: Option<String>,
    pub max_score: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

fn parse_float(name: &str, code: &'static str, value: Option<&str>) -> ApiResult<Option<f64>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(ApiError::bad_request(code, format!("{} must be a number, got '{}'", name, raw))),
        },
    }
}

impl PrioritiesQuery {
    fn filter(&self) -> ApiResult<PriorityFilter> {
        let sort = match self.sort.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => PrioritySort::default(),
            Some(raw) => PrioritySort::parse(raw).ok_or_else(|| {
                ApiError::bad_request(
                    "INVALID_SORT",
                    format!("sort must be 'rank', 'consensusScore' or 'createdAt', got '{}'", raw),
                )
            })?,
        };

        Ok(PriorityFilter {
            feedback_id: parse_int("feedbackId", "INVALID_FEEDBACK_ID", self.feedback_id.as_deref())?,
            min_rank: parse_int("minRank", "INVALID_RANK", self.min_rank.as_deref())?,
            max_rank: parse_int("maxRank", "INVALID_RANK", self.max_rank.as_deref())?,
            min_score: parse_float("minScore", "INVALID_MIN_SCORE", self.min_score.as_deref())?,
            max_score: parse_float("maxScore", "INVALID_MAX_SCORE", self.max_score.as_deref())?,
            sort,
            order: parse_order(self.order.as_deref(), SortOrder::Asc)?,
            page: parse_page(self.limit.as_deref(), self.offset.as_deref())?,
        })
    }
}

/// GET /api/top-priorities
///
/// `id` returns one entry, `top` the N highest-priority items, and anything
/// else the filtered list.
pub async fn get_priorities(
    State(state): State<AppState>,
    Query(query): Query<PrioritiesQuery>,
) -> ApiResult<Response> {
    let store = state.runner.store();

    if let Some(id) = parse_int("id", "INVALID_ID", query.id.as_deref())? {
        let entry = store.get(id).await?.ok_or_else(|| {
            ApiError::not_found("PRIORITY_NOT_FOUND", format!("Priority entry {} not found", id))
        })?;
        return Ok(Json(entry).into_response());
    }

    if query.top.is_some() {
        // Unparsable or non-positive values fall back to the default
        let requested = query.top.as_deref().and_then(|t| t.trim().parse::<i64>().ok());
        let entries = store.top_priorities(requested).await?;
        return Ok(Json(entries).into_response());
    }

    let entries = store.list(&query.filter()?).await?;
    Ok(Json(entries).into_response())
}

/// Build priority ranking routes
pub fn priority_routes() -> Router<AppState> {
    Router::new().route("/api/top-priorities", get(get_priorities))
}
