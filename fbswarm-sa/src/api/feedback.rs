//! Feedback intake endpoints
//!
//! Just enough of the intake surface to submit items and read them back; the
//! swarm analyzes whatever is stored here.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use fbswarm_common::db::Feedback;
use serde::Deserialize;
use tracing::info;

use super::params::parse_int;
use crate::db::feedback::{create_feedback, get_feedback, NewFeedback, SOURCES};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub const MAX_TITLE_CHARS: usize = 500;
pub const MAX_DESCRIPTION_CHARS: usize = 5000;
pub const MAX_CUSTOMER_NAME_CHARS: usize = 200;

/// POST /api/feedback body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub cluster_id: Option<i64>,
}

impl CreateFeedbackRequest {
    /// Validate and normalize into an insertable item
    pub fn validate(self) -> ApiResult<NewFeedback> {
        let title = required(self.title, "MISSING_TITLE", "Title is required")?;
        let description = required(self.description, "MISSING_DESCRIPTION", "Description is required")?;
        let source = required(self.source, "MISSING_SOURCE", "Source is required")?;

        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(ApiError::bad_request(
                "TITLE_TOO_LONG",
                format!("Title must not exceed {} characters", MAX_TITLE_CHARS),
            ));
        }
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(ApiError::bad_request(
                "DESCRIPTION_TOO_LONG",
                format!("Description must not exceed {} characters", MAX_DESCRIPTION_CHARS),
            ));
        }
        if !SOURCES.contains(&source.as_str()) {
            return Err(ApiError::bad_request(
                "INVALID_SOURCE",
                format!("Source must be one of: {}", SOURCES.join(", ")),
            ));
        }

        let customer_email = match trimmed(self.customer_email) {
            Some(email) if !looks_like_email(&email) => {
                return Err(ApiError::bad_request("INVALID_EMAIL", "Invalid email format"));
            }
            email => email.map(|e| e.to_lowercase()),
        };

        let customer_name = trimmed(self.customer_name);
        if customer_name
            .as_ref()
            .is_some_and(|n| n.chars().count() > MAX_CUSTOMER_NAME_CHARS)
        {
            return Err(ApiError::bad_request(
                "CUSTOMER_NAME_TOO_LONG",
                format!("Customer name must not exceed {} characters", MAX_CUSTOMER_NAME_CHARS),
            ));
        }

        Ok(NewFeedback {
            title,
            description,
            source,
            customer_email,
            customer_name,
            cluster_id: self.cluster_id,
        })
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required(value: Option<String>, code: &'static str, message: &str) -> ApiResult<String> {
    trimmed(value).ok_or_else(|| ApiError::bad_request(code, message))
}

/// `local@domain.tld` with no whitespace
fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

/// POST /api/feedback
pub async fn post_feedback(
    State(state): State<AppState>,
    Json(request): Json<CreateFeedbackRequest>,
) -> ApiResult<(StatusCode, Json<Feedback>)> {
    let item = request.validate()?;
    let created = create_feedback(&state.db, &item).await?;
    info!(feedback_id = created.id, source = %created.source, "Feedback created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct FeedbackQuery {
    pub id: Option<String>,
}

/// GET /api/feedback?id=N
pub async fn get_feedback_by_id(
    State(state): State<AppState>,
    Query(query): Query<FeedbackQuery>,
) -> ApiResult<Json<Feedback>> {
    let id = parse_int("id", "INVALID_ID", query.id.as_deref())?
        .ok_or_else(|| ApiError::bad_request("INVALID_ID", "Valid ID is required"))?;

    let item = get_feedback(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("FEEDBACK_NOT_FOUND", format!("Feedback {} not found", id)))?;
    Ok(Json(item))
}

/// Build feedback routes
pub fn feedback_routes() -> Router<AppState> {
    Router::new().route("/api/feedback", get(get_feedback_by_id).post(post_feedback))
}
