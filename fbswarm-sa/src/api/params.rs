//! Query and body parameter parsing shared by the handlers
//!
//! Query parameters arrive as optional strings so a bad value produces this
//! service's JSON error body with a specific code instead of axum's plain-text
//! rejection. An empty parameter (`?limit=`) counts as absent.

use serde_json::Value;

use crate::error::{ApiError, ApiResult, SwarmError};
use crate::pagination::{calculate_page, Page, SortOrder};

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Optional integer parameter
pub fn parse_int(name: &str, code: &'static str, value: Option<&str>) -> ApiResult<Option<i64>> {
    match present(value) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ApiError::bad_request(code, format!("{} must be an integer, got '{}'", name, raw))),
    }
}

/// Optional score bound, which must lie in `[0, 100]`
pub fn parse_score_bound(name: &str, code: &'static str, value: Option<&str>) -> ApiResult<Option<f64>> {
    match present(value) {
        None => Ok(None),
        Some(raw) => match raw.parse::<f64>() {
            Ok(v) if (0.0..=100.0).contains(&v) => Ok(Some(v)),
            _ => Err(ApiError::bad_request(
                code,
                format!("{} must be a number between 0 and 100, got '{}'", name, raw),
            )),
        },
    }
}

/// Optional `asc`/`desc`, falling back to `default`
pub fn parse_order(value: Option<&str>, default: SortOrder) -> ApiResult<SortOrder> {
    match present(value) {
        None => Ok(default),
        Some(raw) => SortOrder::parse(raw).ok_or_else(|| {
            ApiError::bad_request("INVALID_ORDER", format!("order must be 'asc' or 'desc', got '{}'", raw))
        }),
    }
}

/// `limit`/`offset` pair, sanitized by [`calculate_page`]
pub fn parse_page(limit: Option<&str>, offset: Option<&str>) -> ApiResult<Page> {
    let limit = parse_int("limit", "INVALID_LIMIT", limit)?;
    let offset = parse_int("offset", "INVALID_OFFSET", offset)?;
    Ok(calculate_page(limit, offset))
}

/// Feedback id from a JSON body field
///
/// Accepts a positive integer or a string holding one. Absent, null, empty,
/// zero and `false` all count as missing.
pub fn feedback_id_from_json(value: Option<&Value>) -> Result<i64, SwarmError> {
    let invalid = |v: &Value| SwarmError::InvalidFeedbackId(v.to_string());

    let id = match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => return Err(SwarmError::MissingFeedbackId),
        Some(v @ Value::Number(n)) => match n.as_i64() {
            Some(id) => id,
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => f as i64,
                _ => return Err(invalid(v)),
            },
        },
        Some(v @ Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(SwarmError::MissingFeedbackId);
            }
            trimmed.parse::<i64>().map_err(|_| invalid(v))?
        }
        Some(other) => return Err(invalid(other)),
    };

    match id {
        0 => Err(SwarmError::MissingFeedbackId),
        id if id < 0 => Err(SwarmError::InvalidFeedbackId(id.to_string())),
        id => Ok(id),
    }
}
