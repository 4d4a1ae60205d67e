//! Feedback item queries
//!
//! Feedback is owned by the intake side. The swarm only needs to read it, but
//! the service also accepts new items so a deployment can run standalone.

use fbswarm_common::db::Feedback;
use fbswarm_common::time::timestamp;
use sqlx::SqlitePool;

/// Feedback submission channels
pub const SOURCES: [&str; 3] = ["form", "csv", "api"];

/// Fields for a new feedback item
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedback {
    pub title: String,
    pub description: String,
    pub source: String,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub cluster_id: Option<i64>,
}

impl NewFeedback {
    /// Minimal item with the given text, submitted through the API
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            source: "api".to_string(),
            customer_email: None,
            customer_name: None,
            cluster_id: None,
        }
    }
}

/// Insert a feedback item and return the stored row
pub async fn create_feedback(pool: &SqlitePool, item: &NewFeedback) -> sqlx::Result<Feedback> {
    let now = timestamp();

    sqlx::query_as::<_, Feedback>(
        r#"
        INSERT INTO feedback (title, description, source, customer_email, customer_name, cluster_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id, title, description, source, customer_email, customer_name, cluster_id, created_at, updated_at
        "#,
    )
    .bind(&item.title)
    .bind(&item.description)
    .bind(&item.source)
    .bind(&item.customer_email)
    .bind(&item.customer_name)
    .bind(item.cluster_id)
    .bind(&now)
    .bind(&now)
    .fetch_one(pool)
    .await
}

/// Load one feedback item
pub async fn get_feedback(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Feedback>> {
    sqlx::query_as::<_, Feedback>(
        r#"
        SELECT id, title, description, source, customer_email, customer_name, cluster_id, created_at, updated_at
        FROM feedback
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn feedback_exists(pool: &SqlitePool, id: i64) -> sqlx::Result<bool> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM feedback WHERE id = ?)")
        .bind(id)
        .fetch_one(pool)
        .await
}
