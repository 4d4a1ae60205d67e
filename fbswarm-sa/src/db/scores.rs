//! Agent score history queries
//!
//! The `swarm_scores` table is append-only. Nothing here updates or deletes.

use std::collections::BTreeMap;

use fbswarm_common::db::SwarmScore;
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};

use crate::pagination::{Page, SortOrder};
use crate::swarm::AgentType;

const SCORE_COLUMNS: &str = "id, feedback_id, run_id, agent_type, score, reasoning, created_at";

/// One record to append
#[derive(Debug, Clone, Copy)]
pub struct NewScore<'a> {
    pub feedback_id: i64,
    pub run_id: Option<&'a str>,
    pub agent_type: AgentType,
    pub score: Option<f64>,
    pub reasoning: Option<&'a str>,
    pub created_at: &'a str,
}

/// Append one score record, returning its id
///
/// Generic over the executor so the ranking store can append inside its
/// transaction.
pub async fn append_score<'e, E>(executor: E, record: &NewScore<'_>) -> sqlx::Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO swarm_scores (feedback_id, run_id, agent_type, score, reasoning, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.feedback_id)
    .bind(record.run_id)
    .bind(record.agent_type.as_str())
    .bind(record.score)
    .bind(record.reasoning)
    .bind(record.created_at)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn get_score(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<SwarmScore>> {
    sqlx::query_as::<_, SwarmScore>(&format!(
        "SELECT {} FROM swarm_scores WHERE id = ?",
        SCORE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// The five records written by one analysis run, in insertion order
pub async fn scores_for_run(pool: &SqlitePool, run_id: &str) -> sqlx::Result<Vec<SwarmScore>> {
    sqlx::query_as::<_, SwarmScore>(&format!(
        "SELECT {} FROM swarm_scores WHERE run_id = ? ORDER BY id ASC",
        SCORE_COLUMNS
    ))
    .bind(run_id)
    .fetch_all(pool)
    .await
}

/// Column a score listing is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreSort {
    #[default]
    CreatedAt,
    Score,
}

impl ScoreSort {
    /// Accepts the API's camelCase names
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "createdAt" | "created_at" => Some(ScoreSort::CreatedAt),
            "score" => Some(ScoreSort::Score),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            ScoreSort::CreatedAt => "created_at",
            ScoreSort::Score => "score",
        }
    }
}

/// Filters for [`list_scores`]
#[derive(Debug, Clone, Default)]
pub struct ScoreFilter {
    pub feedback_id: Option<i64>,
    pub agent_type: Option<AgentType>,
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
    pub sort: ScoreSort,
    pub order: SortOrder,
    pub page: Page,
}

/// List score records matching `filter`
///
/// Ties on the sort column are broken by id in the same direction, so paging
/// is stable.
pub async fn list_scores(pool: &SqlitePool, filter: &ScoreFilter) -> sqlx::Result<Vec<SwarmScore>> {
    let mut query = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {} FROM swarm_scores WHERE 1 = 1",
        SCORE_COLUMNS
    ));

    if let Some(feedback_id) = filter.feedback_id {
        query.push(" AND feedback_id = ").push_bind(feedback_id);
    }
    if let Some(agent) = filter.agent_type {
        query.push(" AND agent_type = ").push_bind(agent.as_str());
    }
    if let Some(min) = filter.min_score {
        query.push(" AND score >= ").push_bind(min);
    }
    if let Some(max) = filter.max_score {
        query.push(" AND score <= ").push_bind(max);
    }

    let direction = filter.order.keyword();
    query
        .push(" ORDER BY ")
        .push(filter.sort.column())
        .push(" ")
        .push(direction)
        .push(", id ")
        .push(direction);
    query
        .push(" LIMIT ")
        .push_bind(filter.page.limit)
        .push(" OFFSET ")
        .push_bind(filter.page.offset);

    let rows = query.build_query_as::<SwarmScore>().fetch_all(pool).await?;
    Ok(rows)
}

/// Group records by agent type, newest first within each group
///
/// Records with an agent type outside the five known agents are kept under
/// their stored name.
pub fn group_by_agent(records: Vec<SwarmScore>) -> BTreeMap<String, Vec<SwarmScore>> {
    let mut groups: BTreeMap<String, Vec<SwarmScore>> = BTreeMap::new();
    for record in records {
        groups.entry(record.agent_type.clone()).or_default().push(record);
    }
    for group in groups.values_mut() {
        group.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    }
    groups
}
