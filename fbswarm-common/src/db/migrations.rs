//! Database schema migrations
//!
//! Versioned schema changes applied on top of the base `CREATE TABLE IF NOT
//! EXISTS` definitions, tracked in the `schema_version` table.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - databases in the field depend on them
//! 2. **Always add new migrations** - one function per schema change
//! 3. **Keep them idempotent** - check before altering so reruns are harmless
//! 4. **Use ALTER TABLE** - prefer it over DROP/CREATE to preserve data

use crate::{Error, Result};
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("✓ Migration v2 completed");
    }

    Ok(())
}

/// Migration v1: Add run_id column to swarm_scores
///
/// Groups the five agent records written by one analysis run. Rows written
/// before this column existed keep a NULL run_id.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: Add run_id column to swarm_scores");

    let has_column: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info('swarm_scores') WHERE name = 'run_id'",
    )
    .fetch_one(pool)
    .await?;

    if has_column > 0 {
        info!("  run_id column already exists - skipping");
    } else {
        sqlx::query("ALTER TABLE swarm_scores ADD COLUMN run_id TEXT")
            .execute(pool)
            .await?;
        info!("  ✓ Added run_id column to swarm_scores table");
    }

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_swarm_scores_feedback ON swarm_scores(feedback_id, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Migration v2: Enforce one ranking entry per feedback item and unique ranks
///
/// Fails loudly instead of silently dropping rows if an older database
/// already holds duplicates.
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: Unique indexes on top_priorities");

    let duplicate_feedback: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM (
            SELECT feedback_id FROM top_priorities
            GROUP BY feedback_id HAVING COUNT(*) > 1
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    let duplicate_ranks: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM (
            SELECT rank FROM top_priorities
            GROUP BY rank HAVING COUNT(*) > 1
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if duplicate_feedback > 0 || duplicate_ranks > 0 {
        return Err(Error::Internal(format!(
            "top_priorities holds {} duplicated feedback ids and {} duplicated ranks; \
             resolve them before upgrading",
            duplicate_feedback, duplicate_ranks
        )));
    }

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_top_priorities_feedback ON top_priorities(feedback_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_top_priorities_rank ON top_priorities(rank)")
        .execute(pool)
        .await?;

    info!("  ✓ Added unique indexes on top_priorities(feedback_id) and top_priorities(rank)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::{create_feedback_table, create_swarm_scores_table, create_top_priorities_table};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_base_tables() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE schema_version (version INTEGER PRIMARY KEY, applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP)",
        )
        .execute(&pool)
        .await
        .unwrap();
        create_feedback_table(&pool).await.unwrap();
        create_swarm_scores_table(&pool).await.unwrap();
        create_top_priorities_table(&pool).await.unwrap();
        pool
    }

    async fn seed_feedback(pool: &SqlitePool, count: i64) {
        for i in 1..=count {
            sqlx::query(
                "INSERT INTO feedback (id, title, description, source, created_at, updated_at) VALUES (?, 't', 'd', 'api', 'x', 'x')",
            )
            .bind(i)
            .execute(pool)
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn test_fresh_database_reaches_current_version() {
        let pool = setup_base_tables().await;
        assert_eq!(get_schema_version(&pool).await.unwrap(), 0);

        run_migrations(&pool).await.unwrap();
        assert_eq!(get_schema_version(&pool).await.unwrap(), CURRENT_SCHEMA_VERSION);

        let has_run_id: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pragma_table_info('swarm_scores') WHERE name = 'run_id'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(has_run_id, 1);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = setup_base_tables().await;
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_version")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, CURRENT_SCHEMA_VERSION as i64);
    }

    #[tokio::test]
    async fn test_unique_rank_enforced_after_migration() {
        let pool = setup_base_tables().await;
        seed_feedback(&pool, 2).await;
        run_migrations(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO top_priorities (feedback_id, rank, consensus_score, created_at, updated_at) VALUES (1, 1, 50.0, 'x', 'x')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let duplicate_rank = sqlx::query(
            "INSERT INTO top_priorities (feedback_id, rank, consensus_score, created_at, updated_at) VALUES (2, 1, 60.0, 'x', 'x')",
        )
        .execute(&pool)
        .await;
        assert!(duplicate_rank.is_err(), "rank must be unique");

        let duplicate_feedback = sqlx::query(
            "INSERT INTO top_priorities (feedback_id, rank, consensus_score, created_at, updated_at) VALUES (1, 2, 60.0, 'x', 'x')",
        )
        .execute(&pool)
        .await;
        assert!(duplicate_feedback.is_err(), "feedback_id must be unique");
    }

    #[tokio::test]
    async fn test_v2_refuses_duplicate_rankings() {
        let pool = setup_base_tables().await;
        seed_feedback(&pool, 2).await;

        for feedback_id in [1, 2] {
            sqlx::query(
                "INSERT INTO top_priorities (feedback_id, rank, consensus_score, created_at, updated_at) VALUES (?, 1, 50.0, 'x', 'x')",
            )
            .bind(feedback_id)
            .execute(&pool)
            .await
            .unwrap();
        }

        let result = run_migrations(&pool).await;
        assert!(matches!(result, Err(Error::Internal(_))));
    }
}
