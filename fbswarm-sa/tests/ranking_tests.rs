//! Ranking store integration tests against on-disk databases
//!
//! Concurrency tests need a real file: every pooled connection to an
//! in-memory database would see its own empty schema.

use std::collections::BTreeSet;

use fbswarm_common::config::RescorePolicy;
use fbswarm_common::db::{init_database, init_memory_database};
use fbswarm_sa::db::feedback::{create_feedback, NewFeedback};
use fbswarm_sa::db::scores::scores_for_run;
use fbswarm_sa::ranking::RankingStore;
use fbswarm_sa::swarm::{AgentType, FixedJitter, RandomJitter, SwarmRunner};
use fbswarm_sa::SwarmError;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tokio::task::JoinSet;

async fn file_pool() -> (SqlitePool, TempDir) {
    let dir = TempDir::new().expect("Should create temp dir");
    let pool = init_database(&dir.path().join("fbswarm.db"))
        .await
        .expect("Should create database");
    (pool, dir)
}

fn runner(pool: &SqlitePool, policy: RescorePolicy) -> SwarmRunner {
    let store = RankingStore::new(pool.clone(), policy, 100);
    SwarmRunner::new(pool.clone(), store, Box::new(FixedJitter::zero()))
}

async fn add_feedback(pool: &SqlitePool, title: &str) -> i64 {
    create_feedback(pool, &NewFeedback::new(title, "details"))
        .await
        .expect("Should create feedback")
        .id
}

async fn score_count(pool: &SqlitePool, feedback_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM swarm_scores WHERE feedback_id = ?")
        .bind(feedback_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_one_run_appends_five_records() {
    let pool = init_memory_database().await.unwrap();
    let runner = runner(&pool, RescorePolicy::KeepExisting);
    let id = add_feedback(&pool, "Checkout fails").await;

    let recorded = runner.analyze_feedback(id).await.unwrap();
    assert_eq!(score_count(&pool, id).await, 5);

    let run = scores_for_run(&pool, &recorded.run_id).await.unwrap();
    let agents: BTreeSet<String> = run.iter().map(|r| r.agent_type.clone()).collect();
    assert_eq!(agents.len(), 5);
    for agent in AgentType::ALL {
        assert!(agents.contains(agent.as_str()));
    }
    assert!(run.iter().all(|r| r.score.is_some_and(|s| s <= 100.0)));

    // Consensus is the rounded mean of exactly these scores
    let mean = run.iter().filter_map(|r| r.score).sum::<f64>() / 5.0;
    assert_eq!(recorded.consensus_score, (mean * 10.0).round() / 10.0);
}

#[tokio::test]
async fn test_reanalysis_appends_without_reranking() {
    let pool = init_memory_database().await.unwrap();
    let store = RankingStore::new(pool.clone(), RescorePolicy::KeepExisting, 100);
    let runner = SwarmRunner::new(pool.clone(), store, Box::new(RandomJitter::seeded(11)));
    let id = add_feedback(&pool, "Checkout fails").await;

    let first = runner.analyze_feedback(id).await.unwrap();
    let second = runner.analyze_feedback(id).await.unwrap();

    assert_eq!(score_count(&pool, id).await, 10);
    assert_eq!(second.entry.rank, first.entry.rank);
    assert_eq!(second.entry.consensus_score, first.consensus_score);
    assert_eq!(second.entry.updated_at, first.entry.updated_at);
}

#[tokio::test]
async fn test_refresh_policy_updates_score_only() {
    let pool = init_memory_database().await.unwrap();
    let store = RankingStore::new(pool.clone(), RescorePolicy::RefreshScore, 100);
    let runner = SwarmRunner::new(pool.clone(), store, Box::new(RandomJitter::seeded(3)));
    let id = add_feedback(&pool, "Checkout fails").await;

    let first = runner.analyze_feedback(id).await.unwrap();
    let second = runner.analyze_feedback(id).await.unwrap();

    assert_eq!(second.entry.rank, first.entry.rank);
    assert_eq!(second.entry.consensus_score, second.consensus_score);
}

#[tokio::test]
async fn test_sequential_ranks() {
    let pool = init_memory_database().await.unwrap();
    let runner = runner(&pool, RescorePolicy::KeepExisting);

    let a = add_feedback(&pool, "a").await;
    let b = add_feedback(&pool, "b").await;

    assert_eq!(runner.analyze_feedback(a).await.unwrap().entry.rank, 1);
    assert_eq!(runner.analyze_feedback(b).await.unwrap().entry.rank, 2);
}

#[tokio::test]
async fn test_top_priorities_strictly_ascending() {
    let pool = init_memory_database().await.unwrap();
    let runner = runner(&pool, RescorePolicy::KeepExisting);
    for n in 0..5 {
        let id = add_feedback(&pool, &format!("item {}", n)).await;
        runner.analyze_feedback(id).await.unwrap();
    }

    let top = runner.store().top_priorities(Some(3)).await.unwrap();
    assert_eq!(top.len(), 3);
    assert!(top.windows(2).all(|w| w[0].rank < w[1].rank));
    assert_eq!(top[0].rank, 1);
}

#[tokio::test]
async fn test_unknown_feedback_is_rejected() {
    let (pool, _dir) = file_pool().await;
    let runner = runner(&pool, RescorePolicy::KeepExisting);

    let err = runner.analyze_feedback(99).await.unwrap_err();
    assert!(matches!(err, SwarmError::FeedbackNotFound(99)));
    assert_eq!(score_count(&pool, 99).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_distinct_items_get_contiguous_ranks() {
    let (pool, _dir) = file_pool().await;
    let runner = runner(&pool, RescorePolicy::KeepExisting);

    const N: i64 = 16;
    let mut ids = Vec::new();
    for n in 0..N {
        ids.push(add_feedback(&pool, &format!("concurrent {}", n)).await);
    }

    let mut tasks = JoinSet::new();
    for id in ids.clone() {
        let runner = runner.clone();
        tasks.spawn(async move { runner.analyze_feedback(id).await });
    }

    let mut ranks = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let recorded = joined.expect("task panicked").expect("analysis failed");
        assert!(recorded.newly_ranked);
        ranks.push(recorded.entry.rank);
    }

    ranks.sort_unstable();
    assert_eq!(ranks, (1..=N).collect::<Vec<_>>());

    for id in ids {
        assert_eq!(score_count(&pool, id).await, 5);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reanalysis_of_one_item_ranks_once() {
    let (pool, _dir) = file_pool().await;
    let runner = runner(&pool, RescorePolicy::KeepExisting);
    let id = add_feedback(&pool, "hot item").await;

    let mut tasks = JoinSet::new();
    for _ in 0..8 {
        let runner = runner.clone();
        tasks.spawn(async move { runner.analyze_feedback(id).await });
    }

    let mut newly_ranked = 0;
    while let Some(joined) = tasks.join_next().await {
        let recorded = joined.expect("task panicked").expect("analysis failed");
        assert_eq!(recorded.entry.rank, 1);
        if recorded.newly_ranked {
            newly_ranked += 1;
        }
    }

    assert_eq!(newly_ranked, 1);
    assert_eq!(score_count(&pool, id).await, 40);

    let entries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM top_priorities")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(entries, 1);
}

#[tokio::test]
async fn test_ranking_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fbswarm.db");

    let id = {
        let pool = init_database(&path).await.unwrap();
        let runner = runner(&pool, RescorePolicy::KeepExisting);
        let id = add_feedback(&pool, "persisted").await;
        runner.analyze_feedback(id).await.unwrap();
        pool.close().await;
        id
    };

    let pool = init_database(&path).await.unwrap();
    let store = RankingStore::new(pool.clone(), RescorePolicy::KeepExisting, 100);
    let entry = store.entry_for_feedback(id).await.unwrap().unwrap();
    assert_eq!(entry.rank, 1);
    assert_eq!(entry.feedback_title, "persisted");
}
