//! Ranking list queries

use sqlx::{QueryBuilder, Sqlite};

use crate::pagination::{Page, SortOrder};

/// Ranking entries joined with their feedback content
pub(crate) const RANKED_SELECT: &str = r#"
    SELECT tp.id, tp.feedback_id, tp.rank, tp.consensus_score, tp.created_at, tp.updated_at,
           f.title AS feedback_title,
           f.description AS feedback_description,
           f.source AS feedback_source,
           f.customer_email AS feedback_customer_email,
           f.customer_name AS feedback_customer_name
    FROM top_priorities tp
    JOIN feedback f ON f.id = tp.feedback_id
"#;

/// Column a ranking listing is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrioritySort {
    #[default]
    Rank,
    ConsensusScore,
    CreatedAt,
}

impl PrioritySort {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "rank" => Some(PrioritySort::Rank),
            "consensusScore" | "consensus_score" => Some(PrioritySort::ConsensusScore),
            "createdAt" | "created_at" => Some(PrioritySort::CreatedAt),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            PrioritySort::Rank => "tp.rank",
            PrioritySort::ConsensusScore => "tp.consensus_score",
            PrioritySort::CreatedAt => "tp.created_at",
        }
    }
}

/// Filters for the ranking list
#[derive(Debug, Clone, PartialEq)]
pub struct PriorityFilter {
    pub feedback_id: Option<i64>,
    pub min_rank: Option<i64>,
    pub max_rank: Option<i64>,
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
    pub sort: PrioritySort,
    pub order: SortOrder,
    pub page: Page,
}

impl Default for PriorityFilter {
    fn default() -> Self {
        Self {
            feedback_id: None,
            min_rank: None,
            max_rank: None,
            min_score: None,
            max_score: None,
            sort: PrioritySort::Rank,
            // Rank 1 first unless asked otherwise
            order: SortOrder::Asc,
            page: Page::default(),
        }
    }
}

impl PriorityFilter {
    pub(crate) fn build(&self) -> QueryBuilder<'static, Sqlite> {
        let mut query = QueryBuilder::<Sqlite>::new(RANKED_SELECT);
        query.push(" WHERE 1 = 1");

        if let Some(feedback_id) = self.feedback_id {
            query.push(" AND tp.feedback_id = ").push_bind(feedback_id);
        }
        if let Some(min) = self.min_rank {
            query.push(" AND tp.rank >= ").push_bind(min);
        }
        if let Some(max) = self.max_rank {
            query.push(" AND tp.rank <= ").push_bind(max);
        }
        if let Some(min) = self.min_score {
            query.push(" AND tp.consensus_score >= ").push_bind(min);
        }
        if let Some(max) = self.max_score {
            query.push(" AND tp.consensus_score <= ").push_bind(max);
        }

        let direction = self.order.keyword();
        query
            .push(" ORDER BY ")
            .push(self.sort.column())
            .push(" ")
            .push(direction)
            .push(", tp.id ")
            .push(direction);
        query
            .push(" LIMIT ")
            .push_bind(self.page.limit)
            .push(" OFFSET ")
            .push_bind(self.page.offset);

        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sql() {
        let query = PriorityFilter::default().build();
        let sql = query.sql();
        assert!(sql.contains("ORDER BY tp.rank ASC, tp.id ASC"));
        assert!(sql.trim_end().ends_with("LIMIT ? OFFSET ?"));
        assert!(!sql.contains("tp.feedback_id = ?"));
    }

    #[test]
    fn test_filters_bound() {
        let filter = PriorityFilter {
            feedback_id: Some(3),
            min_rank: Some(2),
            max_score: Some(80.0),
            sort: PrioritySort::ConsensusScore,
            order: SortOrder::Desc,
            ..Default::default()
        };
        let query = filter.build();
        let sql = query.sql();
        assert!(sql.contains("tp.feedback_id = ?"));
        assert!(sql.contains("tp.rank >= ?"));
        assert!(sql.contains("tp.consensus_score <= ?"));
        assert!(!sql.contains("tp.rank <= ?"));
        assert!(sql.contains("ORDER BY tp.consensus_score DESC"));
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!(PrioritySort::parse("consensusScore"), Some(PrioritySort::ConsensusScore));
        assert_eq!(PrioritySort::parse("rank"), Some(PrioritySort::Rank));
        assert_eq!(PrioritySort::parse("score"), None);
    }
}
