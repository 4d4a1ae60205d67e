//! The five scoring agents
//!
//! Every agent follows the same shape:
//!
//! ```text
//! score = min(100, base + boost_weight * boost_hits - damp_weight * damp_hits + jitter)
//! ```
//!
//! Only `sentiment` and `effort` have a damping family. There is no lower
//! clamp, so those two can go negative when only damping keywords match.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::features::{FeatureCounts, KeywordFamily};
use super::jitter::JitterSource;
use crate::error::SwarmError;

/// Upper bound applied to every agent score
pub const SCORE_CEILING: f64 = 100.0;

/// One of the five heuristic scorers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    Urgency,
    Impact,
    Sentiment,
    Novelty,
    Effort,
}

impl AgentType {
    /// All agents, in the order a swarm run evaluates them
    pub const ALL: [AgentType; 5] = [
        AgentType::Urgency,
        AgentType::Impact,
        AgentType::Sentiment,
        AgentType::Novelty,
        AgentType::Effort,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AgentType::Urgency => "urgency",
            AgentType::Impact => "impact",
            AgentType::Sentiment => "sentiment",
            AgentType::Novelty => "novelty",
            AgentType::Effort => "effort",
        }
    }

    /// Scoring weights for this agent
    pub fn rule(self) -> ScoringRule {
        match self {
            AgentType::Urgency => ScoringRule {
                base: 40.0,
                boost: (KeywordFamily::Urgent, 15.0),
                damp: None,
                jitter_span: 30.0,
            },
            AgentType::Impact => ScoringRule {
                base: 35.0,
                boost: (KeywordFamily::Breadth, 20.0),
                damp: None,
                jitter_span: 35.0,
            },
            AgentType::Sentiment => ScoringRule {
                base: 30.0,
                boost: (KeywordFamily::Negative, 25.0),
                damp: Some((KeywordFamily::Positive, 10.0)),
                jitter_span: 30.0,
            },
            AgentType::Novelty => ScoringRule {
                base: 20.0,
                boost: (KeywordFamily::Novelty, 15.0),
                damp: None,
                jitter_span: 50.0,
            },
            AgentType::Effort => ScoringRule {
                base: 50.0,
                boost: (KeywordFamily::Complexity, 20.0),
                damp: Some((KeywordFamily::Simplicity, 15.0)),
                jitter_span: 30.0,
            },
        }
    }

    /// Score this agent's view of the given features
    ///
    /// The result is rounded to one decimal, which is the precision stored
    /// and reported.
    pub fn score(self, features: &FeatureCounts, jitter: &mut dyn JitterSource) -> f64 {
        round_one_decimal(self.rule().evaluate(features, jitter))
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentType {
    type Err = SwarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "urgency" => Ok(AgentType::Urgency),
            "impact" => Ok(AgentType::Impact),
            "sentiment" => Ok(AgentType::Sentiment),
            "novelty" => Ok(AgentType::Novelty),
            "effort" => Ok(AgentType::Effort),
            other => Err(SwarmError::InvalidAgentType(other.to_string())),
        }
    }
}

/// Weights for one agent's linear keyword formula
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringRule {
    pub base: f64,
    /// Family that raises the score, with its per-hit weight
    pub boost: (KeywordFamily, f64),
    /// Family that lowers the score, with its per-hit weight
    pub damp: Option<(KeywordFamily, f64)>,
    /// Jitter is drawn from `[0, jitter_span)`
    pub jitter_span: f64,
}

impl ScoringRule {
    /// Unrounded score, capped at [`SCORE_CEILING`]
    pub fn evaluate(&self, features: &FeatureCounts, jitter: &mut dyn JitterSource) -> f64 {
        let (boost_family, boost_weight) = self.boost;
        let mut score = self.base + boost_weight * f64::from(features.get(boost_family));

        if let Some((damp_family, damp_weight)) = self.damp {
            score -= damp_weight * f64::from(features.get(damp_family));
        }

        score += jitter.sample(self.jitter_span);
        score.min(SCORE_CEILING)
    }
}

/// Round half away from zero to one decimal place
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swarm::jitter::{FixedJitter, RandomJitter};

    fn zero() -> FixedJitter {
        FixedJitter::zero()
    }

    #[test]
    fn test_base_scores_without_keywords() {
        let features = FeatureCounts::default();
        let expected = [
            (AgentType::Urgency, 40.0),
            (AgentType::Impact, 35.0),
            (AgentType::Sentiment, 30.0),
            (AgentType::Novelty, 20.0),
            (AgentType::Effort, 50.0),
        ];
        for (agent, base) in expected {
            assert_eq!(agent.score(&features, &mut zero()), base, "{}", agent);
        }
    }

    #[test]
    fn test_keyword_weights() {
        let features = FeatureCounts::default()
            .with(KeywordFamily::Urgent, 2)
            .with(KeywordFamily::Breadth, 1)
            .with(KeywordFamily::Negative, 1)
            .with(KeywordFamily::Positive, 1)
            .with(KeywordFamily::Novelty, 3)
            .with(KeywordFamily::Complexity, 1)
            .with(KeywordFamily::Simplicity, 2);

        assert_eq!(AgentType::Urgency.score(&features, &mut zero()), 70.0);
        assert_eq!(AgentType::Impact.score(&features, &mut zero()), 55.0);
        assert_eq!(AgentType::Sentiment.score(&features, &mut zero()), 45.0);
        assert_eq!(AgentType::Novelty.score(&features, &mut zero()), 65.0);
        assert_eq!(AgentType::Effort.score(&features, &mut zero()), 40.0);
    }

    #[test]
    fn test_ceiling_applied() {
        let features = FeatureCounts::default().with(KeywordFamily::Urgent, 9);
        // 40 + 135 + jitter would be far above the ceiling
        assert_eq!(AgentType::Urgency.score(&features, &mut FixedJitter::new(0.9)), 100.0);
    }

    #[test]
    fn test_sentiment_has_no_lower_clamp() {
        let features = FeatureCounts::default().with(KeywordFamily::Positive, 5);
        // 30 - 50 = -20: preserved, not clamped to zero
        assert_eq!(AgentType::Sentiment.score(&features, &mut zero()), -20.0);
    }

    #[test]
    fn test_effort_has_no_lower_clamp() {
        let features = FeatureCounts::default().with(KeywordFamily::Simplicity, 5);
        // 50 - 75 = -25
        assert_eq!(AgentType::Effort.score(&features, &mut zero()), -25.0);
    }

    #[test]
    fn test_jitter_spans() {
        let features = FeatureCounts::default();
        let mut half = FixedJitter::new(0.5);
        assert_eq!(AgentType::Urgency.score(&features, &mut half), 55.0);
        assert_eq!(AgentType::Impact.score(&features, &mut half), 52.5);
        assert_eq!(AgentType::Sentiment.score(&features, &mut half), 45.0);
        assert_eq!(AgentType::Novelty.score(&features, &mut half), 45.0);
        assert_eq!(AgentType::Effort.score(&features, &mut half), 65.0);
    }

    #[test]
    fn test_random_scores_bounded() {
        let features = FeatureCounts::default();
        let mut jitter = RandomJitter::seeded(99);
        for _ in 0..200 {
            for agent in AgentType::ALL {
                let rule = agent.rule();
                let score = agent.score(&features, &mut jitter);
                assert!(score >= rule.base, "{} below base: {}", agent, score);
                assert!(score <= rule.base + rule.jitter_span, "{} above span: {}", agent, score);
            }
        }
    }

    #[test]
    fn test_parse_agent_type() {
        assert_eq!("urgency".parse::<AgentType>().unwrap(), AgentType::Urgency);
        assert_eq!(" effort ".parse::<AgentType>().unwrap(), AgentType::Effort);
        assert!(matches!(
            "priority".parse::<AgentType>(),
            Err(SwarmError::InvalidAgentType(name)) if name == "priority"
        ));
        // Case matters, matching the stored values
        assert!("Urgency".parse::<AgentType>().is_err());
    }

    #[test]
    fn test_display_round_trips_parse() {
        for agent in AgentType::ALL {
            assert_eq!(agent.to_string().parse::<AgentType>().unwrap(), agent);
        }
    }

    #[test]
    fn test_round_one_decimal() {
        assert_eq!(round_one_decimal(72.34), 72.3);
        assert_eq!(round_one_decimal(72.35000001), 72.4);
        assert_eq!(round_one_decimal(-20.04), -20.0);
        assert_eq!(round_one_decimal(100.0), 100.0);
    }
}
