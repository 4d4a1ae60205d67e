//! One swarm run over a feedback item's text

use serde::Serialize;

use super::agents::AgentType;
use super::consensus::consensus_score;
use super::features::FeatureCounts;
use super::jitter::JitterSource;
use super::reasoning::reasoning_for;
use crate::error::SwarmError;

/// A single agent's verdict on one feedback item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentScore {
    pub agent_type: AgentType,
    /// Rounded to one decimal
    pub score: f64,
    pub reasoning: String,
}

impl AgentScore {
    /// Pair a score with the reasoning template for its band
    pub fn new(agent: AgentType, score: f64) -> Self {
        Self {
            agent_type: agent,
            score,
            reasoning: reasoning_for(agent, score).to_string(),
        }
    }
}

/// Result of running all five agents
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwarmAnalysis {
    /// One entry per agent, in [`AgentType::ALL`] order
    pub scores: Vec<AgentScore>,
    pub consensus_score: f64,
}

impl SwarmAnalysis {
    pub fn score_for(&self, agent: AgentType) -> Option<&AgentScore> {
        self.scores.iter().find(|s| s.agent_type == agent)
    }
}

/// Score a feedback item with every agent and aggregate the results
///
/// Pure apart from the jitter source: nothing is persisted here.
pub fn analyze(
    title: &str,
    description: &str,
    jitter: &mut dyn JitterSource,
) -> Result<SwarmAnalysis, SwarmError> {
    let features = FeatureCounts::from_feedback(title, description);

    let scores: Vec<AgentScore> = AgentType::ALL
        .iter()
        .map(|&agent| AgentScore::new(agent, agent.score(&features, jitter)))
        .collect();

    let consensus_score = consensus_score(&scores)?;
    Ok(SwarmAnalysis {
        scores,
        consensus_score,
    })
}
