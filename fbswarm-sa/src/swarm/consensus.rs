//! Consensus aggregation across the five agent scores

use std::collections::BTreeSet;

use super::agents::{round_one_decimal, AgentType};
use super::analyzer::AgentScore;
use crate::error::SwarmError;

/// Arithmetic mean of one complete swarm run, rounded to one decimal
///
/// Requires exactly one score per agent type. Scores are used as stored
/// (already rounded), so the consensus is reproducible from the persisted
/// rows.
pub fn consensus_score(scores: &[AgentScore]) -> Result<f64, SwarmError> {
    let agents: BTreeSet<AgentType> = scores.iter().map(|s| s.agent_type).collect();
    if scores.len() != AgentType::ALL.len() || agents.len() != AgentType::ALL.len() {
        return Err(SwarmError::IncompleteSwarm {
            received: scores.len(),
            distinct: agents.len(),
        });
    }

    let sum: f64 = scores.iter().map(|s| s.score).sum();
    Ok(round_one_decimal(sum / scores.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(values: [f64; 5]) -> Vec<AgentScore> {
        AgentType::ALL
            .iter()
            .zip(values)
            .map(|(&agent, score)| AgentScore::new(agent, score))
            .collect()
    }

    #[test]
    fn test_mean_of_five() {
        let scores = run([85.0, 75.0, 30.0, 20.0, 50.0]);
        assert_eq!(consensus_score(&scores).unwrap(), 52.0);
    }

    #[test]
    fn test_mean_rounds_to_one_decimal() {
        // 263.3 / 5 = 52.66
        let scores = run([85.1, 75.2, 30.3, 20.4, 52.3]);
        assert_eq!(consensus_score(&scores).unwrap(), 52.7);
    }

    #[test]
    fn test_negative_scores_pull_mean_down() {
        let scores = run([40.0, 35.0, -20.0, 20.0, -25.0]);
        assert_eq!(consensus_score(&scores).unwrap(), 10.0);
    }

    #[test]
    fn test_missing_agent_rejected() {
        let mut scores = run([50.0; 5]);
        scores.pop();
        assert!(matches!(
            consensus_score(&scores),
            Err(SwarmError::IncompleteSwarm { received: 4, distinct: 4 })
        ));
    }

    #[test]
    fn test_duplicate_agent_rejected() {
        let mut scores = run([50.0; 5]);
        scores[4] = AgentScore::new(AgentType::Urgency, 50.0);
        assert!(matches!(
            consensus_score(&scores),
            Err(SwarmError::IncompleteSwarm { received: 5, distinct: 4 })
        ));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(consensus_score(&[]).is_err());
    }
}
