//! Swarm consensus scoring
//!
//! Five heuristic agents score a feedback item from keyword hits plus a
//! bounded random perturbation. Their mean is the consensus score that the
//! ranking store persists.

pub mod agents;
pub mod analyzer;
pub mod consensus;
pub mod features;
pub mod jitter;
pub mod reasoning;
pub mod runner;

pub use agents::{round_one_decimal, AgentType, ScoringRule, SCORE_CEILING};
pub use analyzer::{analyze, AgentScore, SwarmAnalysis};
pub use consensus::consensus_score;
pub use features::{FeatureCounts, KeywordFamily};
pub use jitter::{FixedJitter, JitterSource, RandomJitter};
pub use reasoning::{reasoning_for, Band};
pub use runner::{SharedJitter, SwarmRunner};
