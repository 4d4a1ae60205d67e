//! Human-readable explanations for agent scores

use super::agents::AgentType;

/// Score band a reasoning template is chosen for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    High,
    Medium,
    Low,
}

impl Band {
    pub const HIGH_THRESHOLD: f64 = 70.0;
    pub const MEDIUM_THRESHOLD: f64 = 40.0;

    /// `High` at 70 and above, `Medium` from 40, `Low` below that
    pub fn of(score: f64) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            Band::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            Band::Medium
        } else {
            Band::Low
        }
    }
}

/// Fixed explanation for an agent's score
pub fn reasoning_for(agent: AgentType, score: f64) -> &'static str {
    template(agent, Band::of(score))
}

pub fn template(agent: AgentType, band: Band) -> &'static str {
    use AgentType::*;
    use Band::*;

    match (agent, band) {
        (Urgency, High) => "Time-sensitive issue that needs immediate attention. The wording points to something blocking or critical.",
        (Urgency, Medium) => "Moderate urgency. Worth addressing in the near term, but nothing is blocked right now.",
        (Urgency, Low) => "No sign of time pressure. Can be scheduled according to the other priority factors.",

        (Impact, High) => "Likely affects a large share of users or core functionality. Expect high business impact.",
        (Impact, Medium) => "Appears to affect a moderate group of users or a non-critical feature.",
        (Impact, Low) => "Limited impact. Touches a small user segment or an edge case.",

        (Sentiment, High) => "Strongly negative tone. The customer is clearly frustrated or dissatisfied.",
        (Sentiment, Medium) => "Some concern in the customer's tone, but the dissatisfaction is not severe.",
        (Sentiment, Low) => "Neutral or positive tone. Constructive feedback without strong negative emotion.",

        (Novelty, High) => "Unusual or innovative request that could set the product apart from competitors.",
        (Novelty, Medium) => "Has some novel elements but resembles existing features or common requests.",
        (Novelty, Low) => "Standard request following familiar patterns. Little innovation potential.",

        (Effort, High) => "Implementation looks complex and would take significant development time and resources.",
        (Effort, Medium) => "Moderate effort. Normal development complexity with a few technical challenges.",
        (Effort, Low) => "Looks simple to implement. Can probably be handled quickly with existing infrastructure.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(Band::of(100.0), Band::High);
        assert_eq!(Band::of(70.0), Band::High);
        assert_eq!(Band::of(69.9), Band::Medium);
        assert_eq!(Band::of(40.0), Band::Medium);
        assert_eq!(Band::of(39.9), Band::Low);
        assert_eq!(Band::of(-20.0), Band::Low);
    }

    #[test]
    fn test_every_template_is_distinct() {
        let mut seen = std::collections::HashSet::new();
        for agent in AgentType::ALL {
            for band in [Band::High, Band::Medium, Band::Low] {
                let text = template(agent, band);
                assert!(!text.is_empty());
                assert!(seen.insert(text), "duplicate template for {} {:?}", agent, band);
            }
        }
        assert_eq!(seen.len(), 15);
    }

    #[test]
    fn test_reasoning_follows_band() {
        assert_eq!(
            reasoning_for(AgentType::Urgency, 85.0),
            template(AgentType::Urgency, Band::High)
        );
        assert_eq!(
            reasoning_for(AgentType::Effort, 45.0),
            template(AgentType::Effort, Band::Medium)
        );
        assert_eq!(
            reasoning_for(AgentType::Sentiment, -5.0),
            template(AgentType::Sentiment, Band::Low)
        );
    }
}
