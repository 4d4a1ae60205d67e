//! Lexical feature extraction
//!
//! Counts how many keywords of each family occur in a feedback item's text.
//! A keyword counts once no matter how often it repeats, and matches as a
//! plain substring ("crash" matches "crashing").

/// A fixed keyword list one or more agents score against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordFamily {
    /// Time pressure and outage words
    Urgent,
    /// Words implying many users are affected
    Breadth,
    /// Negative sentiment
    Negative,
    /// Positive sentiment (offsets `Negative`)
    Positive,
    /// Novel or innovative requests
    Novelty,
    /// Small, cheap changes (offsets `Complexity`)
    Simplicity,
    /// Large, expensive changes
    Complexity,
}

impl KeywordFamily {
    pub const ALL: [KeywordFamily; 7] = [
        KeywordFamily::Urgent,
        KeywordFamily::Breadth,
        KeywordFamily::Negative,
        KeywordFamily::Positive,
        KeywordFamily::Novelty,
        KeywordFamily::Simplicity,
        KeywordFamily::Complexity,
    ];

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            KeywordFamily::Urgent => &[
                "critical", "urgent", "immediate", "asap", "now", "crash", "broken", "down",
                "blocking",
            ],
            KeywordFamily::Breadth => &[
                "all users", "everyone", "entire", "widespread", "major", "critical", "important",
            ],
            KeywordFamily::Negative => &[
                "frustrated", "angry", "hate", "terrible", "awful", "horrible", "unusable",
            ],
            KeywordFamily::Positive => &["love", "great", "excellent", "awesome", "amazing"],
            KeywordFamily::Novelty => &[
                "new", "innovative", "unique", "different", "novel", "creative", "never",
            ],
            KeywordFamily::Simplicity => &["simple", "easy", "quick", "small", "minor"],
            KeywordFamily::Complexity => &["complex", "difficult", "major", "redesign", "rebuild"],
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-family keyword hit counts for one text blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureCounts {
    counts: [u32; 7],
}

impl FeatureCounts {
    /// Extract counts from a feedback item's title and description
    pub fn from_feedback(title: &str, description: &str) -> Self {
        Self::extract(&format!("{} {}", title, description))
    }

    /// Extract counts for every family from arbitrary text
    pub fn extract(text: &str) -> Self {
        let lowered = text.to_lowercase();
        let mut counts = [0u32; 7];
        for family in KeywordFamily::ALL {
            counts[family.index()] = count_matches(&lowered, family);
        }
        Self { counts }
    }

    /// Build counts directly, mostly useful in tests
    pub fn with(mut self, family: KeywordFamily, hits: u32) -> Self {
        self.counts[family.index()] = hits;
        self
    }

    pub fn get(&self, family: KeywordFamily) -> u32 {
        self.counts[family.index()]
    }
}

/// Number of distinct keywords of `family` present in already-lowercased text
pub fn count_matches(lowered: &str, family: KeywordFamily) -> u32 {
    family
        .keywords()
        .iter()
        .filter(|keyword| lowered.contains(*keyword))
        .count() as u32
}
