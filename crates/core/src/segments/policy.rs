//! Duration and labelling constraints for one kind of search.

use serde::{Deserialize, Serialize};

/// Inclusive bounds of the relevance score the oracle is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreScale {
    pub min: f64,
    pub max: f64,
}

impl ScoreScale {
    /// Bring `score` into the scale. Reversed bounds are swapped and NaN
    /// bounds are ignored, so this never panics.
    pub fn clamp(&self, score: f64) -> f64 {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        score.max(lo).min(hi)
    }
}

/// Constraints a proposed segment must satisfy.
/// `preferred_range` only shapes the prompt; the hard bounds are
/// `minimum_seconds` and `maximum_seconds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationPolicy {
    pub minimum_seconds: f64,
    pub maximum_seconds: f64,
    pub preferred_range: (f64, f64),
    #[serde(default)]
    pub max_title_words: Option<usize>,
    #[serde(default)]
    pub score_scale: Option<ScoreScale>,
}

impl DurationPolicy {
    /// Segments answering a user query: 10 s to 2 min, scored 1-10.
    pub fn query_search() -> Self {
        Self {
            minimum_seconds: 10.0,
            maximum_seconds: 120.0,
            preferred_range: (15.0, 60.0),
            max_title_words: Some(10),
            score_scale: Some(ScoreScale { min: 1.0, max: 10.0 }),
        }
    }

    /// Short shareable moments: 15 s to 1:20, unscored.
    pub fn viral() -> Self {
        Self {
            minimum_seconds: 15.0,
            maximum_seconds: 80.0,
            preferred_range: (20.0, 45.0),
            max_title_words: Some(7),
            score_scale: None,
        }
    }

    pub fn minimum_ms(&self) -> u64 {
        seconds_to_ms(self.minimum_seconds)
    }

    pub fn maximum_ms(&self) -> u64 {
        seconds_to_ms(self.maximum_seconds)
    }

    /// Whether a duration in milliseconds lies inside the hard bounds.
    pub fn accepts(&self, duration_ms: u64) -> bool {
        (self.minimum_ms()..=self.maximum_ms()).contains(&duration_ms)
    }
}

fn seconds_to_ms(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0).round() as u64
}
