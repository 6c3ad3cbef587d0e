//! Per-target analysis state and the aggregate statistics derived from it.
//!
//! Each target moves through `Pending → InProgress → {Scored | Failed}`.
//! The state is a single enum so that "completed and in progress" or
//! "failed with a score" cannot be represented; the boolean accessors
//! ([`AnalysisResult::error`], [`AnalysisResult::completed`], …) are derived.

use serde::{Deserialize, Serialize};

/// Lower bound (inclusive) of the "good" band.
pub const GOOD_SCORE_MIN: u8 = 90;
/// Lower bound (inclusive) of the "average" band.
pub const AVERAGE_SCORE_MIN: u8 = 50;

/// Lifecycle of a single audited URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisState {
    Pending,
    InProgress,
    /// Completed with a performance score in `0..=100`.
    Scored(u8),
    /// Completed without a usable score.
    Failed,
}

impl AnalysisState {
    #[must_use]
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Scored(_) | Self::Failed)
    }

    /// Whether moving from `self` to `next` respects the lifecycle ordering.
    ///
    /// Only `Pending → InProgress` and `InProgress → Scored | Failed` are
    /// allowed; completed states are terminal.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress)
                | (Self::InProgress, Self::Scored(_) | Self::Failed)
        )
    }
}

/// Performance band a score falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreBand {
    /// 90 and above.
    Good,
    /// 50 up to (not including) 90.
    Average,
    /// Below 50.
    Poor,
}

impl ScoreBand {
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        if score >= GOOD_SCORE_MIN {
            Self::Good
        } else if score >= AVERAGE_SCORE_MIN {
            Self::Average
        } else {
            Self::Poor
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Good => "excellent",
            Self::Average => "average",
            Self::Poor => "poor",
        }
    }
}

impl std::fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Analysis outcome for one URL, keyed by `url`.
///
/// `business_name` and `location` are display labels carried over when the
/// target came from discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AnalysisRecord", into = "AnalysisRecord")]
pub struct AnalysisResult {
    pub url: String,
    pub state: AnalysisState,
    pub business_name: Option<String>,
    pub location: Option<String>,
}

impl AnalysisResult {
    #[must_use]
    pub fn pending(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: AnalysisState::Pending,
            business_name: None,
            location: None,
        }
    }

    #[must_use]
    pub fn scored(url: impl Into<String>, score: u8) -> Self {
        Self {
            state: AnalysisState::Scored(score.min(100)),
            ..Self::pending(url)
        }
    }

    #[must_use]
    pub fn failed(url: impl Into<String>) -> Self {
        Self {
            state: AnalysisState::Failed,
            ..Self::pending(url)
        }
    }

    #[must_use]
    pub fn score(&self) -> Option<u8> {
        match self.state {
            AnalysisState::Scored(score) => Some(score),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> bool {
        self.state == AnalysisState::Failed
    }

    #[must_use]
    pub fn in_progress(&self) -> bool {
        self.state == AnalysisState::InProgress
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.state.is_completed()
    }

    #[must_use]
    pub fn band(&self) -> Option<ScoreBand> {
        self.score().map(ScoreBand::from_score)
    }

    /// Moves to `next` if the lifecycle allows it. Returns `false` and leaves
    /// the state untouched otherwise.
    pub fn transition(&mut self, next: AnalysisState) -> bool {
        if self.state.can_transition_to(next) {
            self.state = next;
            true
        } else {
            false
        }
    }
}

/// Flat serialized form: `{url, score, error, loading, completed, ...}`.
#[derive(Clone, Serialize, Deserialize)]
struct AnalysisRecord {
    url: String,
    score: Option<u8>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    loading: bool,
    #[serde(default)]
    completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

impl From<AnalysisRecord> for AnalysisResult {
    fn from(record: AnalysisRecord) -> Self {
        let state = match (record.score, record.error) {
            (Some(score), false) => AnalysisState::Scored(score.min(100)),
            (_, true) => AnalysisState::Failed,
            (None, false) if record.completed => AnalysisState::Failed,
            (None, false) if record.loading => AnalysisState::InProgress,
            (None, false) => AnalysisState::Pending,
        };
        Self {
            url: record.url,
            state,
            business_name: record.business_name,
            location: record.location,
        }
    }
}

impl From<AnalysisResult> for AnalysisRecord {
    fn from(result: AnalysisResult) -> Self {
        Self {
            score: result.score(),
            error: result.error(),
            loading: result.in_progress(),
            completed: result.completed(),
            url: result.url,
            business_name: result.business_name,
            location: result.location,
        }
    }
}

/// Aggregate view over a set of results. Recomputed from scratch on demand.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnalysisStats {
    pub total: usize,
    pub completed: usize,
    /// Mean over completed results that have a score; `0.0` when none do.
    pub average_score: f64,
    pub good: usize,
    pub average: usize,
    pub poor: usize,
}

impl AnalysisStats {
    pub fn from_results<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a AnalysisResult>,
    {
        let mut stats = Self::default();
        let mut score_sum = 0u32;
        let mut scored = 0u32;

        for result in results {
            stats.total += 1;
            if result.completed() {
                stats.completed += 1;
            }
            if let Some(score) = result.score() {
                score_sum += u32::from(score);
                scored += 1;
                match ScoreBand::from_score(score) {
                    ScoreBand::Good => stats.good += 1,
                    ScoreBand::Average => stats.average += 1,
                    ScoreBand::Poor => stats.poor += 1,
                }
            }
        }

        if scored > 0 {
            stats.average_score = f64::from(score_sum) / f64::from(scored);
        }
        stats
    }

    /// Average rounded for display, or `None` before anything has completed.
    #[must_use]
    pub fn display_average(&self) -> Option<u32> {
        if self.completed == 0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rounded = self.average_score.round() as u32;
        Some(rounded)
    }

    /// Completed share of the total in `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.completed as f64 / self.total as f64;
        ratio
    }
}

#[cfg(test)]
#[path = "analysis_test.rs"]
mod tests;
