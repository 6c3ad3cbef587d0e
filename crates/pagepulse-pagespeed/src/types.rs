use pagepulse_core::AnalysisState;
use serde::Deserialize;

/// The parts of a `runPagespeed` response the scorer reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpeedResponse {
    #[serde(default)]
    pub lighthouse_result: Option<LighthouseResult>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

impl PageSpeedResponse {
    /// `lighthouseResult.categories.performance.score`, a fraction in `0..=1`.
    #[must_use]
    pub fn performance_score(&self) -> Option<f64> {
        self.lighthouse_result
            .as_ref()?
            .categories
            .as_ref()?
            .performance
            .as_ref()?
            .score
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref()?.message.as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LighthouseResult {
    #[serde(default)]
    pub categories: Option<Categories>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Categories {
    #[serde(default)]
    pub performance: Option<CategoryScore>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryScore {
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Result of scoring one URL. `error` is set exactly when `score` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreOutcome {
    pub url: String,
    pub score: Option<u8>,
    pub error: bool,
}

impl ScoreOutcome {
    #[must_use]
    pub fn scored(url: impl Into<String>, score: u8) -> Self {
        Self {
            url: url.into(),
            score: Some(score.min(100)),
            error: false,
        }
    }

    #[must_use]
    pub fn failed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            score: None,
            error: true,
        }
    }

    /// The completed lifecycle state this outcome maps to.
    #[must_use]
    pub fn state(&self) -> AnalysisState {
        match self.score {
            Some(score) if !self.error => AnalysisState::Scored(score),
            _ => AnalysisState::Failed,
        }
    }
}
