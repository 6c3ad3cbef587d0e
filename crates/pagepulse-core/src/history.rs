use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::AnalysisResult;

/// A completed analysis as persisted in the history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: AnalysisResult,
}

impl HistoryEntry {
    /// Stamps `result` with a fresh id and the current time.
    #[must_use]
    pub fn new(result: AnalysisResult) -> Self {
        Self::at(result, Utc::now())
    }

    #[must_use]
    pub fn at(result: AnalysisResult, analyzed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            analyzed_at,
            result,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.result.url
    }
}
