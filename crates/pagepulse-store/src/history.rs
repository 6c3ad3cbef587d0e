//! Analysis history persisted under a single key of a [`KeyValueStore`].
//!
//! The stored value is a JSON array of [`HistoryEntry`], most recent first,
//! holding at most one entry per URL.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use pagepulse_core::{AnalysisResult, AnalysisStats, HistoryEntry, ScoreBand};

use crate::error::StoreError;
use crate::kv::KeyValueStore;

pub const HISTORY_STORAGE_KEY: &str = "pagespeed_analysis_history";
pub const HISTORY_CAPACITY: usize = 100;

/// Which entries a history listing includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    Good,
    Average,
    Poor,
}

impl HistoryFilter {
    /// Band filters only match entries that have a score.
    #[must_use]
    pub fn matches(self, entry: &HistoryEntry) -> bool {
        let band = entry.result.band();
        match self {
            Self::All => true,
            Self::Good => band == Some(ScoreBand::Good),
            Self::Average => band == Some(ScoreBand::Average),
            Self::Poor => band == Some(ScoreBand::Poor),
        }
    }
}

impl FromStr for HistoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "good" => Ok(Self::Good),
            "average" => Ok(Self::Average),
            "poor" => Ok(Self::Poor),
            other => Err(format!(
                "unknown filter '{other}', expected all, good, average or poor"
            )),
        }
    }
}

/// Ordering of a history listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistorySort {
    /// Newest first.
    #[default]
    Date,
    /// Highest score first; unscored entries sort as zero.
    Score,
    /// Alphabetical by URL.
    Url,
}

impl HistorySort {
    pub fn apply(self, entries: &mut [HistoryEntry]) {
        match self {
            Self::Date => entries.sort_by(|a, b| b.analyzed_at.cmp(&a.analyzed_at)),
            Self::Score => entries.sort_by(|a, b| {
                b.result
                    .score()
                    .unwrap_or(0)
                    .cmp(&a.result.score().unwrap_or(0))
            }),
            Self::Url => entries.sort_by(|a, b| a.result.url.cmp(&b.result.url)),
        }
    }
}

impl FromStr for HistorySort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(Self::Date),
            "score" => Ok(Self::Score),
            "url" => Ok(Self::Url),
            other => Err(format!(
                "unknown sort '{other}', expected date, score or url"
            )),
        }
    }
}

pub struct HistoryStore {
    store: Box<dyn KeyValueStore>,
    capacity: usize,
    /// Held across every read-modify-write of the history key.
    write_lock: Mutex<()>,
}

impl HistoryStore {
    #[must_use]
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            capacity: HISTORY_CAPACITY,
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// All stored entries, most recent first.
    ///
    /// Unreadable history is logged and treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the backing storage cannot be read.
    pub fn entries(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        let raw = match self.store.get(HISTORY_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Vec::new()),
            Err(StoreError::Corrupt { path, source }) => {
                tracing::warn!(path = %path, error = %source, "storage file unreadable; history treated as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(error = %e, "stored history is corrupt; treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Stores `result` as the newest entry, replacing any entry for the same URL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the history cannot be read or written back.
    pub fn record(&self, result: &AnalysisResult) -> Result<HistoryEntry, StoreError> {
        self.record_at(result, Utc::now())
    }

    /// [`HistoryStore::record`] with an explicit analysis time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the history cannot be read or written back.
    pub fn record_at(
        &self,
        result: &AnalysisResult,
        analyzed_at: DateTime<Utc>,
    ) -> Result<HistoryEntry, StoreError> {
        let entry = HistoryEntry::at(result.clone(), analyzed_at);

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.entries()?;
        entries.retain(|existing| existing.result.url != entry.result.url);
        entries.insert(0, entry.clone());
        entries.truncate(self.capacity);

        let raw = serde_json::to_string(&entries).map_err(|e| StoreError::Serialize {
            key: HISTORY_STORAGE_KEY.to_string(),
            source: e,
        })?;
        self.store.set(HISTORY_STORAGE_KEY, &raw)?;

        tracing::debug!(url = %entry.result.url, total = entries.len(), "history entry recorded");
        Ok(entry)
    }

    /// # Errors
    ///
    /// Returns [`StoreError`] if the key cannot be removed.
    pub fn clear(&self) -> Result<(), StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.store.remove(HISTORY_STORAGE_KEY)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the backing storage cannot be read.
    pub fn contains_url(&self, url: &str) -> Result<bool, StoreError> {
        Ok(self.entries()?.iter().any(|entry| entry.result.url == url))
    }

    /// Distinct URLs in history, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the backing storage cannot be read.
    pub fn unique_urls(&self) -> Result<Vec<String>, StoreError> {
        let mut seen = HashSet::new();
        Ok(self
            .entries()?
            .into_iter()
            .map(|entry| entry.result.url)
            .filter(|url| seen.insert(url.clone()))
            .collect())
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the backing storage cannot be read.
    pub fn query(
        &self,
        filter: HistoryFilter,
        sort: HistorySort,
    ) -> Result<Vec<HistoryEntry>, StoreError> {
        let mut entries: Vec<HistoryEntry> = self
            .entries()?
            .into_iter()
            .filter(|entry| filter.matches(entry))
            .collect();
        sort.apply(&mut entries);
        Ok(entries)
    }

    /// Aggregate statistics over every stored entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the backing storage cannot be read.
    pub fn stats(&self) -> Result<AnalysisStats, StoreError> {
        let entries = self.entries()?;
        Ok(AnalysisStats::from_results(
            entries.iter().map(|entry| &entry.result),
        ))
    }
}
