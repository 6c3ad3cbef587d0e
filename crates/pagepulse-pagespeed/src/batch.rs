//! Batch orchestration over a target list.
//!
//! Every target runs as its own future, started `index × stagger` after the
//! batch begins. Workers never touch shared state: they send
//! [`ResultUpdate`]s over a channel to a single coordinator loop, which owns
//! the [`ResultBoard`], records successes to history, and notifies the
//! observer. Both sides are polled together on the caller's task.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::future::join_all;
use futures::FutureExt;
use pagepulse_core::{AnalysisResult, AnalysisState, AnalysisStats, TargetList};
use pagepulse_store::HistoryStore;
use tokio::sync::mpsc;

use crate::client::ScoreGateway;

pub const DEFAULT_STAGGER: Duration = Duration::from_secs(1);

/// A state change for one URL, sent from a worker to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultUpdate {
    pub url: String,
    pub state: AnalysisState,
}

/// Per-URL results in target order, keyed by URL.
#[derive(Debug, Clone)]
pub struct ResultBoard {
    results: Vec<AnalysisResult>,
    index: HashMap<String, usize>,
}

impl ResultBoard {
    /// One pending result per target, carrying any discovery labels.
    #[must_use]
    pub fn new(targets: &TargetList) -> Self {
        let mut results = Vec::with_capacity(targets.len());
        let mut index = HashMap::with_capacity(targets.len());
        for url in targets.urls() {
            let mut result = AnalysisResult::pending(url.as_str());
            if let Some(label) = targets.label(url) {
                result.business_name.clone_from(&label.business_name);
                result.location.clone_from(&label.location);
            }
            index.insert(url.clone(), results.len());
            results.push(result);
        }
        Self { results, index }
    }

    /// Merges `update` into the entry for its URL.
    ///
    /// Returns `false` for unknown URLs and for transitions the lifecycle
    /// forbids (skipping `InProgress`, or anything after completion).
    pub fn apply(&mut self, update: &ResultUpdate) -> bool {
        let Some(&position) = self.index.get(&update.url) else {
            tracing::warn!(url = %update.url, "update for unknown url ignored");
            return false;
        };
        self.results[position].transition(update.state)
    }

    #[must_use]
    pub fn get(&self, url: &str) -> Option<&AnalysisResult> {
        self.index.get(url).map(|&position| &self.results[position])
    }

    #[must_use]
    pub fn results(&self) -> &[AnalysisResult] {
        &self.results
    }

    #[must_use]
    pub fn stats(&self) -> AnalysisStats {
        AnalysisStats::from_results(&self.results)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.results.iter().all(AnalysisResult::completed)
    }

    #[must_use]
    pub fn into_results(self) -> Vec<AnalysisResult> {
        self.results
    }
}

type Observer<'a> = Box<dyn FnMut(&ResultBoard, &AnalysisResult) + 'a>;

/// Runs one scoring call per target and reconciles the outcomes.
pub struct BatchAnalyzer<'a> {
    gateway: &'a dyn ScoreGateway,
    stagger: Duration,
    history: Option<&'a HistoryStore>,
    observer: Option<Observer<'a>>,
}

impl<'a> BatchAnalyzer<'a> {
    #[must_use]
    pub fn new(gateway: &'a dyn ScoreGateway) -> Self {
        Self {
            gateway,
            stagger: DEFAULT_STAGGER,
            history: None,
            observer: None,
        }
    }

    /// Delay between consecutive target start times.
    #[must_use]
    pub fn stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    /// Records every successfully scored result into `history`.
    #[must_use]
    pub fn history(mut self, history: &'a HistoryStore) -> Self {
        self.history = Some(history);
        self
    }

    /// Called after each accepted update with the board and the changed result.
    #[must_use]
    pub fn on_update<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&ResultBoard, &AnalysisResult) + 'a,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Scores every target and returns the final board, in which every
    /// result is completed.
    pub async fn run(self, targets: &TargetList) -> ResultBoard {
        let Self {
            gateway,
            stagger,
            history,
            mut observer,
        } = self;

        let mut board = ResultBoard::new(targets);
        let (tx, mut rx) = mpsc::unbounded_channel::<ResultUpdate>();

        tracing::info!(targets = targets.len(), stagger = ?stagger, "batch analysis started");

        let workers = join_all(targets.urls().iter().enumerate().map(|(index, url)| {
            let delay = stagger.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX));
            analyze_target(gateway, targets.credential(), url, delay, tx.clone())
        }));
        // Workers hold the only remaining senders; the coordinator ends when they finish.
        drop(tx);

        let coordinator = async {
            while let Some(update) = rx.recv().await {
                if !board.apply(&update) {
                    continue;
                }
                let Some(result) = board.get(&update.url) else {
                    continue;
                };

                if let (Some(store), AnalysisState::Scored(_)) = (history, update.state) {
                    if let Err(err) = store.record(result) {
                        tracing::warn!(url = %update.url, error = %err, "failed to record history entry");
                    }
                }
                if let Some(observer) = observer.as_mut() {
                    observer(&board, result);
                }
            }
        };

        tokio::join!(workers, coordinator);

        let stats = board.stats();
        tracing::info!(
            completed = stats.completed,
            good = stats.good,
            average = stats.average,
            poor = stats.poor,
            "batch analysis finished"
        );
        board
    }
}

async fn analyze_target(
    gateway: &dyn ScoreGateway,
    credential: &str,
    url: &str,
    delay: Duration,
    tx: mpsc::UnboundedSender<ResultUpdate>,
) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let _ = tx.send(ResultUpdate {
        url: url.to_string(),
        state: AnalysisState::InProgress,
    });

    let state = match AssertUnwindSafe(gateway.analyze(url, credential))
        .catch_unwind()
        .await
    {
        Ok(outcome) => outcome.state(),
        Err(_) => {
            tracing::error!(url, "scoring panicked; recording as failed");
            AnalysisState::Failed
        }
    };

    let _ = tx.send(ResultUpdate {
        url: url.to_string(),
        state,
    });
}
