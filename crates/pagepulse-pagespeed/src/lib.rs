//! PageSpeed Insights scoring and the batch orchestrator that fans audits out
//! over a target list.

pub mod batch;
pub mod client;
pub mod error;
pub mod types;

pub use batch::{BatchAnalyzer, ResultBoard, ResultUpdate};
pub use client::{scale_score, PageSpeedClient, ScoreGateway};
pub use error::PageSpeedError;
pub use types::{PageSpeedResponse, ScoreOutcome};
