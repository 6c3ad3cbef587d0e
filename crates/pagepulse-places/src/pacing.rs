use std::time::Duration;

/// Fixed delays inserted between Places requests.
///
/// `post_page_token` is an upstream constraint: a freshly issued
/// `next_page_token` is rejected until it has had time to activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    /// Before every page after the first within a category.
    pub inter_page: Duration,
    /// Before the first page of each category after the first in a radius tier.
    pub inter_category: Duration,
    /// Before each place-details lookup.
    pub pre_details: Duration,
    /// After receiving a next-page token, before it is sent back.
    pub post_page_token: Duration,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            inter_page: Duration::from_secs(2),
            inter_category: Duration::from_secs(2),
            pre_details: Duration::from_millis(100),
            post_page_token: Duration::from_secs(2),
        }
    }
}

impl PacingPolicy {
    /// No delays at all. Only suitable against mock servers.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            inter_page: Duration::ZERO,
            inter_category: Duration::ZERO,
            pre_details: Duration::ZERO,
            post_page_token: Duration::ZERO,
        }
    }
}

pub(crate) async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
