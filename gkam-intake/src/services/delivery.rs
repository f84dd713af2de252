//! Album delivery with bounded retry and per-item fallback
//!
//! The core only produces albums; a chat transport sends them. Transports
//! implement [`MediaTransport`] and get the retry/fallback policy from
//! [`deliver_albums`]: each album goes out as one group, transient failures
//! are retried a bounded number of times, and an album the transport rejects
//! (too large, or still failing after the retries) is sent item by item.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Album, MediaRef};

/// Transport send failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Group refused because of its size or composition; retrying won't help
    #[error("media group rejected as too large")]
    TooLarge,

    /// Request refused for another permanent reason
    #[error("rejected: {0}")]
    Rejected(String),

    /// Network or timeout problem; worth retrying
    #[error("transient failure: {0}")]
    Transient(String),
}

impl TransportError {
    fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Transient(_))
    }
}

/// Outbound media sending capability of a chat transport
#[async_trait]
pub trait MediaTransport: Send + Sync {
    /// Send `items` to `target` as one grouped batch
    async fn send_group(&self, target: &str, items: &[MediaRef]) -> Result<(), TransportError>;

    /// Send a single item to `target`
    async fn send_single(&self, target: &str, item: &MediaRef) -> Result<(), TransportError>;
}

/// Retry settings for delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per send, first try included (at least 1)
    pub max_attempts: u32,
    /// Pause between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Outcome of delivering a set of albums
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Albums delivered as a single group
    pub groups_sent: usize,
    /// Albums that fell back to individual sends
    pub groups_fallen_back: usize,
    /// Items that could not be sent even individually
    pub items_failed: usize,
}

impl DeliveryReport {
    pub fn is_complete(&self) -> bool {
        self.items_failed == 0
    }
}

/// Deliver `albums` to `target` in order
///
/// Never aborts early: a failing album does not stop the ones after it.
pub async fn deliver_albums(
    transport: &dyn MediaTransport,
    target: &str,
    albums: &[Album],
    policy: RetryPolicy,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    for (index, album) in albums.iter().enumerate() {
        let group_result =
            with_retry(policy, move || transport.send_group(target, album.items())).await;

        match group_result {
            Ok(()) => {
                debug!(target = %target, album = index, items = album.len(), "Album sent");
                report.groups_sent += 1;
            }
            Err(e) => {
                warn!(
                    target = %target,
                    album = index,
                    "Album send failed ({}), sending items individually",
                    e
                );
                report.groups_fallen_back += 1;
                for item in album.items() {
                    let item_result =
                        with_retry(policy, move || transport.send_single(target, item)).await;
                    if let Err(e) = item_result {
                        warn!(
                            target = %target,
                            reference = %item.reference,
                            "Individual send failed: {}",
                            e
                        );
                        report.items_failed += 1;
                    }
                }
            }
        }
    }

    report
}

async fn with_retry<F, Fut>(policy: RetryPolicy, mut send: F) -> Result<(), TransportError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<(), TransportError>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match send().await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_retryable() && attempt < attempts => {
                debug!(attempt, "Transient send failure, retrying: {}", e);
                attempt += 1;
                tokio::time::sleep(policy.backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
}
