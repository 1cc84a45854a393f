//! Bounded polling for media references that have no public URL yet.
//!
//! Uploads finish before the store derives a stable URL for the asset and
//! nothing notifies us when it does, so [`resolve`] asks repeatedly at a
//! fixed interval. Running out of attempts yields
//! [`MediaResolution::Unresolved`], which callers treat as a valid,
//! partially-complete state rather than a failure.

use std::time::Duration;

use atelier_core::MediaRef;
use atelier_store::ObjectStore;
use futures::future::join_all;

/// Attempt budget and spacing for one reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Total number of resolution requests, including the first.
    pub max_attempts: u32,
    /// Sleep between consecutive attempts.
    pub interval: Duration,
}

impl PollPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, interval_ms: u64) -> Self {
        Self {
            max_attempts,
            interval: Duration::from_millis(interval_ms),
        }
    }
}

impl Default for PollPolicy {
    /// 30 attempts at 1 s spacing, roughly 30 s per asset in the worst case.
    fn default() -> Self {
        Self::new(30, 1_000)
    }
}

/// Terminal state of polling one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaResolution {
    Resolved(String),
    Unresolved,
}

impl MediaResolution {
    #[must_use]
    pub fn into_url(self) -> Option<String> {
        match self {
            MediaResolution::Resolved(url) => Some(url),
            MediaResolution::Unresolved => None,
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, MediaResolution::Resolved(_))
    }
}

/// Polls the store until `reference` has a public URL or the budget runs out.
///
/// A transient store failure (see [`StoreError::is_retryable`]) is logged and
/// consumes that attempt. Any other store error ends polling at once as
/// [`MediaResolution::Unresolved`].
///
/// [`StoreError::is_retryable`]: atelier_store::StoreError::is_retryable
///
/// | Attempt | Before the attempt       |
/// |---------|--------------------------|
/// | 1       | nothing                  |
/// | 2..=n   | sleep `policy.interval`  |
pub async fn resolve<S: ObjectStore>(
    store: &S,
    reference: &MediaRef,
    policy: PollPolicy,
) -> MediaResolution {
    let ids = [reference.as_str().to_owned()];
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        if attempt > 1 && !policy.interval.is_zero() {
            tokio::time::sleep(policy.interval).await;
        }

        match store.resolve_references(&ids).await {
            Ok(mut resolved) => {
                if let Some(url) = resolved.remove(reference.as_str()) {
                    tracing::debug!(reference = %reference, attempt, "media reference resolved");
                    return MediaResolution::Resolved(url);
                }
            }
            Err(err) if !err.is_retryable() => {
                tracing::warn!(
                    reference = %reference,
                    attempt,
                    error = %err,
                    "media resolution rejected by store, giving up"
                );
                return MediaResolution::Unresolved;
            }
            Err(err) => {
                tracing::warn!(
                    reference = %reference,
                    attempt,
                    max_attempts,
                    error = %err,
                    "media resolution attempt failed"
                );
            }
        }
    }

    tracing::warn!(
        reference = %reference,
        max_attempts,
        "media reference still unresolved after polling budget"
    );
    MediaResolution::Unresolved
}

/// Polls every reference concurrently, each with its own attempt budget.
///
/// Results come back in the same order as `references`.
pub async fn resolve_all<S: ObjectStore>(
    store: &S,
    references: &[MediaRef],
    policy: PollPolicy,
) -> Vec<MediaResolution> {
    join_all(
        references
            .iter()
            .map(|reference| resolve(store, reference, policy)),
    )
    .await
}
