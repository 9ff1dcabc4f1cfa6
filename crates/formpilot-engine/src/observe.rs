//! Shared "check now, then re-check on every mutation batch" primitive.

use crate::document::{Document, MutationSubscription};
use async_trait::async_trait;
use formpilot_common::error::DomError;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{trace, warn};

/// A condition evaluated against the document each time it may have changed.
#[async_trait]
pub trait Probe: Send + Sync {
    type Output: Send;

    async fn probe(&self, document: &dyn Document) -> Result<Option<Self::Output>, DomError>;
}

/// Resolve `probe` against the document, re-evaluating it after every mutation
/// batch until it yields a value or `timeout` elapses.
///
/// Returns `Ok(None)` at the deadline. A subscription is only opened when the
/// first evaluation misses, and is disconnected on every exit path.
pub async fn watch_for<P: Probe>(
    document: &dyn Document,
    probe: &P,
    timeout: Duration,
) -> Result<Option<P::Output>, DomError> {
    if let Some(found) = probe.probe(document).await? {
        return Ok(Some(found));
    }

    let deadline = Instant::now() + timeout;
    let mut subscription = document.observe_mutations().await?;
    let outcome = watch(document, probe, subscription.as_mut(), deadline).await;

    if let Err(e) = subscription.disconnect().await {
        warn!("Failed to disconnect mutation observer: {}", e);
    }
    outcome
}

async fn watch<P: Probe>(
    document: &dyn Document,
    probe: &P,
    subscription: &mut dyn MutationSubscription,
    deadline: Instant,
) -> Result<Option<P::Output>, DomError> {
    // The tree may have changed between the first evaluation and subscribing.
    if let Some(found) = probe.probe(document).await? {
        return Ok(Some(found));
    }

    loop {
        match tokio::time::timeout_at(deadline, subscription.next_batch()).await {
            Ok(Some(batch)) => {
                trace!(records = batch.records, "Mutation batch");
                if let Some(found) = probe.probe(document).await? {
                    return Ok(Some(found));
                }
            }
            Ok(None) => {
                // No further batches will arrive; nothing can change before the deadline.
                tokio::time::sleep_until(deadline).await;
                return Ok(None);
            }
            Err(_) => return Ok(None),
        }
    }
}
