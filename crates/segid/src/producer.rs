//! The background segment producer.
//!
//! One producer task runs per allocator instance. It owns the current
//! [`Segment`], refills it through the retry-guarded lease protocol whenever
//! it is exhausted, and feeds individual IDs into the bounded buffer. The
//! buffer send blocks when the buffer is full, so the producer never runs
//! more than the configured capacity ahead of consumption.

use crate::{AllocatorConfig, Error, Result, Segment, SegmentStore};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Leases a segment, retrying transient failures up to `attempts` times.
///
/// Retries are immediate: short-lived lease transactions are expected to
/// clear contention within a few attempts. Non-transient errors (a missing
/// domain record) fail fast without consuming further attempts. If every
/// attempt fails, the last error is returned.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(store)))]
pub(crate) async fn lease_with_retry<S>(store: &S, domain: &str, attempts: u32) -> Result<Segment>
where
    S: SegmentStore,
{
    let mut last = Error::Store {
        context: "no lease attempted".to_owned(),
    };

    for _attempt in 1..=attempts {
        match store.next_segment(domain).await {
            Ok(segment) => return Ok(segment),
            Err(err) if !err.is_transient() => return Err(err),
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::trace!("lease attempt {_attempt}/{attempts} for {domain:?} failed: {err}");
                last = err;
            }
        }
    }

    Err(last)
}

/// Producer task responsible for keeping the ID buffer fed.
///
/// Designed to be spawned as a Tokio task; runs until one of:
///
/// - the shutdown token is cancelled (graceful stop),
/// - every receiver handle is gone (the allocator was dropped),
/// - a lease fails terminally (retries exhausted or the domain is missing).
///
/// The shutdown token is honored at every await point: both while waiting on
/// a lease and while waiting for buffer space. A buffer slot is reserved
/// before the cursor advances, so cancellation never discards an ID that was
/// already drawn from the segment.
///
/// On return the sender is dropped, closing the channel; consumers observe
/// the closure as [`Error::Closed`] once the buffer drains.
pub(crate) async fn producer_loop<S>(
    store: S,
    config: AllocatorConfig,
    ids: mpsc::Sender<i64>,
    shutdown: CancellationToken,
) where
    S: SegmentStore,
{
    #[cfg(feature = "tracing")]
    tracing::trace!("producer for {:?} started", config.domain);

    // Start drained so the first iteration performs the initial lease.
    let mut segment = Segment::drained();

    loop {
        if segment.is_exhausted() {
            let leased = tokio::select! {
                () = shutdown.cancelled() => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("producer for {:?} cancelled before lease", config.domain);
                    return;
                }
                leased = lease_with_retry(&store, &config.domain, config.lease_attempts) => leased,
            };

            segment = match leased {
                Ok(next) if next.is_exhausted() => {
                    #[cfg(feature = "tracing")]
                    tracing::error!(
                        "producer for {:?} stopping: store granted an empty segment",
                        config.domain
                    );
                    return;
                }
                Ok(next) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        "leased {} ids up to {} for {:?}",
                        next.remaining(),
                        next.end(),
                        config.domain
                    );
                    next
                }
                Err(_err) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!("producer for {:?} stopping: {_err}", config.domain);
                    return;
                }
            };
        }

        tokio::select! {
            () = shutdown.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("producer for {:?} cancelled", config.domain);
                return;
            }
            permit = ids.reserve() => match permit {
                Ok(permit) => {
                    if let Some(id) = segment.next() {
                        permit.send(id);
                    }
                }
                // Every receiver is gone; nobody is left to consume.
                Err(_) => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails a scripted number of leases before delegating to a real store.
    struct FlakyStore {
        inner: MemoryStore,
        failures: AtomicU32,
        attempts: AtomicU32,
    }

    impl FlakyStore {
        fn new(inner: MemoryStore, failures: u32) -> Self {
            Self {
                inner,
                failures: AtomicU32::new(failures),
                attempts: AtomicU32::new(0),
            }
        }
    }

    impl SegmentStore for FlakyStore {
        async fn next_segment(&self, domain: &str) -> Result<Segment> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                    remaining.checked_sub(1)
                })
                .is_ok()
            {
                return Err(Error::Store {
                    context: "injected failure".to_owned(),
                });
            }
            self.inner.next_segment(domain).await
        }
    }

    #[tokio::test]
    async fn recovers_within_the_attempt_bound() {
        let store = MemoryStore::new();
        store.insert_domain("order", 0, 5);
        let store = FlakyStore::new(store, 2);

        let segment = lease_with_retry(&store, "order", 5).await.unwrap();
        assert_eq!(segment, Segment::new(0, 5));
        assert_eq!(store.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn returns_the_last_error_after_exhausting_attempts() {
        let store = FlakyStore::new(MemoryStore::new(), u32::MAX);

        let err = lease_with_retry(&store, "order", 5).await.unwrap_err();
        assert_eq!(
            err,
            Error::Store {
                context: "injected failure".to_owned()
            }
        );
        assert_eq!(store.attempts.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn missing_domain_fails_without_retrying() {
        let store = Arc::new(MemoryStore::new());

        let err = lease_with_retry(&store, "ghost", 5).await.unwrap_err();
        assert_eq!(
            err,
            Error::DomainNotFound {
                domain: "ghost".to_owned()
            }
        );
    }
}
