use crate::producer::producer_loop;
use crate::{AllocatorConfig, Error, Result, SegmentStore};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A monotonically increasing unique-ID generator for one business domain.
///
/// IDs are drawn from segments leased out of a shared [`SegmentStore`]; the
/// store's watermark is the sole source of durable uniqueness, so IDs stay
/// unique across restarts and across instances sharing a domain. A single
/// background producer task keeps a bounded buffer of ready IDs, amortizing
/// the store round-trip over `step` IDs and decoupling callers from store
/// latency.
///
/// Within one instance, consecutive IDs differ by exactly 1 inside a lease
/// and are delivered to callers in strict FIFO order. IDs buffered but not
/// yet retrieved are lost on process exit; the watermark already covers
/// them, so uniqueness is unaffected.
///
/// ## Features
/// - ✅ Unique across instances sharing a domain (row-locked leases)
/// - ✅ Strictly increasing per instance
/// - ✅ Bounded prefetch with natural backpressure
/// - ❌ Not gap-free: IDs unconsumed at exit are never reissued
///
/// # Example
///
/// ```
/// use segid::{AllocatorConfig, MemoryStore, SegmentAllocator};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> segid::Result<()> {
/// let store = MemoryStore::new();
/// store.insert_domain("invoice", 0, 1000);
///
/// let allocator = SegmentAllocator::new(store, AllocatorConfig::new("invoice"))?;
/// assert_eq!(allocator.next_id().await?, 1);
/// assert_eq!(allocator.next_id().await?, 2);
///
/// allocator.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SegmentAllocator {
    ids: tokio::sync::Mutex<mpsc::Receiver<i64>>,
    shutdown: CancellationToken,
    producer: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl SegmentAllocator {
    /// Creates an allocator and starts its background producer.
    ///
    /// Returns immediately without waiting for the first lease; the buffer
    /// may be briefly empty while the producer initializes. A store that
    /// turns out to be unreachable surfaces later, as [`Error::Closed`] from
    /// [`Self::next_id`] once the producer exhausts its lease attempts.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCapacity`] if `config.buffer_capacity` is 0.
    /// - [`Error::InvalidAttempts`] if `config.lease_attempts` is 0.
    pub fn new<S>(store: S, config: AllocatorConfig) -> Result<Self>
    where
        S: SegmentStore + Send + Sync + 'static,
    {
        if config.buffer_capacity == 0 {
            return Err(Error::InvalidCapacity);
        }
        if config.lease_attempts == 0 {
            return Err(Error::InvalidAttempts);
        }

        let (tx, rx) = mpsc::channel(config.buffer_capacity);
        let shutdown = CancellationToken::new();
        let producer = tokio::spawn(producer_loop(store, config, tx, shutdown.clone()));

        Ok(Self {
            ids: tokio::sync::Mutex::new(rx),
            shutdown,
            producer: parking_lot::Mutex::new(Some(producer)),
        })
    }

    /// Returns the next ID, waiting until one is buffered.
    ///
    /// IDs are delivered in the exact order the producer generated them. May
    /// be called from any number of tasks concurrently.
    ///
    /// # Errors
    ///
    /// [`Error::Closed`] once the producer has terminated (shutdown or fatal
    /// lease failure) and the buffer is drained.
    pub async fn next_id(&self) -> Result<i64> {
        let mut ids = self.ids.lock().await;
        ids.recv().await.ok_or(Error::Closed)
    }

    /// Whether the background producer is still alive.
    ///
    /// `false` after [`Self::shutdown`], or once the producer died of a
    /// fatal lease failure. IDs already buffered remain retrievable either
    /// way.
    pub fn is_running(&self) -> bool {
        self.producer
            .lock()
            .as_ref()
            .is_some_and(|producer| !producer.is_finished())
    }

    /// Stops the producer and waits for it to finish.
    ///
    /// Idempotent. IDs already buffered can still be drained with
    /// [`Self::next_id`]; after that, callers observe [`Error::Closed`].
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let producer = self.producer.lock().take();
        if let Some(producer) = producer {
            #[cfg(feature = "tracing")]
            tracing::debug!("waiting for producer to stop");
            let _ = producer.await;
        }
    }
}

impl Drop for SegmentAllocator {
    fn drop(&mut self) {
        // Unblock a producer that is mid-lease; one blocked on the buffer
        // exits on its own once the receiver is gone.
        self.shutdown.cancel();
    }
}
