//! Error types for the segment allocator.
//!
//! The central [`Error`] enum captures every reportable failure in the
//! allocator: store-level lease failures, configuration mistakes, and the
//! terminal "allocator is closed" state observed by consumers. The retry
//! wrapper consults [`Error::is_transient`] to decide whether another lease
//! attempt is worthwhile.

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Unified error type for the segment allocator.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// No segment record exists for the requested domain.
    ///
    /// This is a provisioning problem, not contention: retrying cannot
    /// succeed until an operator inserts the row.
    #[error("no segment record for domain {domain:?}")]
    DomainNotFound { domain: String },

    /// The store failed to begin, read, write or commit the lease
    /// transaction.
    #[error("store error: {context}")]
    Store { context: String },

    /// The buffer capacity was zero; a zero-capacity buffer would deadlock
    /// the producer on its first send.
    #[error("buffer capacity must be at least 1")]
    InvalidCapacity,

    /// The lease attempt bound was zero; the producer could never obtain a
    /// segment.
    #[error("lease attempts must be at least 1")]
    InvalidAttempts,

    /// The producer has terminated and the buffer is drained.
    ///
    /// Returned by [`SegmentAllocator::next_id`] after a shutdown or a fatal
    /// lease failure, instead of blocking forever.
    ///
    /// [`SegmentAllocator::next_id`]: crate::SegmentAllocator::next_id
    #[error("allocator is closed")]
    Closed,
}

impl Error {
    /// Whether a failed lease attempt may be retried immediately.
    ///
    /// Store failures are treated as transient contention (lock waits,
    /// aborted transactions, momentary connectivity blips). A missing domain
    /// record is not: it fails fast without consuming further attempts.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Store { .. })
    }
}
