use crate::{Result, Segment};
use core::future::Future;
use std::sync::Arc;

pub mod memory;
#[cfg(feature = "postgres")]
pub mod pg;

pub use memory::*;
#[cfg(feature = "postgres")]
pub use pg::*;

/// A store that grants segment leases for named domains.
///
/// Implementations must make each lease atomic with respect to every other
/// lease for the same domain, whichever process issues it: read the domain's
/// watermark, advance it by the domain's step, and either commit both or
/// neither. Two concurrent calls for one domain must never observe the same
/// watermark.
///
/// The returned future is `Send` so the producer task can be spawned onto a
/// multi-threaded runtime.
pub trait SegmentStore {
    /// Atomically leases the next segment for `domain`.
    ///
    /// # Errors
    ///
    /// - [`Error::DomainNotFound`] if no record exists for `domain`.
    /// - [`Error::Store`] for any transactional failure; the store must roll
    ///   back so no partial effect survives.
    ///
    /// [`Error::DomainNotFound`]: crate::Error::DomainNotFound
    /// [`Error::Store`]: crate::Error::Store
    fn next_segment(&self, domain: &str) -> impl Future<Output = Result<Segment>> + Send;
}

/// Allows one store to be shared by several allocator instances.
impl<S> SegmentStore for Arc<S>
where
    S: SegmentStore + Send + Sync,
{
    fn next_segment(&self, domain: &str) -> impl Future<Output = Result<Segment>> + Send {
        S::next_segment(self, domain)
    }
}
