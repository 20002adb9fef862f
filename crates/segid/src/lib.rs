//! Segment-leasing unique ID allocation backed by a shared watermark store.
//!
//! `segid` hands out monotonically increasing `i64` IDs for a named business
//! domain. Instead of paying one store round-trip per ID, each allocator
//! leases a contiguous segment of IDs by atomically advancing a watermark in
//! a shared store, then serves them from a bounded in-process buffer filled
//! by a background producer task. The watermark is the sole source of
//! durable uniqueness: IDs never repeat across restarts or across instances
//! that share a domain, at the cost of gaps for IDs left unconsumed when an
//! instance exits.
//!
//! The store behind the watermark is pluggable via [`SegmentStore`]:
//! [`MemoryStore`] for tests and single-process use, or `PgSegmentStore`
//! (feature `postgres`) for the row-locked relational table that coordinates
//! many processes.
//!
//! # Example
//!
//! ```
//! use segid::{AllocatorConfig, MemoryStore, SegmentAllocator};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> segid::Result<()> {
//! let store = MemoryStore::new();
//! store.insert_domain("order", 0, 1000);
//!
//! let allocator = SegmentAllocator::new(store, AllocatorConfig::new("order"))?;
//! let id = allocator.next_id().await?;
//! assert_eq!(id, 1);
//! allocator.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod allocator;
mod config;
mod error;
mod producer;
mod segment;
mod store;

pub use crate::allocator::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::segment::*;
pub use crate::store::*;
