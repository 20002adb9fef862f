use crate::{Error, Result, Segment, SegmentStore};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct Record {
    max_id: i64,
    step: i64,
}

/// An in-process [`SegmentStore`].
///
/// Each domain is a row in a mutex-guarded map; the mutex serializes the
/// read-modify-write the same way the row lock does in the relational store.
/// Suitable for tests, benchmarks, and single-process deployments where
/// cross-process uniqueness is not required.
///
/// # Example
///
/// ```
/// use segid::{MemoryStore, SegmentStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = MemoryStore::new();
/// store.insert_domain("invoice", 100, 10);
///
/// let segment = store.next_segment("invoice").await.unwrap();
/// assert_eq!(segment.end(), 110);
/// assert_eq!(store.watermark("invoice"), Some(110));
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<String, Record>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provisions a domain record, replacing any existing one.
    ///
    /// `max_id` is the initial watermark (the first issued ID will be
    /// `max_id + 1`); `step` is the number of IDs granted per lease.
    pub fn insert_domain(&self, domain: impl Into<String>, max_id: i64, step: i64) {
        self.rows
            .lock()
            .insert(domain.into(), Record { max_id, step });
    }

    /// The current watermark for `domain`, if provisioned.
    pub fn watermark(&self, domain: &str) -> Option<i64> {
        self.rows.lock().get(domain).map(|record| record.max_id)
    }
}

impl SegmentStore for MemoryStore {
    async fn next_segment(&self, domain: &str) -> Result<Segment> {
        let mut rows = self.rows.lock();
        let record = rows.get_mut(domain).ok_or_else(|| Error::DomainNotFound {
            domain: domain.to_owned(),
        })?;

        if record.step <= 0 {
            return Err(Error::Store {
                context: format!("non-positive step {} for domain {domain:?}", record.step),
            });
        }
        let end = record.max_id.checked_add(record.step).ok_or_else(|| Error::Store {
            context: format!("watermark overflow for domain {domain:?}"),
        })?;

        let start = record.max_id;
        record.max_id = end;
        Ok(Segment::new(start, end))
    }
}
