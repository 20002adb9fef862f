/// Default number of IDs buffered ahead of consumption.
pub const DEFAULT_BUFFER_CAPACITY: usize = 64;

/// Default bound on immediate lease attempts per refill.
pub const DEFAULT_LEASE_ATTEMPTS: u32 = 5;

/// Configuration for a [`SegmentAllocator`].
///
/// The domain names the segment record this allocator draws from; capacity
/// and attempt bounds tune the buffer and the refill retry loop. Values are
/// validated by [`SegmentAllocator::new`].
///
/// [`SegmentAllocator`]: crate::SegmentAllocator
/// [`SegmentAllocator::new`]: crate::SegmentAllocator::new
#[derive(Debug, Clone)]
pub struct AllocatorConfig {
    /// The business domain whose watermark this allocator advances.
    pub domain: String,
    /// Bounded buffer capacity; the producer never runs more than this many
    /// IDs ahead of consumption. Must be at least 1.
    pub buffer_capacity: usize,
    /// Immediate attempts per lease before the producer gives up. Must be at
    /// least 1.
    pub lease_attempts: u32,
}

impl AllocatorConfig {
    /// Creates a configuration for `domain` with default capacity and
    /// attempt bounds.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            lease_attempts: DEFAULT_LEASE_ATTEMPTS,
        }
    }

    /// Overrides the buffer capacity.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Overrides the lease attempt bound.
    pub fn with_lease_attempts(mut self, attempts: u32) -> Self {
        self.lease_attempts = attempts;
        self
    }
}
