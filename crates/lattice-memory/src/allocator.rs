use lattice_core::math::align_up;

/// Monotonic bump allocator over a fixed-size arena.
///
/// Allocations are never moved, compacted or individually freed. The only
/// way to reclaim space is [`Allocator::reset_allocation`], which invalidates
/// every offset handed out so far.
#[derive(Debug, Clone)]
pub struct Allocator {
    capacity: u64,
    offset: u64,
}

impl Allocator {
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            offset: 0,
        }
    }

    /// Reserve `size` bytes starting at the next multiple of `alignment`.
    /// Returns the start offset, or None when the arena cannot fit the
    /// padded request.
    pub fn allocate(&mut self, size: u64, alignment: u64) -> Option<u64> {
        let start = align_up(self.offset, alignment);
        let end = start.checked_add(size)?;
        if end > self.capacity {
            log::warn!(
                "Allocator: {} bytes (align {}) do not fit, {} of {} bytes used",
                size,
                alignment,
                self.offset,
                self.capacity
            );
            return None;
        }
        self.offset = end;
        Some(start)
    }

    /// Rewind to an empty arena. Callers must drop every outstanding offset.
    pub fn reset_allocation(&mut self) {
        self.offset = 0;
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Bytes consumed so far, including alignment padding.
    pub fn used(&self) -> u64 {
        self.offset
    }

    pub fn remaining(&self) -> u64 {
        self.capacity - self.offset
    }
}
