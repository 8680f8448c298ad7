use lattice_core::device::{BufferId, BufferUsage, GraphicsDevice};
use lattice_core::error::DeviceError;

use crate::allocator::Allocator;

/// A sub-range of a memory heap's backing buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapSlice {
    pub buffer: BufferId,
    /// Byte offset of the slice inside the backing buffer.
    pub offset: u64,
    pub size: u64,
}

/// One device allocation carved into aligned slices by a bump [`Allocator`].
pub struct MemoryHeap {
    label: String,
    buffer: BufferId,
    allocator: Allocator,
}

impl MemoryHeap {
    /// Allocate `size` bytes of device memory and wrap it in an empty arena.
    pub fn new<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        label: &str,
        size: u64,
        usage: BufferUsage,
    ) -> Result<Self, DeviceError> {
        let buffer = device.allocate_heap_memory(label, size, usage)?;
        log::info!("MemoryHeap '{}': {} KB", label, size / 1024);
        Ok(Self {
            label: label.to_string(),
            buffer,
            allocator: Allocator::new(size),
        })
    }

    /// Carve an aligned slice out of the heap. None when the heap is full.
    pub fn allocate(&mut self, size: u64, alignment: u64) -> Option<HeapSlice> {
        let offset = self.allocator.allocate(size, alignment)?;
        Some(HeapSlice {
            buffer: self.buffer,
            offset,
            size,
        })
    }

    /// Copy `bytes` into `slice` starting `offset` bytes into the slice.
    pub fn write<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        slice: &HeapSlice,
        offset: u64,
        bytes: &[u8],
    ) -> Result<(), DeviceError> {
        let size = bytes.len() as u64;
        if offset + size > slice.size {
            return Err(DeviceError::TransferOutOfBounds {
                offset,
                size,
                capacity: slice.size,
            });
        }
        device.transfer_instantly(slice.buffer, slice.offset + offset, bytes)
    }

    /// Forget every slice. Existing [`HeapSlice`] values become dangling ranges.
    pub fn reset(&mut self) {
        log::debug!("MemoryHeap '{}': reset", self.label);
        self.allocator.reset_allocation();
    }

    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }
}
