//! Interface to the graphics-device collaborator.
//!
//! The world core only ever hands the device byte spans and sizes. Buffer
//! creation, memory binding and command recording stay on the far side of
//! this trait.

use crate::error::DeviceError;

/// Opaque handle to a device buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// How a heap's backing buffer will be bound by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferUsage {
    pub vertex: bool,
    pub indirect: bool,
    pub storage: bool,
}

impl BufferUsage {
    /// Usage for the shared mesh heap: vertices, draw commands and transforms
    /// all live in one buffer.
    pub const MESH_HEAP: BufferUsage = BufferUsage {
        vertex: true,
        indirect: true,
        storage: true,
    };
}

/// Graphics-device operations the world core depends on.
pub trait GraphicsDevice {
    /// Reserve `size` bytes of device memory backed by a single buffer.
    fn allocate_heap_memory(
        &mut self,
        label: &str,
        size: u64,
        usage: BufferUsage,
    ) -> Result<BufferId, DeviceError>;

    /// Synchronous host-to-device copy of `bytes` into `buffer` at `offset`.
    fn transfer_instantly(
        &mut self,
        buffer: BufferId,
        offset: u64,
        bytes: &[u8],
    ) -> Result<(), DeviceError>;
}
