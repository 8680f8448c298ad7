pub mod allocator;
pub mod heap;
pub mod host;
pub mod vertex_pages;

pub use allocator::Allocator;
pub use heap::{HeapSlice, MemoryHeap};
pub use host::HostDevice;
pub use vertex_pages::{DrawCommand, VertexPage, VertexPagePool};
