//! Single source of truth for shared compile-time constants.
//! Values that also size GPU buffers must stay in sync with the shader side.

/// Side length of a chunk in blocks. Must be a power of two.
pub const CHUNK_BLOCK_SIZE: u32 = 32;

/// Total cells per chunk (32^3).
pub const CHUNK_VOLUME: u32 = CHUNK_BLOCK_SIZE * CHUNK_BLOCK_SIZE * CHUNK_BLOCK_SIZE;

/// Chunks per axis of the default streaming window. Must be odd so the
/// window has a center chunk.
pub const MAX_WORLD_CHUNKS_PER_AXIS: u32 = 9;

/// Hard cap on resident chunks. Exceeding it is a programmer error.
pub const MAX_RESIDENT_CHUNKS: u32 = 8192;

/// Vertices per vertex page.
pub const VERTEX_PAGE_SIZE: u32 = 4096;

/// Number of vertex pages in the shared vertex buffer.
pub const TOTAL_VERTEX_PAGE_COUNT: u32 = 1024;

/// Bytes per mesh vertex (packed position + normal/uv word).
pub const VERTEX_STRIDE_BYTES: u32 = 16;

/// Bytes per indirect draw command (vertex_count, instance_count,
/// first_vertex, first_instance).
pub const DRAW_COMMAND_BYTES: u32 = 16;

/// Bytes per per-page transform (column-major 4x4 f32).
pub const TRANSFORM_BYTES: u32 = 64;

/// Alignment for sub-allocations carved out of a memory heap.
pub const BUFFER_ALIGNMENT: u64 = 256;

/// Distance advanced per raycast iteration, in blocks.
pub const RAYCAST_STEP: f32 = 0.1;

/// Iteration budget for a single raycast (reach = step * iterations).
pub const RAYCAST_MAX_ITERATIONS: u32 = 80;

/// How many times a raycast may halve its step to resolve one diagonal crossing.
pub const RAYCAST_MAX_STEP_HALVINGS: u32 = 2;

/// Mod index reserved for the built-in core mod.
pub const CORE_MOD_INDEX: u16 = 0;

/// Block index of air inside the core mod.
pub const AIR_BLOCK_INDEX: u16 = 0;

/// Block index of the "unknown" placeholder inside the core mod.
pub const UNKNOWN_BLOCK_INDEX: u16 = 1;

/// Name of the built-in core mod.
pub const CORE_MOD_NAME: &str = "core";

const _: () = assert!(CHUNK_BLOCK_SIZE.is_power_of_two());
const _: () = assert!(MAX_WORLD_CHUNKS_PER_AXIS % 2 == 1);
const _: () = assert!(BUFFER_ALIGNMENT.is_power_of_two());
