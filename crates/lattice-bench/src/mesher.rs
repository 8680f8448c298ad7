use bytemuck::{Pod, Zeroable};
use lattice_core::constants::{CHUNK_BLOCK_SIZE, CHUNK_VOLUME};
use lattice_core::math::block_index;
use lattice_world::chunk::ChunkData;

/// Packed vertex used by the bench meshes. 16 bytes, one vertex stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct BenchVertex {
    /// x | y << 8 | z << 16 | corner << 24
    pub position: u32,
    /// mod id | block id << 16
    pub block: u32,
    pub metadata: u32,
    pub _pad: u32,
}

const TOP_FACE_CORNERS: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// Two triangles for every solid cell whose upper neighbour inside the chunk
/// is air (or that sits on the top layer).
pub fn top_faces(chunk: &ChunkData) -> Vec<BenchVertex> {
    let side = CHUNK_BLOCK_SIZE as i32;
    let blocks = chunk.blocks();
    let mut vertices = Vec::new();

    for index in 0..CHUNK_VOLUME as usize {
        let block = blocks[index];
        if block.is_air() {
            continue;
        }
        let local = ChunkData::get_position(index);
        let covered = local.y + 1 < side && !blocks[block_index(local + glam::IVec3::Y)].is_air();
        if covered {
            continue;
        }
        let packed = local.x as u32 | (local.y as u32) << 8 | (local.z as u32) << 16;
        for corner in TOP_FACE_CORNERS {
            vertices.push(BenchVertex {
                position: packed | corner << 24,
                block: block.mod_id() as u32 | (block.block_id() as u32) << 16,
                metadata: block.metadata(),
                _pad: 0,
            });
        }
    }
    vertices
}
