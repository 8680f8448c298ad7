use crate::constants::{CHUNK_BLOCK_SIZE, CHUNK_VOLUME};
use crate::types::{ChunkPos, LocalPos, WorldPos};
use glam::{IVec3, Mat4, Vec3};

/// Flat cell index of a local coordinate: `(side*z + y)*side + x`.
/// Coordinates must already lie in [0, CHUNK_BLOCK_SIZE).
pub fn block_index(local: LocalPos) -> usize {
    let side = CHUNK_BLOCK_SIZE as usize;
    debug_assert!(is_local(local), "local coordinate {local} out of chunk range");
    (side * local.z as usize + local.y as usize) * side + local.x as usize
}

/// Inverse of [`block_index`].
pub fn block_position(index: usize) -> LocalPos {
    let side = CHUNK_BLOCK_SIZE as usize;
    debug_assert!(index < CHUNK_VOLUME as usize);
    IVec3::new(
        (index % side) as i32,
        ((index / side) % side) as i32,
        (index / (side * side)) as i32,
    )
}

/// Whether every axis of `local` lies in [0, CHUNK_BLOCK_SIZE).
pub fn is_local(local: IVec3) -> bool {
    let side = CHUNK_BLOCK_SIZE as i32;
    local.cmpge(IVec3::ZERO).all() && local.cmplt(IVec3::splat(side)).all()
}

/// Grid-aligned origin of the chunk containing `world` (floor division, so
/// negative coordinates round toward negative infinity).
pub fn world_to_chunk(world: WorldPos) -> ChunkPos {
    let cs = CHUNK_BLOCK_SIZE as i32;
    IVec3::new(
        world.x.div_euclid(cs) * cs,
        world.y.div_euclid(cs) * cs,
        world.z.div_euclid(cs) * cs,
    )
}

/// Offset of `world` inside its chunk, every axis in [0, CHUNK_BLOCK_SIZE).
pub fn world_to_local(world: WorldPos) -> LocalPos {
    let cs = CHUNK_BLOCK_SIZE as i32;
    IVec3::new(
        world.x.rem_euclid(cs),
        world.y.rem_euclid(cs),
        world.z.rem_euclid(cs),
    )
}

/// Both halves of the decomposition at once.
pub fn split_world_pos(world: WorldPos) -> (ChunkPos, LocalPos) {
    (world_to_chunk(world), world_to_local(world))
}

/// Recompose a chunk origin and a local offset into a world coordinate.
pub fn chunk_local_to_world(chunk: ChunkPos, local: LocalPos) -> WorldPos {
    chunk + local
}

/// Integer block containing a continuous position.
pub fn floor_to_block(position: Vec3) -> WorldPos {
    position.floor().as_ivec3()
}

/// Snap a continuous focus position to the origin of the chunk containing it.
pub fn focus_to_chunk(position: Vec3) -> ChunkPos {
    world_to_chunk(floor_to_block(position))
}

/// Whether `world` lies inside the chunk whose origin is `chunk`.
pub fn chunk_contains(chunk: ChunkPos, world: WorldPos) -> bool {
    is_local(world - chunk)
}

/// Render transform of a chunk: translation to its origin.
pub fn chunk_transform(chunk: ChunkPos) -> Mat4 {
    Mat4::from_translation(chunk.as_vec3())
}

/// Smallest multiple of `alignment` that is >= `offset`. `alignment` must be a
/// power of two; zero and one mean "unaligned".
pub fn align_up(offset: u64, alignment: u64) -> u64 {
    if alignment <= 1 {
        return offset;
    }
    debug_assert!(alignment.is_power_of_two(), "alignment {alignment} is not a power of two");
    (offset + alignment - 1) & !(alignment - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CS: i32 = CHUNK_BLOCK_SIZE as i32;

    #[test]
    fn test_index_formula() {
        assert_eq!(block_index(IVec3::ZERO), 0);
        assert_eq!(block_index(IVec3::new(1, 0, 0)), 1);
        assert_eq!(block_index(IVec3::new(0, 1, 0)), CS as usize);
        assert_eq!(block_index(IVec3::new(0, 0, 1)), (CS * CS) as usize);
        assert_eq!(
            block_index(IVec3::splat(CS - 1)),
            CHUNK_VOLUME as usize - 1
        );
    }

    #[test]
    fn test_index_position_roundtrip_all_cells() {
        for z in 0..CS {
            for y in 0..CS {
                for x in 0..CS {
                    let local = IVec3::new(x, y, z);
                    assert_eq!(block_position(block_index(local)), local);
                }
            }
        }
    }

    #[test]
    fn test_world_to_chunk_positive() {
        assert_eq!(world_to_chunk(IVec3::ZERO), IVec3::ZERO);
        assert_eq!(world_to_chunk(IVec3::splat(CS - 1)), IVec3::ZERO);
        assert_eq!(world_to_chunk(IVec3::new(CS, 0, 0)), IVec3::new(CS, 0, 0));
    }

    #[test]
    fn test_world_to_chunk_negative() {
        assert_eq!(world_to_chunk(IVec3::new(-1, 0, 0)), IVec3::new(-CS, 0, 0));
        assert_eq!(world_to_chunk(IVec3::new(-CS, 0, 0)), IVec3::new(-CS, 0, 0));
        assert_eq!(
            world_to_chunk(IVec3::new(-CS - 1, 0, 0)),
            IVec3::new(-2 * CS, 0, 0)
        );
    }

    #[test]
    fn test_world_to_local_negative() {
        assert_eq!(world_to_local(IVec3::new(-1, 0, 0)), IVec3::new(CS - 1, 0, 0));
        assert_eq!(world_to_local(IVec3::new(-CS, 0, 0)), IVec3::ZERO);
        assert_eq!(world_to_local(IVec3::new(0, -5, 0)), IVec3::new(0, CS - 5, 0));
    }

    #[test]
    fn test_decompose_recompose_identity() {
        for v in -3 * CS..3 * CS {
            let world = IVec3::new(v, -v, v / 3);
            let (chunk, local) = split_world_pos(world);
            assert!(is_local(local), "local {local} out of range for {world}");
            assert_eq!(chunk % CS, IVec3::ZERO, "chunk {chunk} not grid-aligned");
            assert_eq!(chunk_local_to_world(chunk, local), world);
        }
    }

    #[test]
    fn test_floor_to_block_negative() {
        assert_eq!(floor_to_block(Vec3::new(-0.5, 0.5, 1.0)), IVec3::new(-1, 0, 1));
        assert_eq!(focus_to_chunk(Vec3::new(-0.1, 0.0, 40.0)), IVec3::new(-CS, 0, CS));
    }

    #[test]
    fn test_chunk_contains() {
        let chunk = IVec3::new(CS, 0, 0);
        assert!(chunk_contains(chunk, IVec3::new(CS, 0, 0)));
        assert!(chunk_contains(chunk, IVec3::new(2 * CS - 1, CS - 1, CS - 1)));
        assert!(!chunk_contains(chunk, IVec3::new(CS - 1, 0, 0)));
        assert!(!chunk_contains(chunk, IVec3::new(2 * CS, 0, 0)));
    }

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 16), 0);
        assert_eq!(align_up(40, 16), 48);
        assert_eq!(align_up(48, 16), 48);
        assert_eq!(align_up(7, 1), 7);
        assert_eq!(align_up(7, 0), 7);
    }
}
