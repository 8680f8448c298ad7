use glam::{IVec3, Vec3};
use lattice_core::math::{floor_to_block, world_to_local};
use lattice_core::types::{LocalPos, RaycastMode, WorldPos};

use crate::chunk::ChunkId;
use crate::chunk_map::ChunkMap;
use crate::config::RaycastConfig;

/// Order in which axes are snapped back when a step crosses several cell
/// boundaries at once: x, then z, then y.
const SNAP_ORDER: [usize; 3] = [0, 2, 1];

/// A cell picked by [`raycast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockTarget {
    pub chunk: ChunkId,
    pub local: LocalPos,
    pub position: WorldPos,
}

impl BlockTarget {
    fn at(chunk: ChunkId, position: WorldPos) -> Self {
        Self {
            chunk,
            local: world_to_local(position),
            position,
        }
    }
}

/// March from `origin` along `direction` through resident chunks, one cell
/// boundary at a time.
///
/// `Destroy` returns the first non-air cell, `Place` the air cell visited
/// just before it. Returns None when the ray leaves the resident chunks, the
/// iteration budget runs out, or `direction` is zero. The chunk containing
/// `origin` is created if needed.
pub fn raycast(
    chunks: &mut ChunkMap,
    config: &RaycastConfig,
    origin: Vec3,
    direction: Vec3,
    mode: RaycastMode,
) -> Option<BlockTarget> {
    let direction = direction.try_normalize()?;
    let mut block = floor_to_block(origin);
    let mut current = chunks.add_chunk(block);
    let chunks = &*chunks;

    let mut last_air = chunks
        .chunk(current)
        .get_block(world_to_local(block))
        .is_air()
        .then(|| BlockTarget::at(current, block));

    let mut position = origin;
    let mut step = config.step;
    let mut halvings = 0;
    let mut iterations = 0;

    while iterations < config.max_iterations {
        let advanced = position + direction * step;
        let mut next = floor_to_block(advanced);
        if next == block {
            position = advanced;
            iterations += 1;
            continue;
        }

        let mut changed = axes_changed(block, next);
        if changed > 1 && halvings < config.max_step_halvings {
            // Retry from the previous position with a shorter step.
            step *= 0.5;
            halvings += 1;
            continue;
        }
        position = advanced;
        iterations += 1;

        for axis in SNAP_ORDER {
            if changed <= 1 {
                break;
            }
            if next[axis] != block[axis] {
                next[axis] = block[axis];
                changed -= 1;
            }
        }
        step = config.step;
        halvings = 0;
        block = next;

        let chunk = chunks.chunk(current);
        if !chunk.contains(block) {
            current = chunk
                .neighbours()
                .iter()
                .map(|(_, id)| id)
                .find(|&id| chunks.chunk(id).contains(block))?;
        }

        let target = BlockTarget::at(current, block);
        if chunks.chunk(current).get_block(target.local).is_air() {
            last_air = Some(target);
        } else {
            log::trace!("raycast: hit {} after {} iterations", block, iterations);
            return match mode {
                RaycastMode::Destroy => Some(target),
                RaycastMode::Place => last_air,
            };
        }
    }
    None
}

fn axes_changed(from: IVec3, to: IVec3) -> u32 {
    from.cmpne(to).bitmask().count_ones()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::constants::CHUNK_BLOCK_SIZE;
    use lattice_core::types::ChunkBlock;

    const CS: i32 = CHUNK_BLOCK_SIZE as i32;
    const STONE: ChunkBlock = ChunkBlock::new(1, 0, 0);

    fn place(map: &mut ChunkMap, world: IVec3) {
        let id = map.find_containing(world).expect("chunk resident");
        map.chunk_mut(id).set_block(world_to_local(world), STONE);
    }

    fn cast(
        map: &mut ChunkMap,
        origin: Vec3,
        direction: Vec3,
        mode: RaycastMode,
    ) -> Option<BlockTarget> {
        raycast(map, &RaycastConfig::default(), origin, direction, mode)
    }

    #[test]
    fn test_destroy_hits_first_solid_block() {
        let mut map = ChunkMap::with_capacity(8);
        map.add_chunk(IVec3::ZERO);
        place(&mut map, IVec3::new(5, 0, 0));
        place(&mut map, IVec3::new(7, 0, 0));

        let hit = cast(&mut map, Vec3::splat(0.5), Vec3::X, RaycastMode::Destroy).expect("hit");
        assert_eq!(hit.position, IVec3::new(5, 0, 0));
        assert_eq!(hit.local, IVec3::new(5, 0, 0));
    }

    #[test]
    fn test_place_returns_preceding_air_cell() {
        let mut map = ChunkMap::with_capacity(8);
        map.add_chunk(IVec3::ZERO);
        place(&mut map, IVec3::new(5, 0, 0));

        let hit = cast(&mut map, Vec3::splat(0.5), Vec3::X, RaycastMode::Place).expect("hit");
        assert_eq!(hit.position, IVec3::new(4, 0, 0));
        assert!(map.chunk(hit.chunk).get_block(hit.local).is_air());
    }

    #[test]
    fn test_place_against_adjacent_block_returns_origin_cell() {
        let mut map = ChunkMap::with_capacity(8);
        map.add_chunk(IVec3::ZERO);
        place(&mut map, IVec3::new(1, 0, 0));

        let hit = cast(&mut map, Vec3::splat(0.5), Vec3::X, RaycastMode::Place).expect("hit");
        assert_eq!(hit.position, IVec3::ZERO);
    }

    #[test]
    fn test_diagonal_crossing_snaps_x_first() {
        let mut map = ChunkMap::with_capacity(8);
        map.add_chunk(IVec3::ZERO);
        // (1,0,0) would be hit if y were snapped before x.
        place(&mut map, IVec3::new(1, 0, 0));
        place(&mut map, IVec3::new(0, 1, 0));

        let direction = Vec3::new(1.0, 1.0, 0.0);
        let hit = cast(&mut map, Vec3::splat(0.5), direction, RaycastMode::Destroy).expect("hit");
        assert_eq!(hit.position, IVec3::new(0, 1, 0));
    }

    #[test]
    fn test_diagonal_crossing_snaps_x_before_z() {
        let mut map = ChunkMap::with_capacity(8);
        map.add_chunk(IVec3::ZERO);
        // (1,0,0) would be hit if z were snapped before x.
        place(&mut map, IVec3::new(1, 0, 0));
        place(&mut map, IVec3::new(0, 0, 1));

        let direction = Vec3::new(1.0, 0.0, 1.0);
        let hit = cast(&mut map, Vec3::splat(0.5), direction, RaycastMode::Destroy).expect("hit");
        assert_eq!(hit.position, IVec3::new(0, 0, 1));
    }

    #[test]
    fn test_corner_crossing_snaps_x_then_z() {
        let mut map = ChunkMap::with_capacity(8);
        map.add_chunk(IVec3::ZERO);
        // Snapping y before z would land on (0,0,1), x last on (1,0,0).
        place(&mut map, IVec3::new(1, 0, 0));
        place(&mut map, IVec3::new(0, 0, 1));
        place(&mut map, IVec3::new(0, 1, 0));

        let hit = cast(&mut map, Vec3::splat(0.5), Vec3::ONE, RaycastMode::Destroy).expect("hit");
        assert_eq!(hit.position, IVec3::new(0, 1, 0));
    }

    #[test]
    fn test_diagonal_place_uses_snapped_cell() {
        let mut map = ChunkMap::with_capacity(8);
        map.add_chunk(IVec3::ZERO);
        place(&mut map, IVec3::new(1, 1, 0));

        let direction = Vec3::new(1.0, 1.0, 0.0);
        let hit = cast(&mut map, Vec3::splat(0.5), direction, RaycastMode::Place).expect("hit");
        assert_eq!(hit.position, IVec3::new(0, 1, 0));
    }

    #[test]
    fn test_crosses_into_negative_chunk() {
        let mut map = ChunkMap::with_capacity(8);
        map.add_chunk(IVec3::ZERO);
        let west = map.add_chunk(IVec3::new(-CS, 0, 0));
        place(&mut map, IVec3::new(-3, 0, 0));

        let hit = cast(&mut map, Vec3::splat(0.5), -Vec3::X, RaycastMode::Destroy).expect("hit");
        assert_eq!(hit.chunk, west);
        assert_eq!(hit.position, IVec3::new(-3, 0, 0));
        assert_eq!(hit.local, IVec3::new(CS - 3, 0, 0));
    }

    #[test]
    fn test_missing_neighbour_is_no_target() {
        let mut map = ChunkMap::with_capacity(8);
        map.add_chunk(IVec3::ZERO);
        let hit = cast(&mut map, Vec3::splat(0.5), -Vec3::X, RaycastMode::Destroy);
        assert!(hit.is_none());
        assert_eq!(map.len(), 1, "raycast must not create chunks past the origin");
    }

    #[test]
    fn test_budget_exhausted_is_no_target() {
        let mut map = ChunkMap::with_capacity(8);
        map.add_chunk(IVec3::ZERO);
        // Reach is 8 blocks; the block at 20 is out of range.
        place(&mut map, IVec3::new(20, 0, 0));
        assert!(cast(&mut map, Vec3::splat(0.5), Vec3::X, RaycastMode::Destroy).is_none());
    }

    #[test]
    fn test_zero_direction_is_no_target() {
        let mut map = ChunkMap::with_capacity(8);
        assert!(cast(&mut map, Vec3::splat(0.5), Vec3::ZERO, RaycastMode::Destroy).is_none());
    }

    #[test]
    fn test_origin_chunk_created() {
        let mut map = ChunkMap::with_capacity(8);
        assert!(cast(&mut map, Vec3::new(-0.5, 0.5, 0.5), Vec3::Y, RaycastMode::Destroy).is_none());
        assert!(map.find(IVec3::new(-CS, 0, 0)).is_some());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_axes_changed() {
        assert_eq!(axes_changed(IVec3::ZERO, IVec3::ZERO), 0);
        assert_eq!(axes_changed(IVec3::ZERO, IVec3::new(1, 0, 0)), 1);
        assert_eq!(axes_changed(IVec3::ZERO, IVec3::new(1, -1, 1)), 3);
    }
}
