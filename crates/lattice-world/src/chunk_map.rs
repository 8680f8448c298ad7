use crate::chunk::{ChunkData, ChunkId};
use lattice_core::constants::MAX_RESIDENT_CHUNKS;
use lattice_core::direction::{Direction, ALL_DIRECTIONS};
use lattice_core::math::world_to_chunk;
use lattice_core::types::{ChunkPos, WorldPos};
use std::collections::HashMap;

/// Arena of resident chunks plus a position index.
///
/// Chunks are never removed, so a [`ChunkId`] stays valid for the lifetime of
/// the map and neighbour links are plain ids instead of pointers.
pub struct ChunkMap {
    chunks: Vec<ChunkData>,
    by_position: HashMap<ChunkPos, ChunkId>,
    capacity: u32,
}

impl Default for ChunkMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkMap {
    pub fn new() -> Self {
        Self::with_capacity(MAX_RESIDENT_CHUNKS)
    }

    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            chunks: Vec::new(),
            by_position: HashMap::new(),
            capacity,
        }
    }

    /// Return the chunk containing `position`, creating an all-air chunk and
    /// linking it to its resident face neighbours if none exists yet.
    pub fn add_chunk(&mut self, position: WorldPos) -> ChunkId {
        let position = world_to_chunk(position);
        if let Some(&id) = self.by_position.get(&position) {
            return id;
        }

        assert!(
            (self.chunks.len() as u32) < self.capacity,
            "resident chunk count exceeds capacity {}",
            self.capacity
        );

        let id = ChunkId(self.chunks.len() as u32);
        let mut chunk = ChunkData::new(position);
        for direction in ALL_DIRECTIONS {
            let neighbour_pos = chunk.neighbour_position(direction);
            if let Some(&neighbour) = self.by_position.get(&neighbour_pos) {
                chunk.neighbours_mut().set(direction, neighbour);
                self.chunks[neighbour.0 as usize]
                    .neighbours_mut()
                    .set(direction.opposite(), id);
            }
        }

        log::debug!(
            "ChunkMap: chunk {:?} at {} ({} neighbours)",
            id,
            position,
            chunk.neighbours().count()
        );
        self.chunks.push(chunk);
        self.by_position.insert(position, id);
        id
    }

    /// Chunk whose origin is exactly `position`.
    pub fn find(&self, position: ChunkPos) -> Option<ChunkId> {
        self.by_position.get(&position).copied()
    }

    /// Chunk containing the world block coordinate `world`.
    pub fn find_containing(&self, world: WorldPos) -> Option<ChunkId> {
        self.find(world_to_chunk(world))
    }

    pub fn get(&self, id: ChunkId) -> Option<&ChunkData> {
        self.chunks.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: ChunkId) -> Option<&mut ChunkData> {
        self.chunks.get_mut(id.0 as usize)
    }

    /// Chunk for an id handed out by this map.
    pub fn chunk(&self, id: ChunkId) -> &ChunkData {
        &self.chunks[id.0 as usize]
    }

    pub fn chunk_mut(&mut self, id: ChunkId) -> &mut ChunkData {
        &mut self.chunks[id.0 as usize]
    }

    pub fn neighbour(&self, id: ChunkId, direction: Direction) -> Option<ChunkId> {
        self.chunk(id).neighbours().get(direction)
    }

    /// Iterator over all resident chunks in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkId, &ChunkData)> {
        self.chunks
            .iter()
            .enumerate()
            .map(|(i, c)| (ChunkId(i as u32), c))
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;
    use lattice_core::constants::CHUNK_BLOCK_SIZE;

    const CS: i32 = CHUNK_BLOCK_SIZE as i32;

    /// Every link must point at the chunk one side-length away and be mirrored.
    fn assert_links_symmetric(map: &ChunkMap) {
        for (id, chunk) in map.iter() {
            for direction in ALL_DIRECTIONS {
                let expected = map.find(chunk.neighbour_position(direction));
                assert_eq!(
                    chunk.neighbours().get(direction),
                    expected,
                    "chunk {id:?} at {} has a wrong {direction:?} link",
                    chunk.position()
                );
                if let Some(neighbour) = expected {
                    assert_eq!(map.neighbour(neighbour, direction.opposite()), Some(id));
                }
            }
        }
    }

    #[test]
    fn test_add_chunk_idempotent() {
        let mut map = ChunkMap::with_capacity(16);
        let a = map.add_chunk(IVec3::new(CS, 0, 0));
        let b = map.add_chunk(IVec3::new(CS, 0, 0));
        assert_eq!(a, b, "adding the same position twice should return the same chunk");
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_add_chunk_aligns_position() {
        let mut map = ChunkMap::with_capacity(16);
        let a = map.add_chunk(IVec3::new(-1, 5, CS + 3));
        assert_eq!(map.chunk(a).position(), IVec3::new(-CS, 0, CS));
        assert_eq!(map.find_containing(IVec3::new(-CS, 31, CS + 31)), Some(a));
        assert_eq!(map.find(IVec3::new(-1, 5, CS + 3)), None, "find takes exact origins");
    }

    #[test]
    fn test_six_neighbours_link_symmetrically() {
        let mut map = ChunkMap::with_capacity(16);
        let center = map.add_chunk(IVec3::ZERO);
        for direction in ALL_DIRECTIONS {
            map.add_chunk(direction.offset() * CS);
        }
        assert_eq!(map.len(), 7);
        assert_eq!(map.chunk(center).neighbours().count(), 6);
        for direction in ALL_DIRECTIONS {
            let neighbour = map.neighbour(center, direction).expect("linked");
            assert_eq!(map.chunk(neighbour).position(), direction.offset() * CS);
            assert_eq!(map.neighbour(neighbour, direction.opposite()), Some(center));
            // Outer chunks only touch the center.
            assert_eq!(map.chunk(neighbour).neighbours().count(), 1);
        }
        assert_links_symmetric(&map);
    }

    #[test]
    fn test_re_adding_does_not_relink() {
        let mut map = ChunkMap::with_capacity(16);
        let a = map.add_chunk(IVec3::ZERO);
        let b = map.add_chunk(IVec3::new(CS, 0, 0));
        let before = *map.chunk(a).neighbours();
        assert_eq!(map.add_chunk(IVec3::ZERO), a);
        assert_eq!(*map.chunk(a).neighbours(), before);
        assert_eq!(map.neighbour(a, Direction::East), Some(b));
    }

    #[test]
    fn test_symmetry_in_dense_block() {
        let mut map = ChunkMap::with_capacity(64);
        // Insert a 3x3x3 block in a scrambled order.
        let mut coords = Vec::new();
        for x in -1..=1 {
            for y in -1..=1 {
                for z in -1..=1 {
                    coords.push(IVec3::new(x, y, z) * CS);
                }
            }
        }
        coords.sort_by_key(|c| (c.y, -c.x, c.z));
        for c in coords {
            map.add_chunk(c);
        }
        assert_eq!(map.len(), 27);
        assert_links_symmetric(&map);
        let center = map.find(IVec3::ZERO).expect("center");
        assert_eq!(map.chunk(center).neighbours().count(), 6);
    }

    #[test]
    fn test_non_adjacent_chunks_not_linked() {
        let mut map = ChunkMap::with_capacity(16);
        let a = map.add_chunk(IVec3::ZERO);
        map.add_chunk(IVec3::new(2 * CS, 0, 0));
        map.add_chunk(IVec3::new(CS, CS, 0));
        assert_eq!(map.chunk(a).neighbours().count(), 0);
        assert_links_symmetric(&map);
    }

    #[test]
    #[should_panic(expected = "exceeds capacity")]
    fn test_capacity_overflow_panics() {
        let mut map = ChunkMap::with_capacity(2);
        map.add_chunk(IVec3::ZERO);
        map.add_chunk(IVec3::new(CS, 0, 0));
        map.add_chunk(IVec3::new(2 * CS, 0, 0));
    }
}
