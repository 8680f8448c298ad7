use lattice_core::constants::{CHUNK_BLOCK_SIZE, CHUNK_VOLUME};
use lattice_core::direction::{Direction, ALL_DIRECTIONS, DIRECTION_COUNT};
use lattice_core::math::{block_index, block_position, chunk_contains, world_to_chunk};
use lattice_core::types::{ChunkBlock, ChunkPos, LocalPos, WorldPos};

/// Stable index of a chunk inside its [`ChunkMap`](crate::chunk_map::ChunkMap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(pub u32);

/// The 6 face-adjacent chunks of a chunk, by [`Direction`] index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbours {
    links: [Option<ChunkId>; DIRECTION_COUNT],
}

impl Neighbours {
    pub fn get(&self, direction: Direction) -> Option<ChunkId> {
        self.links[direction.index()]
    }

    /// Lookup by raw direction index. Indices outside [0, 6) panic.
    pub fn get_index(&self, index: usize) -> Option<ChunkId> {
        self.get(Direction::from_index(index))
    }

    pub(crate) fn set(&mut self, direction: Direction, chunk: ChunkId) {
        self.links[direction.index()] = Some(chunk);
    }

    /// Linked neighbours with their direction.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, ChunkId)> + '_ {
        ALL_DIRECTIONS
            .into_iter()
            .filter_map(|d| self.get(d).map(|id| (d, id)))
    }

    pub fn count(&self) -> usize {
        self.links.iter().filter(|l| l.is_some()).count()
    }
}

/// Vertex pages currently holding a chunk's mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkRenderData {
    /// First page of the chunk's page chain.
    pub page_head: Option<u32>,
    pub vertex_count: u32,
}

/// Dense CHUNK_BLOCK_SIZE^3 block grid at a grid-aligned position.
#[derive(Debug)]
pub struct ChunkData {
    position: ChunkPos,
    blocks: Box<[ChunkBlock]>,
    dirty: bool,
    neighbours: Neighbours,
    pub render: ChunkRenderData,
}

impl ChunkData {
    /// An all-air chunk. `position` must be grid-aligned.
    pub fn new(position: ChunkPos) -> Self {
        assert_eq!(
            world_to_chunk(position),
            position,
            "chunk position {position} is not grid-aligned"
        );
        Self {
            position,
            blocks: vec![ChunkBlock::AIR; CHUNK_VOLUME as usize].into_boxed_slice(),
            dirty: false,
            neighbours: Neighbours::default(),
            render: ChunkRenderData::default(),
        }
    }

    /// Flat cell index of a local coordinate.
    pub fn get_index(local: LocalPos) -> usize {
        block_index(local)
    }

    /// Local coordinate of a flat cell index.
    pub fn get_position(index: usize) -> LocalPos {
        block_position(index)
    }

    pub fn get_block(&self, local: LocalPos) -> ChunkBlock {
        self.blocks[block_index(local)]
    }

    /// Overwrite one cell and mark the chunk dirty. Returns the previous block.
    pub fn set_block(&mut self, local: LocalPos, block: ChunkBlock) -> ChunkBlock {
        self.dirty = true;
        std::mem::replace(&mut self.blocks[block_index(local)], block)
    }

    /// Refill the whole grid with air.
    pub fn reset(&mut self) {
        self.blocks.fill(ChunkBlock::AIR);
        self.dirty = true;
    }

    /// Whether a world block coordinate falls inside this chunk.
    pub fn contains(&self, world: WorldPos) -> bool {
        chunk_contains(self.position, world)
    }

    pub fn position(&self) -> ChunkPos {
        self.position
    }

    /// World-space coordinate one chunk away in `direction`.
    pub fn neighbour_position(&self, direction: Direction) -> ChunkPos {
        self.position + direction.offset() * CHUNK_BLOCK_SIZE as i32
    }

    pub fn blocks(&self) -> &[ChunkBlock] {
        &self.blocks
    }

    pub fn non_air_count(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_air()).count()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn neighbours(&self) -> &Neighbours {
        &self.neighbours
    }

    pub(crate) fn neighbours_mut(&mut self) -> &mut Neighbours {
        &mut self.neighbours
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;

    const CS: i32 = CHUNK_BLOCK_SIZE as i32;

    #[test]
    fn test_new_chunk_is_all_air() {
        let chunk = ChunkData::new(IVec3::new(CS, -CS, 0));
        assert!(chunk.blocks().iter().all(|b| *b == ChunkBlock::AIR));
        assert_eq!(chunk.blocks().len(), CHUNK_VOLUME as usize);
        assert!(!chunk.is_dirty());
        assert_eq!(chunk.neighbours().count(), 0);
        assert_eq!(chunk.render, ChunkRenderData::default());
    }

    #[test]
    #[should_panic(expected = "not grid-aligned")]
    fn test_unaligned_position_panics() {
        ChunkData::new(IVec3::new(1, 0, 0));
    }

    #[test]
    fn test_set_block_marks_dirty() {
        let mut chunk = ChunkData::new(IVec3::ZERO);
        let stone = ChunkBlock::new(1, 0, 0);
        let previous = chunk.set_block(IVec3::new(3, 4, 5), stone);
        assert_eq!(previous, ChunkBlock::AIR);
        assert!(chunk.is_dirty());
        assert_eq!(chunk.get_block(IVec3::new(3, 4, 5)), stone);
        assert_eq!(chunk.blocks()[ChunkData::get_index(IVec3::new(3, 4, 5))], stone);
        assert_eq!(chunk.non_air_count(), 1);

        chunk.mark_clean();
        assert!(!chunk.is_dirty());
    }

    #[test]
    fn test_reset_restores_air() {
        let mut chunk = ChunkData::new(IVec3::ZERO);
        chunk.set_block(IVec3::ZERO, ChunkBlock::new(1, 1, 0));
        chunk.mark_clean();
        chunk.reset();
        assert_eq!(chunk.non_air_count(), 0);
        assert!(chunk.is_dirty());
    }

    #[test]
    fn test_index_position_roundtrip_corners() {
        for local in [IVec3::ZERO, IVec3::new(CS - 1, 0, 0), IVec3::splat(CS - 1), IVec3::new(0, CS - 1, 7)] {
            assert_eq!(ChunkData::get_position(ChunkData::get_index(local)), local);
        }
    }

    #[test]
    fn test_contains_and_neighbour_position() {
        let chunk = ChunkData::new(IVec3::new(-CS, 0, 0));
        assert!(chunk.contains(IVec3::new(-1, 0, 0)));
        assert!(chunk.contains(IVec3::new(-CS, CS - 1, 0)));
        assert!(!chunk.contains(IVec3::ZERO));
        assert_eq!(chunk.neighbour_position(Direction::East), IVec3::ZERO);
        assert_eq!(chunk.neighbour_position(Direction::North), IVec3::new(-CS, 0, -CS));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_neighbour_index_out_of_range_panics() {
        Neighbours::default().get_index(6);
    }
}
