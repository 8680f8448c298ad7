use glam::{IVec3, Mat4, Vec3};
use lattice_core::constants::CHUNK_BLOCK_SIZE;
use lattice_core::direction::Direction;
use lattice_core::math::{chunk_transform, focus_to_chunk};
use lattice_core::types::ChunkPos;

use crate::chunk::ChunkId;
use crate::World;

/// One slot of the view cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewCell {
    pub chunk: ChunkId,
    pub transform: Mat4,
}

/// Result of a focus move handled by [`WorldRenderer::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewShift {
    /// Chunk steps moved along each axis, each in [-1, 1].
    pub delta: IVec3,
    /// Chunks that had to be created to fill the new edge of the cube.
    pub chunks_created: u32,
}

/// Cube of `2R+1` chunks per side centered on the focus chunk.
///
/// Cells are stored x-fastest: cell `(x, y, z)` lives at `(n*z + y)*n + x`
/// with `n = 2R+1`, and covers the chunk at `focus + (x-R, y-R, z-R) * side`.
#[derive(Debug, Default)]
pub struct WorldRenderer {
    view_radius: u32,
    focus: ChunkPos,
    cells: Vec<ViewCell>,
}

impl WorldRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild every cell around `focus`. Radius 0 drops the view.
    pub fn set_view_radius(&mut self, world: &mut World, radius: u32, focus: Vec3) {
        self.view_radius = radius;
        self.focus = focus_to_chunk(focus);
        self.cells.clear();
        if radius == 0 {
            log::debug!("WorldRenderer: view released");
            return;
        }

        let n = Self::side_for(radius) as i32;
        let r = radius as i32;
        let cs = CHUNK_BLOCK_SIZE as i32;
        self.cells.reserve((n * n * n) as usize);
        for z in 0..n {
            for y in 0..n {
                for x in 0..n {
                    let position = self.focus + (IVec3::new(x, y, z) - IVec3::splat(r)) * cs;
                    let chunk = world.add_chunk(position);
                    self.cells.push(ViewCell {
                        chunk,
                        transform: chunk_transform(position),
                    });
                }
            }
        }
        log::info!(
            "WorldRenderer: radius {} around {} ({} cells, {} resident chunks)",
            radius,
            self.focus,
            self.cells.len(),
            world.chunks().len()
        );
    }

    /// Follow the focus to its chunk. A move of one chunk along any set of
    /// axes walks every cell across the neighbour graph; moving further in a
    /// single update of an active view is a caller bug. A released view only
    /// records the new focus.
    pub fn update(&mut self, world: &mut World, focus: Vec3) -> Option<ViewShift> {
        let target = focus_to_chunk(focus);
        if target == self.focus {
            return None;
        }
        if self.view_radius == 0 {
            // Nothing to walk, so the focus may jump anywhere.
            self.focus = target;
            return None;
        }
        let delta = (target - self.focus) / CHUNK_BLOCK_SIZE as i32;
        assert!(
            delta.abs().max_element() <= 1,
            "view moved more than one chunk in one update ({} -> {})",
            self.focus,
            target
        );
        self.focus = target;

        let before = world.chunks().len();
        for axis in 0..3 {
            if delta[axis] == 0 {
                continue;
            }
            let direction = Direction::along_axis(axis, delta[axis] > 0);
            for cell in &mut self.cells {
                let next = match world.chunks().neighbour(cell.chunk, direction) {
                    Some(id) => id,
                    None => {
                        let position = world.chunk(cell.chunk).neighbour_position(direction);
                        world.add_chunk(position)
                    }
                };
                cell.chunk = next;
                cell.transform = chunk_transform(world.chunk(next).position());
            }
        }

        let shift = ViewShift {
            delta,
            chunks_created: (world.chunks().len() - before) as u32,
        };
        log::debug!(
            "WorldRenderer: shifted by {} to {} ({} chunks created)",
            delta,
            self.focus,
            shift.chunks_created
        );
        Some(shift)
    }

    fn side_for(radius: u32) -> u32 {
        2 * radius + 1
    }

    /// Cells per axis, 0 when the view is released.
    pub fn side(&self) -> u32 {
        if self.view_radius == 0 {
            0
        } else {
            Self::side_for(self.view_radius)
        }
    }

    pub fn cell(&self, x: u32, y: u32, z: u32) -> Option<&ViewCell> {
        let n = self.side();
        if x >= n || y >= n || z >= n {
            return None;
        }
        self.cells.get(((n * z + y) * n + x) as usize)
    }

    pub fn cells(&self) -> &[ViewCell] {
        &self.cells
    }

    pub fn view_radius(&self) -> u32 {
        self.view_radius
    }

    /// Origin of the focus chunk.
    pub fn focus(&self) -> ChunkPos {
        self.focus
    }

    /// Vertex pages holding the meshes of every chunk in view, in cell order.
    pub fn draw_pages(&self, world: &World) -> Vec<u32> {
        self.cells
            .iter()
            .flat_map(|cell| {
                let head = world.chunk(cell.chunk).render.page_head;
                world.pages().chain(head)
            })
            .collect()
    }

    /// Chunks in view whose mesh is out of date.
    pub fn chunks_needing_mesh(&self, world: &World) -> Vec<ChunkId> {
        self.cells
            .iter()
            .map(|cell| cell.chunk)
            .filter(|&id| world.chunk(id).is_dirty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk_map::ChunkMap;
    use crate::config::WorldConfig;
    use lattice_core::types::{Action, ChunkBlock};
    use lattice_memory::HostDevice;

    const CS: i32 = CHUNK_BLOCK_SIZE as i32;

    fn world() -> World {
        let config = WorldConfig {
            page_count: 16,
            page_size: 8,
            ..Default::default()
        };
        World::with_chunk_map(config, ChunkMap::with_capacity(256))
    }

    #[test]
    fn test_set_view_radius_builds_cube() {
        let mut world = world();
        let mut view = WorldRenderer::new();
        view.set_view_radius(&mut world, 1, Vec3::new(40.0, 5.0, -3.0));

        assert_eq!(view.focus(), IVec3::new(CS, 0, -CS));
        assert_eq!(view.cells().len(), 27);
        assert_eq!(world.chunks().len(), 27);
        for z in 0..3 {
            for y in 0..3 {
                for x in 0..3 {
                    let cell = view.cell(x, y, z).expect("in range");
                    let expected =
                        view.focus() + (IVec3::new(x as i32, y as i32, z as i32) - IVec3::ONE) * CS;
                    assert_eq!(world.chunk(cell.chunk).position(), expected);
                    assert_eq!(cell.transform, chunk_transform(expected));
                }
            }
        }
        assert!(view.cell(3, 0, 0).is_none());
    }

    #[test]
    fn test_radius_zero_releases_view() {
        let mut world = world();
        let mut view = WorldRenderer::new();
        view.set_view_radius(&mut world, 1, Vec3::ZERO);
        view.set_view_radius(&mut world, 0, Vec3::ZERO);
        assert!(view.cells().is_empty());
        assert_eq!(view.side(), 0);
        assert_eq!(world.chunks().len(), 27, "releasing the view keeps chunks resident");
        assert!(view.update(&mut world, Vec3::new(CS as f32, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_inactive_view_follows_far_focus() {
        let mut world = world();
        let mut view = WorldRenderer::new();
        assert!(view.update(&mut world, Vec3::new(500.0, 0.0, 0.0)).is_none());
        assert_eq!(view.focus(), IVec3::new(15 * CS, 0, 0));
        assert_eq!(world.chunks().len(), 0, "an inactive view creates no chunks");

        // Enabling the view afterwards builds around the stored focus.
        view.set_view_radius(&mut world, 1, Vec3::new(500.0, 0.0, 0.0));
        let center = view.cell(1, 1, 1).expect("center");
        assert_eq!(world.chunk(center.chunk).position(), IVec3::new(15 * CS, 0, 0));
    }

    #[test]
    fn test_update_within_chunk_is_noop() {
        let mut world = world();
        let mut view = WorldRenderer::new();
        view.set_view_radius(&mut world, 1, Vec3::splat(1.0));
        assert!(view.update(&mut world, Vec3::splat(31.9)).is_none());
    }

    #[test]
    fn test_shift_east_with_existing_neighbours() {
        let mut world = world();
        for x in -1..=2 {
            for y in -1..=1 {
                for z in -1..=1 {
                    world.add_chunk(IVec3::new(x, y, z) * CS);
                }
            }
        }
        let resident = world.chunks().len();
        let mut view = WorldRenderer::new();
        view.set_view_radius(&mut world, 1, Vec3::splat(0.5));
        let before: Vec<ChunkId> = view.cells().iter().map(|c| c.chunk).collect();

        let shift = view
            .update(&mut world, Vec3::new(CS as f32 + 0.5, 0.5, 0.5))
            .expect("moved");
        assert_eq!(shift.delta, IVec3::X);
        assert_eq!(shift.chunks_created, 0);
        assert_eq!(world.chunks().len(), resident);

        for (old, cell) in before.iter().zip(view.cells()) {
            assert_eq!(
                Some(cell.chunk),
                world.chunks().neighbour(*old, Direction::East),
                "each cell should move to its east neighbour"
            );
        }
    }

    #[test]
    fn test_shift_creates_missing_edge() {
        let mut world = world();
        let mut view = WorldRenderer::new();
        view.set_view_radius(&mut world, 1, Vec3::ZERO);
        let shift = view.update(&mut world, Vec3::new(0.0, 0.0, -1.0)).expect("moved");
        assert_eq!(shift.delta, IVec3::new(0, 0, -1));
        assert_eq!(shift.chunks_created, 9);
        assert_eq!(world.chunks().len(), 36);
    }

    #[test]
    fn test_diagonal_shift_matches_rebuild() {
        let mut world = world();
        let mut view = WorldRenderer::new();
        view.set_view_radius(&mut world, 1, Vec3::ZERO);
        let focus = Vec3::new(-1.0, CS as f32, CS as f32);
        let shift = view.update(&mut world, focus).expect("moved");
        assert_eq!(shift.delta, IVec3::new(-1, 1, 1));

        let mut rebuilt = WorldRenderer::new();
        rebuilt.set_view_radius(&mut world, 1, focus);
        assert_eq!(view.cells(), rebuilt.cells());
    }

    #[test]
    #[should_panic(expected = "more than one chunk")]
    fn test_two_chunk_jump_panics() {
        let mut world = world();
        let mut view = WorldRenderer::new();
        view.set_view_radius(&mut world, 1, Vec3::ZERO);
        view.update(&mut world, Vec3::new(2.0 * CS as f32, 0.0, 0.0));
    }

    #[test]
    fn test_draw_pages_and_remesh_list() {
        let mut world = world();
        let mut device = HostDevice::new();
        world.init_gpu_buffers(&mut device).expect("init");
        let mut view = WorldRenderer::new();
        view.set_view_radius(&mut world, 1, Vec3::ZERO);
        assert!(view.chunks_needing_mesh(&world).is_empty());

        world.set_block(IVec3::new(3, 3, 3), ChunkBlock::new(1, 0, 0), Action::Set);
        let center = world.find_chunk(IVec3::ZERO).expect("center");
        assert_eq!(view.chunks_needing_mesh(&world), vec![center]);

        let mesh = vec![[0u32; 4]; 12];
        world.submit_chunk_mesh(&mut device, center, &mesh).expect("upload");
        assert!(view.chunks_needing_mesh(&world).is_empty());
        let pages = view.draw_pages(&world);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages, world.pages().chain(world.chunk(center).render.page_head).collect::<Vec<_>>());
    }
}
