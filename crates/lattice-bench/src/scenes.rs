use glam::{IVec3, Vec3};
use lattice_core::constants::CHUNK_VOLUME;
use lattice_core::math::chunk_local_to_world;
use lattice_core::types::{Action, ChunkBlock};
use lattice_registry::ModHandler;
use lattice_world::chunk::ChunkData;
use lattice_world::view::WorldRenderer;
use lattice_world::World;

/// What a scene measures per iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    /// Write every cell of every chunk in view through `World::set_block`.
    Fill,
    /// Cast a fan of rays from the view center.
    RaycastSweep,
    /// Slide the view one chunk along a square loop.
    ViewSlide,
    /// Re-mesh and upload every dirty chunk in view, then dirty a few again.
    MeshChurn,
}

/// Configuration for a single benchmark scene.
pub struct SceneConfig {
    pub name: &'static str,
    pub kind: SceneKind,
    pub view_radius: u32,
    /// Percentage of cells filled with solid blocks.
    pub fill_percent: u32,
}

/// Rays cast per raycast iteration.
pub const RAYS_PER_SWEEP: u32 = 256;

pub fn standard_scenes() -> Vec<SceneConfig> {
    vec![
        SceneConfig {
            name: "fill-r1",
            kind: SceneKind::Fill,
            view_radius: 1,
            fill_percent: 50,
        },
        SceneConfig {
            name: "raycast-r1",
            kind: SceneKind::RaycastSweep,
            view_radius: 1,
            fill_percent: 5,
        },
        SceneConfig {
            name: "slide-r2",
            kind: SceneKind::ViewSlide,
            view_radius: 2,
            fill_percent: 0,
        },
        SceneConfig {
            name: "mesh-r1",
            kind: SceneKind::MeshChurn,
            view_radius: 1,
            fill_percent: 30,
        },
    ]
}

/// Solid blocks of the bundled base mod.
pub fn palette() -> Vec<ChunkBlock> {
    let base_ron = include_str!("../../../data/mods/base/mod.ron");
    let mut mods = ModHandler::new(1);
    match mods.add_mod_from_str(base_ron) {
        Ok(report) => log::info!("Bench palette: {} blocks", report.blocks_registered),
        Err(e) => log::error!("Bench palette failed to load: {e}"),
    }
    let palette: Vec<ChunkBlock> = mods
        .get_mod_by_name("base")
        .map(|m| {
            m.blocks
                .iter()
                .map(|b| ChunkBlock::new(m.lookup_index, b.lookup_index, 0))
                .collect()
        })
        .unwrap_or_default();
    if palette.is_empty() {
        vec![ModHandler::unknown_block()]
    } else {
        palette
    }
}

/// Deterministic block for cell `index` of the `salt`-th chunk; air for
/// roughly `100 - fill_percent` percent of cells.
pub fn bench_block(salt: u32, index: usize, fill_percent: u32, palette: &[ChunkBlock]) -> ChunkBlock {
    let hash = (salt as usize).wrapping_mul(31337) ^ index.wrapping_mul(7919);
    if (hash % 100) as u32 >= fill_percent {
        ChunkBlock::AIR
    } else {
        palette[(hash / 100) % palette.len()]
    }
}

/// Fill every chunk in view cell by cell. Returns the number of writes.
pub fn populate(
    world: &mut World,
    view: &WorldRenderer,
    fill_percent: u32,
    palette: &[ChunkBlock],
    salt: u32,
) -> u64 {
    let mut writes = 0;
    let origins: Vec<IVec3> = view
        .cells()
        .iter()
        .map(|cell| world.chunk(cell.chunk).position())
        .collect();
    for (chunk_index, origin) in origins.into_iter().enumerate() {
        for index in 0..CHUNK_VOLUME as usize {
            let block = bench_block(salt ^ chunk_index as u32, index, fill_percent, palette);
            let position = chunk_local_to_world(origin, ChunkData::get_position(index));
            world.set_block(position, block, Action::Set);
            writes += 1;
        }
    }
    writes
}

/// Unit directions spread over a sphere (golden-angle spiral).
pub fn ray_directions(count: u32) -> Vec<Vec3> {
    let golden = std::f32::consts::PI * (3.0 - 5f32.sqrt());
    (0..count)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f32 + 0.5) / count as f32;
            let r = (1.0 - y * y).sqrt();
            let theta = golden * i as f32;
            Vec3::new(r * theta.cos(), y, r * theta.sin())
        })
        .collect()
}

/// One-chunk step of a square loop with sides of four chunks.
pub fn slide_step(iteration: u32) -> IVec3 {
    match (iteration / 4) % 4 {
        0 => IVec3::X,
        1 => IVec3::Z,
        2 => IVec3::NEG_X,
        _ => IVec3::NEG_Z,
    }
}
