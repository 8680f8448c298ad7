use std::time::Instant;

use glam::Vec3;
use lattice_core::constants::CHUNK_BLOCK_SIZE;
use lattice_core::device::GraphicsDevice;
use lattice_core::error::DeviceError;
use lattice_core::types::{Action, ChunkBlock, RaycastMode};
use lattice_memory::HostDevice;
use lattice_render::WgpuDevice;
use lattice_world::config::WorldConfig;
use lattice_world::view::WorldRenderer;
use lattice_world::{MeshUpload, World, WorldError};

use crate::mesher;
use crate::scenes::{self, SceneConfig, SceneKind, RAYS_PER_SWEEP};

/// Timing data for a single benchmark run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TimingSeries {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

/// Result of a single scene benchmark.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkResult {
    pub scene_name: String,
    pub backend: String,
    pub chunk_count: u32,
    /// Operations of the scene's kind performed in the last iteration.
    pub operations: u64,
    pub pages_used: u32,
    pub iterations: u32,
    pub timings: TimingSeries,
}

/// Runs world scenes against a host-memory or wgpu device.
pub struct BenchmarkRunner {
    device: Box<dyn GraphicsDevice>,
    backend: String,
    iterations: u32,
    world_config: WorldConfig,
}

impl BenchmarkRunner {
    /// Runner backed by [`HostDevice`]; needs no GPU.
    pub fn headless(iterations: u32, world_config: WorldConfig) -> Self {
        Self {
            device: Box::new(HostDevice::new()),
            backend: "host".to_string(),
            iterations,
            world_config,
        }
    }

    /// Runner backed by a native wgpu device. Blocks on adapter request.
    pub fn gpu(iterations: u32, world_config: WorldConfig) -> Result<Self, DeviceError> {
        let device = pollster::block_on(WgpuDevice::request_headless("bench-device"))?;
        Ok(Self {
            device: Box::new(device),
            backend: "wgpu".to_string(),
            iterations,
            world_config,
        })
    }

    /// Run a single scene in a fresh world and return timing results.
    pub fn run_scene(&mut self, config: &SceneConfig) -> Result<BenchmarkResult, WorldError> {
        log::info!(
            "Running scene '{}' ({:?}, radius {})...",
            config.name,
            config.kind,
            config.view_radius
        );

        let mut world = World::with_config(self.world_config);
        world.init_gpu_buffers(self.device.as_mut())?;
        let palette = scenes::palette();

        let mut focus = Vec3::splat(0.5);
        let mut view = WorldRenderer::new();
        view.set_view_radius(&mut world, config.view_radius, focus);
        if config.kind != SceneKind::Fill {
            scenes::populate(&mut world, &view, config.fill_percent, &palette, 0);
        }

        let directions = scenes::ray_directions(RAYS_PER_SWEEP);
        let mut frame_times = Vec::with_capacity(self.iterations as usize);
        let mut operations = 0u64;

        for iteration in 0..self.iterations {
            let frame_start = Instant::now();
            operations = match config.kind {
                SceneKind::Fill => {
                    scenes::populate(&mut world, &view, config.fill_percent, &palette, iteration)
                }
                SceneKind::RaycastSweep => {
                    let mode = if iteration % 2 == 0 {
                        RaycastMode::Destroy
                    } else {
                        RaycastMode::Place
                    };
                    directions
                        .iter()
                        .filter(|&&d| world.raycast(focus, d, mode).is_some())
                        .count() as u64
                }
                SceneKind::ViewSlide => {
                    focus += scenes::slide_step(iteration).as_vec3() * CHUNK_BLOCK_SIZE as f32;
                    view.update(&mut world, focus)
                        .map_or(0, |shift| shift.chunks_created as u64)
                }
                SceneKind::MeshChurn => self.remesh(&mut world, &view)?,
            };
            frame_times.push(frame_start.elapsed().as_secs_f64() * 1000.0);

            if config.kind == SceneKind::MeshChurn {
                churn(&mut world, &view, &palette, iteration);
            }
        }

        let timings = compute_timings(&frame_times);
        log::info!(
            "  Done: mean={:.3}ms, p95={:.3}ms, p99={:.3}ms ({} ops, {} pages)",
            timings.mean_ms,
            timings.p95_ms,
            timings.p99_ms,
            operations,
            world.pages().used_count()
        );

        Ok(BenchmarkResult {
            scene_name: config.name.to_string(),
            backend: self.backend.clone(),
            chunk_count: world.chunks().len() as u32,
            operations,
            pages_used: world.pages().used_count(),
            iterations: self.iterations,
            timings,
        })
    }

    /// Mesh and upload every dirty chunk in view. Returns the number uploaded.
    fn remesh(&mut self, world: &mut World, view: &WorldRenderer) -> Result<u64, WorldError> {
        let mut uploaded = 0;
        for id in view.chunks_needing_mesh(world) {
            let mesh = mesher::top_faces(world.chunk(id));
            match world.submit_chunk_mesh(self.device.as_mut(), id, &mesh)? {
                MeshUpload::Deferred => log::warn!("  chunk {:?} deferred", id),
                _ => uploaded += 1,
            }
        }
        Ok(uploaded)
    }
}

/// Flip one block in every third chunk in view so the next pass has work.
fn churn(world: &mut World, view: &WorldRenderer, palette: &[ChunkBlock], iteration: u32) {
    let side = CHUNK_BLOCK_SIZE as i32;
    for (i, cell) in view.cells().iter().enumerate().step_by(3) {
        let origin = world.chunk(cell.chunk).position();
        let offset = (iteration as i32 + i as i32) % side;
        let position = origin + glam::IVec3::new(offset, side / 2, offset);
        let block = if world.get_block(position).is_air() {
            palette[i % palette.len()]
        } else {
            ChunkBlock::AIR
        };
        world.set_block(position, block, Action::Set);
    }
}

/// Compute timing statistics from a list of frame times in milliseconds.
pub fn compute_timings(times: &[f64]) -> TimingSeries {
    if times.is_empty() {
        return TimingSeries {
            mean_ms: 0.0,
            median_ms: 0.0,
            p95_ms: 0.0,
            p99_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
        };
    }

    let mut sorted = times.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let p95_idx = ((n as f64) * 0.95).ceil() as usize;
    let p99_idx = ((n as f64) * 0.99).ceil() as usize;

    TimingSeries {
        mean_ms: mean,
        median_ms: median,
        p95_ms: sorted[p95_idx.min(n - 1)],
        p99_ms: sorted[p99_idx.min(n - 1)],
        min_ms: sorted[0],
        max_ms: sorted[n - 1],
    }
}
