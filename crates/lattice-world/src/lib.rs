pub mod chunk;
pub mod chunk_map;
pub mod config;
pub mod raycast;
pub mod view;

use bytemuck::Pod;
use chunk::{ChunkData, ChunkId, ChunkRenderData};
use chunk_map::ChunkMap;
use config::{MissingChunkPolicy, WorldConfig};
use glam::Vec3;
use lattice_core::constants::{BUFFER_ALIGNMENT, CHUNK_BLOCK_SIZE, DRAW_COMMAND_BYTES, TRANSFORM_BYTES};
use lattice_core::device::{BufferUsage, GraphicsDevice};
use lattice_core::direction::Direction;
use lattice_core::error::DeviceError;
use lattice_core::math::{chunk_transform, split_world_pos};
use lattice_core::types::{Action, ChunkBlock, LocalPos, RaycastMode, WorldPos};
use lattice_memory::{HeapSlice, MemoryHeap, VertexPagePool};
use raycast::BlockTarget;
use thiserror::Error;

pub use view::WorldRenderer;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("mesh buffers have not been initialized")]
    BuffersNotInitialized,

    #[error("mesh heap too small for the vertex page pool")]
    HeapExhausted,

    #[error("invalid world config: {0}")]
    Config(String),
}

/// Outcome of [`World::submit_chunk_mesh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshUpload {
    /// The mesh now occupies `pages` vertex pages.
    Uploaded { pages: u32 },
    /// No vertices; the chunk holds no pages.
    Empty,
    /// Not enough free pages. The previous mesh is untouched and the chunk
    /// stays dirty.
    Deferred,
}

/// Slices of the single mesh heap shared by every chunk.
pub struct PageBuffers {
    pub heap: MemoryHeap,
    pub vertices: HeapSlice,
    pub draw_commands: HeapSlice,
    pub transforms: HeapSlice,
}

/// Resident chunks, the vertex page pool and the block edit entry points.
pub struct World {
    chunks: ChunkMap,
    pages: VertexPagePool,
    buffers: Option<PageBuffers>,
    config: WorldConfig,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    pub fn with_config(config: WorldConfig) -> Self {
        Self::with_chunk_map(config, ChunkMap::new())
    }

    /// World over an existing (usually smaller-capacity) chunk map.
    pub fn with_chunk_map(config: WorldConfig, chunks: ChunkMap) -> Self {
        let pages = VertexPagePool::new(config.page_count, config.page_size, config.vertex_stride);
        Self {
            chunks,
            pages,
            buffers: None,
            config,
        }
    }

    /// Return the chunk containing `position`, creating and linking it if needed.
    pub fn add_chunk(&mut self, position: WorldPos) -> ChunkId {
        self.chunks.add_chunk(position)
    }

    pub fn find_chunk(&self, position: WorldPos) -> Option<ChunkId> {
        self.chunks.find_containing(position)
    }

    pub fn chunk(&self, id: ChunkId) -> &ChunkData {
        self.chunks.chunk(id)
    }

    pub fn chunks(&self) -> &ChunkMap {
        &self.chunks
    }

    /// Block at a world coordinate. Non-resident chunks read as air.
    pub fn get_block(&self, position: WorldPos) -> ChunkBlock {
        let (chunk_pos, local) = split_world_pos(position);
        match self.chunks.find(chunk_pos) {
            Some(id) => self.chunks.chunk(id).get_block(local),
            None => ChunkBlock::AIR,
        }
    }

    /// Write one block. `action` is informational and does not change the
    /// mutation. Returns false when the edit was dropped because the chunk is
    /// not resident and the policy is [`MissingChunkPolicy::Ignore`].
    pub fn set_block(&mut self, position: WorldPos, block: ChunkBlock, action: Action) -> bool {
        let (chunk_pos, local) = split_world_pos(position);
        let id = match (self.chunks.find(chunk_pos), self.config.missing_chunk_policy) {
            (Some(id), _) => id,
            (None, MissingChunkPolicy::Create) => self.chunks.add_chunk(chunk_pos),
            (None, MissingChunkPolicy::Ignore) => {
                log::warn!(
                    "World: {:?} at {} ignored, chunk {} is not resident",
                    action,
                    position,
                    chunk_pos
                );
                return false;
            }
        };
        self.write_block(id, local, block);
        true
    }

    /// Set a cell and dirty every resident neighbour that shares the cell's faces.
    fn write_block(&mut self, id: ChunkId, local: LocalPos, block: ChunkBlock) {
        self.chunks.chunk_mut(id).set_block(local, block);
        let last = CHUNK_BLOCK_SIZE as i32 - 1;
        for axis in 0..3 {
            let edge = match local[axis] {
                0 => Some(false),
                v if v == last => Some(true),
                _ => None,
            };
            if let Some(positive) = edge {
                let direction = Direction::along_axis(axis, positive);
                if let Some(neighbour) = self.chunks.neighbour(id, direction) {
                    self.chunks.chunk_mut(neighbour).mark_dirty();
                }
            }
        }
    }

    /// Cast a ray through resident chunks. See [`raycast::raycast`].
    pub fn raycast(&mut self, origin: Vec3, direction: Vec3, mode: RaycastMode) -> Option<BlockTarget> {
        raycast::raycast(&mut self.chunks, &self.config.raycast, origin, direction, mode)
    }

    /// Raycast, then break the hit cell (`Destroy`) or fill the cell in
    /// front of it with `block` (`Place`). Returns the edited cell.
    pub fn edit_block(
        &mut self,
        origin: Vec3,
        direction: Vec3,
        mode: RaycastMode,
        block: ChunkBlock,
    ) -> Option<BlockTarget> {
        let target = self.raycast(origin, direction, mode)?;
        let block = match mode {
            RaycastMode::Destroy => ChunkBlock::AIR,
            RaycastMode::Place => block,
        };
        log::debug!("World: {:?} {:?} at {}", mode.action(), block, target.position);
        self.write_block(target.chunk, target.local, block);
        Some(target)
    }

    /// Chunks whose blocks changed since their last mesh upload.
    pub fn dirty_chunks(&self) -> impl Iterator<Item = ChunkId> + '_ {
        self.chunks
            .iter()
            .filter(|(_, chunk)| chunk.is_dirty())
            .map(|(id, _)| id)
    }

    /// Allocate the mesh heap and carve it into the vertex, draw command and
    /// transform arrays.
    pub fn init_gpu_buffers<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
    ) -> Result<(), WorldError> {
        let page_count = self.pages.page_count() as u64;
        let vertex_bytes = self.config.vertex_bytes();
        let command_bytes = page_count * DRAW_COMMAND_BYTES as u64;
        let transform_bytes = page_count * TRANSFORM_BYTES as u64;
        let size = vertex_bytes + command_bytes + transform_bytes + 2 * BUFFER_ALIGNMENT;

        let mut heap = MemoryHeap::new(device, "world_mesh_heap", size, BufferUsage::MESH_HEAP)?;
        let vertices = heap
            .allocate(vertex_bytes, BUFFER_ALIGNMENT)
            .ok_or(WorldError::HeapExhausted)?;
        let draw_commands = heap
            .allocate(command_bytes, BUFFER_ALIGNMENT)
            .ok_or(WorldError::HeapExhausted)?;
        let transforms = heap
            .allocate(transform_bytes, BUFFER_ALIGNMENT)
            .ok_or(WorldError::HeapExhausted)?;

        self.buffers = Some(PageBuffers {
            heap,
            vertices,
            draw_commands,
            transforms,
        });
        // Every draw command starts zeroed but carries its first vertex/instance.
        self.flush_all(device)
    }

    fn flush_all<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) -> Result<(), WorldError> {
        let buffers = self.buffers.as_ref().ok_or(WorldError::BuffersNotInitialized)?;
        let commands: &[u8] = bytemuck::cast_slice(self.pages.draw_commands());
        MemoryHeap::write(device, &buffers.draw_commands, 0, commands)?;
        let transforms: &[u8] = bytemuck::cast_slice(self.pages.transforms());
        MemoryHeap::write(device, &buffers.transforms, 0, transforms)?;
        self.pages.flush(device, &buffers.draw_commands, &buffers.transforms)?;
        Ok(())
    }

    /// Replace a chunk's mesh with `vertices`, spread over as many pages as
    /// needed. The vertex type must be exactly one vertex stride wide.
    pub fn submit_chunk_mesh<D, V>(
        &mut self,
        device: &mut D,
        id: ChunkId,
        vertices: &[V],
    ) -> Result<MeshUpload, WorldError>
    where
        D: GraphicsDevice + ?Sized,
        V: Pod,
    {
        assert_eq!(
            std::mem::size_of::<V>() as u32,
            self.pages.vertex_stride(),
            "vertex type does not match the configured vertex stride"
        );
        let buffers = self.buffers.as_ref().ok_or(WorldError::BuffersNotInitialized)?;
        let page_size = self.pages.page_size() as usize;
        let needed = vertices.len().div_ceil(page_size) as u32;
        let chunk = self.chunks.chunk_mut(id);
        let owned = self.pages.chain(chunk.render.page_head).count() as u32;

        if needed > self.pages.free_count() + owned {
            log::warn!(
                "World: chunk {} needs {} pages, only {} available; mesh deferred",
                chunk.position(),
                needed,
                self.pages.free_count() + owned
            );
            return Ok(MeshUpload::Deferred);
        }

        if let Some(head) = chunk.render.page_head.take() {
            self.pages.release(head);
        }
        chunk.render = ChunkRenderData::default();

        if vertices.is_empty() {
            chunk.mark_clean();
            self.pages
                .flush(device, &buffers.draw_commands, &buffers.transforms)?;
            return Ok(MeshUpload::Empty);
        }

        let mut chain: Vec<u32> = Vec::with_capacity(needed as usize);
        for _ in 0..needed {
            match self.pages.acquire() {
                Some(page) => {
                    if let Some(&prev) = chain.last() {
                        self.pages.link(prev, page);
                    }
                    chain.push(page);
                }
                None => {
                    if let Some(&head) = chain.first() {
                        self.pages.release(head);
                    }
                    return Ok(MeshUpload::Deferred);
                }
            }
        }

        for (&page, part) in chain.iter().zip(vertices.chunks(page_size)) {
            let bytes: &[u8] = bytemuck::cast_slice(part);
            if let Err(e) =
                MemoryHeap::write(device, &buffers.vertices, self.pages.page_byte_offset(page), bytes)
            {
                self.pages.release(chain[0]);
                return Err(e.into());
            }
            self.pages.set_vertex_count(page, part.len() as u32);
        }

        let head = chain[0];
        self.pages.process_pages(head, chunk_transform(chunk.position()));
        chunk.render = ChunkRenderData {
            page_head: Some(head),
            vertex_count: vertices.len() as u32,
        };
        chunk.mark_clean();
        self.pages
            .flush(device, &buffers.draw_commands, &buffers.transforms)?;
        Ok(MeshUpload::Uploaded { pages: needed })
    }

    /// Return a chunk's pages to the pool. The chunk keeps its blocks and
    /// becomes dirty again. Returns the number of pages released.
    pub fn release_chunk_mesh(&mut self, id: ChunkId) -> u32 {
        let chunk = self.chunks.chunk_mut(id);
        let released = match chunk.render.page_head.take() {
            Some(head) => self.pages.release(head),
            None => 0,
        };
        chunk.render = ChunkRenderData::default();
        if released > 0 {
            chunk.mark_dirty();
        }
        released
    }

    /// Push pending draw command and transform changes to the device.
    pub fn flush_pages<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) -> Result<(), WorldError> {
        let buffers = self.buffers.as_ref().ok_or(WorldError::BuffersNotInitialized)?;
        self.pages
            .flush(device, &buffers.draw_commands, &buffers.transforms)?;
        Ok(())
    }

    pub fn pages(&self) -> &VertexPagePool {
        &self.pages
    }

    pub fn buffers(&self) -> Option<&PageBuffers> {
        self.buffers.as_ref()
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }
}
