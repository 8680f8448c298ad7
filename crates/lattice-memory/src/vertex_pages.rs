use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use lattice_core::device::GraphicsDevice;
use lattice_core::error::DeviceError;

use crate::heap::{HeapSlice, MemoryHeap};

/// Indirect draw arguments for one page, laid out as the GPU expects them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct DrawCommand {
    pub vertex_count: u32,
    pub instance_count: u32,
    pub first_vertex: u32,
    /// Equal to the page index so the shader can fetch the page transform.
    pub first_instance: u32,
}

/// One fixed-size slice of the shared vertex buffer.
#[derive(Debug, Clone)]
pub struct VertexPage {
    pub index: u32,
    /// Vertices written into this page. Always 0 while the page is free.
    pub vertex_count: u32,
    /// Next page in whichever list this page belongs to (free list or a
    /// chunk's page chain).
    pub next: Option<u32>,
    in_use: bool,
}

impl VertexPage {
    pub fn is_in_use(&self) -> bool {
        self.in_use
    }
}

/// Fixed pool of vertex pages with an index-based free list.
///
/// The pool mirrors two GPU arrays on the CPU: one [`DrawCommand`] and one
/// transform per page. Changes are tracked as a dirty page range and pushed
/// by [`VertexPagePool::flush`].
pub struct VertexPagePool {
    pages: Vec<VertexPage>,
    free_head: Option<u32>,
    free_count: u32,
    page_size: u32,
    vertex_stride: u32,
    draw_commands: Vec<DrawCommand>,
    transforms: Vec<[f32; 16]>,
    /// Half-open range of page indices touched since the last flush.
    dirty: Option<(u32, u32)>,
}

impl VertexPagePool {
    /// Create a pool with every page free, linked head-to-tail in index order.
    pub fn new(page_count: u32, page_size: u32, vertex_stride: u32) -> Self {
        assert!(page_size > 0, "vertex pages must hold at least one vertex");
        let pages = (0..page_count)
            .map(|index| VertexPage {
                index,
                vertex_count: 0,
                next: (index + 1 < page_count).then_some(index + 1),
                in_use: false,
            })
            .collect();
        let draw_commands = (0..page_count)
            .map(|index| DrawCommand {
                vertex_count: 0,
                instance_count: 0,
                first_vertex: index * page_size,
                first_instance: index,
            })
            .collect();

        log::info!(
            "VertexPagePool: {} pages x {} vertices ({} KB of vertex memory)",
            page_count,
            page_size,
            page_count as u64 * page_size as u64 * vertex_stride as u64 / 1024
        );

        Self {
            pages,
            free_head: (page_count > 0).then_some(0),
            free_count: page_count,
            page_size,
            vertex_stride,
            draw_commands,
            transforms: vec![Mat4::IDENTITY.to_cols_array(); page_count as usize],
            dirty: None,
        }
    }

    /// Pop the free-list head. None when every page is in use.
    pub fn acquire(&mut self) -> Option<u32> {
        let index = self.free_head?;
        let page = &mut self.pages[index as usize];
        self.free_head = page.next;
        page.next = None;
        page.vertex_count = 0;
        page.in_use = true;
        self.free_count -= 1;
        Some(index)
    }

    /// Append `next` after `prev` in a chunk's page chain.
    pub fn link(&mut self, prev: u32, next: u32) {
        debug_assert!(self.pages[prev as usize].in_use && self.pages[next as usize].in_use);
        self.pages[prev as usize].next = Some(next);
    }

    pub fn set_vertex_count(&mut self, page: u32, vertex_count: u32) {
        assert!(
            vertex_count <= self.page_size,
            "page {page}: {vertex_count} vertices exceed page size {}",
            self.page_size
        );
        let page = &mut self.pages[page as usize];
        assert!(page.in_use, "page {} is free", page.index);
        page.vertex_count = vertex_count;
    }

    /// Return every page of the chain starting at `head` to the free list,
    /// zeroing their draw commands. Returns the number of pages released.
    pub fn release(&mut self, head: u32) -> u32 {
        let mut released = 0;
        let mut current = Some(head);
        while let Some(index) = current {
            let page = &mut self.pages[index as usize];
            assert!(page.in_use, "page {index} released twice");
            current = page.next;

            page.vertex_count = 0;
            page.in_use = false;
            page.next = self.free_head;
            self.free_head = Some(index);
            self.free_count += 1;

            let command = &mut self.draw_commands[index as usize];
            command.vertex_count = 0;
            command.instance_count = 0;
            self.mark_dirty(index);
            released += 1;
        }
        released
    }

    /// Publish the chain's vertex counts and `transform` into the CPU mirrors.
    pub fn process_pages(&mut self, head: u32, transform: Mat4) {
        let columns = transform.to_cols_array();
        let mut current = Some(head);
        while let Some(index) = current {
            let page = &self.pages[index as usize];
            current = page.next;
            let command = &mut self.draw_commands[index as usize];
            command.vertex_count = page.vertex_count;
            command.instance_count = 1;
            self.transforms[index as usize] = columns;
            self.mark_dirty(index);
        }
    }

    /// Push every mirror entry touched since the last flush.
    pub fn flush<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        draw_commands: &HeapSlice,
        transforms: &HeapSlice,
    ) -> Result<(), DeviceError> {
        let Some((lo, hi)) = self.dirty else {
            return Ok(());
        };
        let (lo, hi) = (lo as usize, hi as usize);
        let command_bytes: &[u8] = bytemuck::cast_slice(&self.draw_commands[lo..hi]);
        MemoryHeap::write(
            device,
            draw_commands,
            (lo * std::mem::size_of::<DrawCommand>()) as u64,
            command_bytes,
        )?;
        let transform_bytes: &[u8] = bytemuck::cast_slice(&self.transforms[lo..hi]);
        MemoryHeap::write(
            device,
            transforms,
            (lo * std::mem::size_of::<[f32; 16]>()) as u64,
            transform_bytes,
        )?;
        log::trace!("VertexPagePool: flushed pages {}..{}", lo, hi);
        self.dirty = None;
        Ok(())
    }

    /// Page indices of the chain starting at `head`, in chain order.
    pub fn chain(&self, head: Option<u32>) -> PageChain<'_> {
        PageChain {
            pages: &self.pages,
            current: head,
        }
    }

    fn mark_dirty(&mut self, index: u32) {
        self.dirty = Some(match self.dirty {
            Some((lo, hi)) => (lo.min(index), hi.max(index + 1)),
            None => (index, index + 1),
        });
    }

    pub fn page(&self, index: u32) -> Option<&VertexPage> {
        self.pages.get(index as usize)
    }

    /// Byte offset of a page's slice inside the vertex buffer.
    pub fn page_byte_offset(&self, index: u32) -> u64 {
        self.page_capacity_bytes() * index as u64
    }

    pub fn page_capacity_bytes(&self) -> u64 {
        self.page_size as u64 * self.vertex_stride as u64
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn vertex_stride(&self) -> u32 {
        self.vertex_stride
    }

    pub fn free_count(&self) -> u32 {
        self.free_count
    }

    pub fn used_count(&self) -> u32 {
        self.page_count() - self.free_count
    }

    pub fn draw_commands(&self) -> &[DrawCommand] {
        &self.draw_commands
    }

    pub fn transforms(&self) -> &[[f32; 16]] {
        &self.transforms
    }

    pub fn has_pending_upload(&self) -> bool {
        self.dirty.is_some()
    }
}

/// Iterator over a linked page chain.
pub struct PageChain<'a> {
    pages: &'a [VertexPage],
    current: Option<u32>,
}

impl Iterator for PageChain<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let index = self.current?;
        self.current = self.pages[index as usize].next;
        Some(index)
    }
}
