use lattice_core::device::{BufferId, BufferUsage, GraphicsDevice};
use lattice_core::error::DeviceError;

/// [`GraphicsDevice`] over a wgpu device and queue.
///
/// Every heap is one `wgpu::Buffer`; transfers go through
/// `Queue::write_buffer` and land before the next submission.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    buffers: Vec<wgpu::Buffer>,
}

impl WgpuDevice {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            buffers: Vec::new(),
        }
    }

    /// Request a headless adapter and device on the primary backends.
    pub async fn request_headless(label: &str) -> Result<Self, DeviceError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| DeviceError::Backend("no suitable GPU adapter found".into()))?;

        let info = adapter.get_info();
        log::info!("Adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some(label),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .map_err(|e| DeviceError::Backend(format!("{e}")))?;

        Ok(Self::new(device, queue))
    }

    /// The wgpu buffer behind a heap, for binding by the renderer.
    pub fn buffer(&self, id: BufferId) -> Option<&wgpu::Buffer> {
        self.buffers.get(id.0 as usize)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

/// wgpu usage flags for a heap. Every heap is a copy destination.
pub fn buffer_usages(usage: BufferUsage) -> wgpu::BufferUsages {
    let mut usages = wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC;
    if usage.vertex {
        usages |= wgpu::BufferUsages::VERTEX;
    }
    if usage.indirect {
        usages |= wgpu::BufferUsages::INDIRECT;
    }
    if usage.storage {
        usages |= wgpu::BufferUsages::STORAGE;
    }
    usages
}

/// Round a heap size up to the copy alignment wgpu requires.
fn padded_size(size: u64) -> u64 {
    let align = wgpu::COPY_BUFFER_ALIGNMENT;
    size.div_ceil(align) * align
}

impl GraphicsDevice for WgpuDevice {
    fn allocate_heap_memory(
        &mut self,
        label: &str,
        size: u64,
        usage: BufferUsage,
    ) -> Result<BufferId, DeviceError> {
        let size = padded_size(size);
        let max = self.device.limits().max_buffer_size;
        if size > max {
            return Err(DeviceError::HeapAllocationFailed(
                size,
                format!("exceeds max_buffer_size {max}"),
            ));
        }
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: buffer_usages(usage),
            mapped_at_creation: false,
        });
        log::info!("WgpuDevice: heap '{}' ({} KB)", label, size / 1024);
        self.buffers.push(buffer);
        Ok(BufferId(self.buffers.len() as u32 - 1))
    }

    fn transfer_instantly(
        &mut self,
        buffer: BufferId,
        offset: u64,
        bytes: &[u8],
    ) -> Result<(), DeviceError> {
        let target = self
            .buffers
            .get(buffer.0 as usize)
            .ok_or(DeviceError::UnknownBuffer(buffer))?;
        let size = bytes.len() as u64;
        if offset + size > target.size() {
            return Err(DeviceError::TransferOutOfBounds {
                offset,
                size,
                capacity: target.size(),
            });
        }
        let align = wgpu::COPY_BUFFER_ALIGNMENT;
        if offset % align != 0 || size % align != 0 {
            return Err(DeviceError::Backend(format!(
                "transfer of {size} bytes at {offset} is not {align}-byte aligned"
            )));
        }
        self.queue.write_buffer(target, offset, bytes);
        Ok(())
    }
}
