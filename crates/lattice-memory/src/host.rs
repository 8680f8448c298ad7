use lattice_core::device::{BufferId, BufferUsage, GraphicsDevice};
use lattice_core::error::DeviceError;

/// A [`GraphicsDevice`] backed by plain host memory.
///
/// Used for headless runs and tests: every heap is a zeroed byte vector and
/// transfers are bounds-checked copies.
#[derive(Debug, Default)]
pub struct HostDevice {
    buffers: Vec<Vec<u8>>,
    transfer_count: u64,
    bytes_transferred: u64,
}

impl HostDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents of a buffer.
    pub fn contents(&self, buffer: BufferId) -> Option<&[u8]> {
        self.buffers.get(buffer.0 as usize).map(Vec::as_slice)
    }

    /// Number of `transfer_instantly` calls served.
    pub fn transfer_count(&self) -> u64 {
        self.transfer_count
    }

    pub fn bytes_transferred(&self) -> u64 {
        self.bytes_transferred
    }
}

impl GraphicsDevice for HostDevice {
    fn allocate_heap_memory(
        &mut self,
        label: &str,
        size: u64,
        _usage: BufferUsage,
    ) -> Result<BufferId, DeviceError> {
        let len = usize::try_from(size)
            .map_err(|e| DeviceError::HeapAllocationFailed(size, e.to_string()))?;
        let id = BufferId(self.buffers.len() as u32);
        self.buffers.push(vec![0u8; len]);
        log::debug!("HostDevice: buffer {:?} '{}' ({} bytes)", id, label, size);
        Ok(id)
    }

    fn transfer_instantly(
        &mut self,
        buffer: BufferId,
        offset: u64,
        bytes: &[u8],
    ) -> Result<(), DeviceError> {
        let target = self
            .buffers
            .get_mut(buffer.0 as usize)
            .ok_or(DeviceError::UnknownBuffer(buffer))?;
        let size = bytes.len() as u64;
        let capacity = target.len() as u64;
        if offset + size > capacity {
            return Err(DeviceError::TransferOutOfBounds {
                offset,
                size,
                capacity,
            });
        }
        let start = offset as usize;
        target[start..start + bytes.len()].copy_from_slice(bytes);
        self.transfer_count += 1;
        self.bytes_transferred += size;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_roundtrip() {
        let mut device = HostDevice::new();
        let id = device
            .allocate_heap_memory("buf", 8, BufferUsage::default())
            .expect("alloc");
        device.transfer_instantly(id, 2, &[9, 9]).expect("transfer");
        assert_eq!(device.contents(id), Some(&[0, 0, 9, 9, 0, 0, 0, 0][..]));
        assert_eq!(device.transfer_count(), 1);
        assert_eq!(device.bytes_transferred(), 2);
    }

    #[test]
    fn test_unknown_buffer() {
        let mut device = HostDevice::new();
        let result = device.transfer_instantly(BufferId(3), 0, &[1]);
        assert!(matches!(result, Err(DeviceError::UnknownBuffer(BufferId(3)))));
    }

    #[test]
    fn test_out_of_bounds_transfer() {
        let mut device = HostDevice::new();
        let id = device
            .allocate_heap_memory("buf", 4, BufferUsage::default())
            .expect("alloc");
        assert!(device.transfer_instantly(id, 3, &[1, 2]).is_err());
        assert_eq!(device.transfer_count(), 0);
    }
}
