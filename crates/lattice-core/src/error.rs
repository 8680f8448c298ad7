use thiserror::Error;

use crate::device::BufferId;

/// Failures reported by the graphics-device collaborator.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("unknown device buffer {0:?}")]
    UnknownBuffer(BufferId),

    #[error("transfer of {size} bytes at offset {offset} overruns buffer of {capacity} bytes")]
    TransferOutOfBounds { offset: u64, size: u64, capacity: u64 },

    #[error("heap allocation of {0} bytes failed: {1}")]
    HeapAllocationFailed(u64, String),

    #[error("device backend error: {0}")]
    Backend(String),
}
