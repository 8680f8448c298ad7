pub mod gpu;

pub use gpu::WgpuDevice;
