pub mod constants;
pub mod device;
pub mod direction;
pub mod error;
pub mod math;
pub mod mod_manifest;
pub mod types;
