pub mod block;
pub mod loader;
pub mod mods;
pub mod skybox;

pub use block::{Block, BlockHandler};
pub use loader::{load_mods, parse_mod_descriptor, read_mod_descriptor, ModSetReport};
pub use mods::{Mod, ModHandler, ModLoadReport};
pub use skybox::{Skybox, SkyboxPosition};

use std::path::PathBuf;
use thiserror::Error;

/// Failure to read or parse a whole mod descriptor file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read mod descriptor {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse mod descriptor RON: {0}")]
    ParseError(String),
}

/// A recoverable problem with one entry of a mod descriptor. The entry is
/// skipped and loading continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadWarning {
    #[error("Mod registry is full, mod '{0}' skipped")]
    ModCapacityExhausted(String),
    #[error("Mod descriptor has no name attribute, mod skipped")]
    MissingModName,
    #[error("Mod '{0}' is already registered, duplicate skipped")]
    DuplicateMod(String),
    #[error("Mod '{mod_name}': block entry {entry} is missing '{attribute}', entry skipped")]
    MissingBlockAttribute {
        mod_name: String,
        entry: usize,
        attribute: &'static str,
    },
    #[error("Mod '{mod_name}': block name '{name}' may not contain '.', entry skipped")]
    InvalidBlockName { mod_name: String, name: String },
    #[error("Mod '{mod_name}': block '{name}' is already registered, duplicate skipped")]
    DuplicateBlock { mod_name: String, name: String },
    #[error("Mod '{mod_name}': block registry is full, block '{name}' skipped")]
    BlockCapacityExhausted { mod_name: String, name: String },
    #[error("Mod '{mod_name}': skybox ignored: {reason}")]
    InvalidSkybox { mod_name: String, reason: String },
}
