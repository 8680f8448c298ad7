use std::collections::HashMap;
use std::path::Path;

use lattice_core::constants::{CORE_MOD_INDEX, CORE_MOD_NAME};
use lattice_core::mod_manifest::ModDescriptor;
use lattice_core::types::ChunkBlock;

use crate::block::{Block, BlockHandler};
use crate::loader::{parse_mod_descriptor, read_mod_descriptor};
use crate::skybox::Skybox;
use crate::{LoadError, LoadWarning};

/// A registered mod and the blocks it contributes.
#[derive(Debug)]
pub struct Mod {
    pub lookup_index: u16,
    pub name: String,
    pub blocks: BlockHandler,
}

/// Outcome of registering one mod descriptor.
#[derive(Debug, Default)]
pub struct ModLoadReport {
    /// Index of the registered mod, None if the whole mod was skipped.
    pub mod_index: Option<u16>,
    /// Blocks actually registered.
    pub blocks_registered: usize,
    pub warnings: Vec<LoadWarning>,
}

impl ModLoadReport {
    fn warn(&mut self, warning: LoadWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// Fixed-capacity, append-only table of mods. Mod 0 is the built-in core
/// mod holding air (block 0) and unknown (block 1).
#[derive(Debug)]
pub struct ModHandler {
    mods: Vec<Mod>,
    capacity: usize,
    by_name: HashMap<String, u16>,
    skybox: Option<Skybox>,
    /// Distinct texture paths in texture-index order.
    texture_paths: Vec<String>,
}

impl ModHandler {
    /// Room for `mod_count` mods plus the core mod.
    pub fn new(mod_count: usize) -> Self {
        let capacity = mod_count + 1;
        assert!(
            capacity <= u16::MAX as usize + 1,
            "mod capacity {capacity} exceeds the 16-bit mod id range"
        );

        let mut core_blocks = BlockHandler::with_capacity(2);
        core_blocks.add_block("air", "Air", "");
        core_blocks.add_block("unknown", "Unknown", "unknown.png");

        let mut handler = Self {
            mods: Vec::with_capacity(capacity),
            capacity,
            by_name: HashMap::with_capacity(capacity),
            skybox: None,
            texture_paths: Vec::new(),
        };
        handler.push_mod(CORE_MOD_NAME.to_string(), core_blocks);
        handler
    }

    /// The air sentinel. Constant, never looked up.
    pub const fn air_block() -> ChunkBlock {
        ChunkBlock::AIR
    }

    pub const fn unknown_block() -> ChunkBlock {
        ChunkBlock::UNKNOWN
    }

    /// Register a parsed mod descriptor. Malformed entries are skipped and
    /// reported; everything else is registered.
    pub fn add_mod(&mut self, descriptor: &ModDescriptor) -> ModLoadReport {
        let mut report = ModLoadReport::default();

        let name = match descriptor.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                report.warn(LoadWarning::MissingModName);
                return report;
            }
        };
        if self.mods.len() >= self.capacity {
            report.warn(LoadWarning::ModCapacityExhausted(name));
            return report;
        }
        if self.by_name.contains_key(&name) {
            report.warn(LoadWarning::DuplicateMod(name));
            return report;
        }

        let mut blocks = BlockHandler::with_capacity(descriptor.blocks.len());
        for (entry, block) in descriptor.blocks.iter().enumerate() {
            let missing = |attribute: &'static str| LoadWarning::MissingBlockAttribute {
                mod_name: name.clone(),
                entry,
                attribute,
            };
            let Some(block_name) = block.name.as_deref().filter(|n| !n.is_empty()) else {
                report.warn(missing("name"));
                continue;
            };
            let Some(display_name) = block.display_name.as_deref() else {
                report.warn(missing("display_name"));
                continue;
            };
            let Some(texture) = block.texture.as_deref() else {
                report.warn(missing("texture"));
                continue;
            };
            if block_name.contains('.') {
                report.warn(LoadWarning::InvalidBlockName {
                    mod_name: name.clone(),
                    name: block_name.to_string(),
                });
                continue;
            }
            if blocks.index_of(block_name).is_some() {
                report.warn(LoadWarning::DuplicateBlock {
                    mod_name: name.clone(),
                    name: block_name.to_string(),
                });
                continue;
            }
            if blocks.add_block(block_name, display_name, texture).is_none() {
                report.warn(LoadWarning::BlockCapacityExhausted {
                    mod_name: name.clone(),
                    name: block_name.to_string(),
                });
            }
        }

        if let Some(faces) = &descriptor.skybox {
            match Skybox::from_faces(faces) {
                Ok(skybox) => {
                    if self.skybox.is_some() {
                        log::info!("ModHandler: skybox replaced by mod '{}'", name);
                    }
                    self.skybox = Some(skybox);
                }
                Err(reason) => report.warn(LoadWarning::InvalidSkybox {
                    mod_name: name.clone(),
                    reason,
                }),
            }
        }

        report.blocks_registered = blocks.len();
        let index = self.push_mod(name, blocks);
        report.mod_index = Some(index);
        log::info!(
            "ModHandler: registered mod '{}' (index {}, {} blocks, {} warnings)",
            self.mods[index as usize].name,
            index,
            report.blocks_registered,
            report.warnings.len()
        );
        report
    }

    /// Parse a RON descriptor and register it.
    pub fn add_mod_from_str(&mut self, ron_str: &str) -> Result<ModLoadReport, LoadError> {
        let descriptor = parse_mod_descriptor(ron_str)?;
        Ok(self.add_mod(&descriptor))
    }

    /// Read a RON descriptor file and register it.
    pub fn add_mod_from_path(&mut self, path: &Path) -> Result<ModLoadReport, LoadError> {
        let descriptor = read_mod_descriptor(path)?;
        Ok(self.add_mod(&descriptor))
    }

    fn push_mod(&mut self, name: String, mut blocks: BlockHandler) -> u16 {
        let lookup_index = self.mods.len() as u16;
        let textured: Vec<(u16, String)> = blocks
            .iter()
            .filter(|b| !b.texture_path.is_empty())
            .map(|b| (b.lookup_index, b.texture_path.clone()))
            .collect();
        for (block_index, path) in textured {
            let texture_index = self.texture_index_for(path);
            blocks.set_texture_index(block_index, texture_index);
        }
        self.by_name.insert(name.clone(), lookup_index);
        self.mods.push(Mod {
            lookup_index,
            name,
            blocks,
        });
        lookup_index
    }

    /// Texture index for a path, sharing indices between identical paths.
    fn texture_index_for(&mut self, path: String) -> u32 {
        if let Some(existing) = self.texture_paths.iter().position(|p| *p == path) {
            return existing as u32;
        }
        self.texture_paths.push(path);
        (self.texture_paths.len() - 1) as u32
    }

    /// Resolve a packed block id. None if either the mod or the block is unknown.
    pub fn get_block(&self, block: ChunkBlock) -> Option<&Block> {
        self.get_mod(block.mod_id())?.blocks.get_block(block.block_id())
    }

    /// Resolve a dotted `"mod.block"` name, split on the first '.'.
    pub fn get_block_by_name(&self, dotted: &str) -> Option<&Block> {
        let (mod_name, block_name) = dotted.split_once('.')?;
        self.get_mod_by_name(mod_name)?
            .blocks
            .get_block_by_name(block_name)
    }

    /// Packed id for a dotted name, with zero metadata.
    pub fn block_id(&self, dotted: &str) -> Option<ChunkBlock> {
        let (mod_name, block_name) = dotted.split_once('.')?;
        let registered = self.get_mod_by_name(mod_name)?;
        let block_index = registered.blocks.index_of(block_name)?;
        Some(ChunkBlock::new(registered.lookup_index, block_index, 0))
    }

    pub fn get_mod(&self, index: u16) -> Option<&Mod> {
        self.mods.get(index as usize)
    }

    pub fn get_mod_by_name(&self, name: &str) -> Option<&Mod> {
        self.by_name.get(name).and_then(|&i| self.get_mod(i))
    }

    pub fn core_mod(&self) -> &Mod {
        &self.mods[CORE_MOD_INDEX as usize]
    }

    pub fn skybox(&self) -> Option<&Skybox> {
        self.skybox.as_ref()
    }

    pub fn texture_paths(&self) -> &[String] {
        &self.texture_paths
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mod> {
        self.mods.iter()
    }

    /// Registered mods, core included.
    pub fn mod_count(&self) -> usize {
        self.mods.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
