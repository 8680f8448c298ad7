use std::collections::HashMap;

/// A registered block type. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Index of this block inside its mod's [`BlockHandler`].
    pub lookup_index: u16,
    pub name: String,
    pub display_name: String,
    pub texture_path: String,
    /// Index into the global texture array. None for untextured blocks (air).
    pub texture_index: Option<u32>,
}

/// Fixed-capacity, append-only block table of one mod.
///
/// Not `Clone`: a handler owns its block array and is moved, never duplicated.
#[derive(Debug)]
pub struct BlockHandler {
    blocks: Vec<Block>,
    capacity: usize,
    by_name: HashMap<String, u16>,
}

impl BlockHandler {
    /// Reserve room for exactly `capacity` blocks.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity <= u16::MAX as usize + 1,
            "block capacity {capacity} exceeds the 16-bit block id range"
        );
        Self {
            blocks: Vec::with_capacity(capacity),
            capacity,
            by_name: HashMap::with_capacity(capacity),
        }
    }

    /// Append a block and return its index. None when the handler is full or
    /// the name is already taken.
    pub fn add_block(&mut self, name: &str, display_name: &str, texture_path: &str) -> Option<u16> {
        if self.blocks.len() >= self.capacity {
            log::warn!(
                "BlockHandler: capacity {} reached, block '{}' rejected",
                self.capacity,
                name
            );
            return None;
        }
        if self.by_name.contains_key(name) {
            log::warn!("BlockHandler: duplicate block '{}' rejected", name);
            return None;
        }

        let lookup_index = self.blocks.len() as u16;
        self.blocks.push(Block {
            lookup_index,
            name: name.to_string(),
            display_name: display_name.to_string(),
            texture_path: texture_path.to_string(),
            texture_index: None,
        });
        self.by_name.insert(name.to_string(), lookup_index);
        Some(lookup_index)
    }

    /// Look up a block by index. None when out of range.
    pub fn get_block(&self, index: u16) -> Option<&Block> {
        self.blocks.get(index as usize)
    }

    /// Look up a block by name. None on miss.
    pub fn get_block_by_name(&self, name: &str) -> Option<&Block> {
        self.index_of(name).and_then(|i| self.get_block(i))
    }

    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn set_texture_index(&mut self, index: u16, texture_index: u32) {
        if let Some(block) = self.blocks.get_mut(index as usize) {
            block.texture_index = Some(texture_index);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.blocks.len() >= self.capacity
    }
}
