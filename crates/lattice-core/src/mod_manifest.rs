use serde::{Deserialize, Serialize};

/// A mod descriptor as parsed from `mod.ron`.
///
/// Every field is optional at parse time so that one malformed entry only
/// skips that entry instead of rejecting the whole file. The registry decides
/// what is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModDescriptor {
    /// Mod name, used as the prefix of dotted block names.
    #[serde(default)]
    pub name: Option<String>,
    /// Blocks in registration order.
    #[serde(default)]
    pub blocks: Vec<BlockDescriptor>,
    /// Optional skybox texture set.
    #[serde(default)]
    pub skybox: Option<Vec<SkyboxFace>>,
}

/// One block entry of a mod descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub texture: Option<String>,
}

/// One positional skybox texture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkyboxFace {
    /// One of east, west, top, bottom, north, south.
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub texture: Option<String>,
}

impl BlockDescriptor {
    pub fn new(name: &str, display_name: &str, texture: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            display_name: Some(display_name.to_string()),
            texture: Some(texture.to_string()),
        }
    }
}
