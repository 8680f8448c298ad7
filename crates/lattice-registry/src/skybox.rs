use lattice_core::mod_manifest::SkyboxFace;

/// Canonical order of the 6 skybox textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkyboxPosition {
    East = 0,
    West = 1,
    Top = 2,
    Bottom = 3,
    North = 4,
    South = 5,
}

impl SkyboxPosition {
    pub const ALL: [SkyboxPosition; 6] = [
        SkyboxPosition::East,
        SkyboxPosition::West,
        SkyboxPosition::Top,
        SkyboxPosition::Bottom,
        SkyboxPosition::North,
        SkyboxPosition::South,
    ];

    pub fn parse(tag: &str) -> Option<SkyboxPosition> {
        match tag {
            "east" => Some(SkyboxPosition::East),
            "west" => Some(SkyboxPosition::West),
            "top" => Some(SkyboxPosition::Top),
            "bottom" => Some(SkyboxPosition::Bottom),
            "north" => Some(SkyboxPosition::North),
            "south" => Some(SkyboxPosition::South),
            _ => None,
        }
    }
}

/// Six skybox textures in canonical order (east, west, top, bottom, north, south).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skybox {
    textures: [String; 6],
}

impl Skybox {
    /// Validate a descriptor's skybox section. The error string says why the
    /// section was rejected.
    pub fn from_faces(faces: &[SkyboxFace]) -> Result<Skybox, String> {
        if faces.len() != 6 {
            return Err(format!("expected 6 faces, found {}", faces.len()));
        }

        let mut textures: [Option<String>; 6] = Default::default();
        for (i, face) in faces.iter().enumerate() {
            let tag = face
                .position
                .as_deref()
                .ok_or_else(|| format!("face {i} has no position"))?;
            let position =
                SkyboxPosition::parse(tag).ok_or_else(|| format!("unknown position '{tag}'"))?;
            let texture = face
                .texture
                .as_ref()
                .ok_or_else(|| format!("face '{tag}' has no texture"))?;
            let slot = &mut textures[position as usize];
            if slot.is_some() {
                return Err(format!("position '{tag}' given twice"));
            }
            *slot = Some(texture.clone());
        }

        // Six faces with no duplicates fill every slot.
        let textures = textures.map(|t| t.unwrap_or_default());
        Ok(Skybox { textures })
    }

    pub fn texture(&self, position: SkyboxPosition) -> &str {
        &self.textures[position as usize]
    }

    pub fn textures(&self) -> &[String; 6] {
        &self.textures
    }
}
