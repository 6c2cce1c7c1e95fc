/// Terrain definition data - pure data structures with NO methods
///
/// Mirrors the sections of a terrain definition file. Paths are stored as
/// written until `load_definition` resolves them against the file's directory.
use crate::constants::terrain::{DEFAULT_BLEND_TEX_RATIO, DEFAULT_BLOCK_SIZE, DEFAULT_TERRAIN_SIZE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSection {
    /// Raw 8-bit height map
    pub heightmap: PathBuf,
    /// World units per height-map sample (x, y, z)
    pub scale: [f32; 3],
    /// Height-map samples (width, height)
    pub terrain_size: [u32; 2],
    /// Samples per block (width, height); neighbouring blocks share an edge
    pub block_size: [u32; 2],
    /// Blend texels per quad along each axis
    pub blend_tex_ratio: u32,
}

impl Default for GeneralSection {
    fn default() -> Self {
        Self {
            heightmap: PathBuf::new(),
            scale: [1.0, 1.0, 1.0],
            terrain_size: DEFAULT_TERRAIN_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            blend_tex_ratio: DEFAULT_BLEND_TEX_RATIO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerDefinition {
    pub texture_index: usize,
    pub translation: [f32; 2],
    /// Degrees
    pub rotation: f32,
    pub scale: [f32; 2],
    /// Opacity image; unused for the base layer
    pub layer_map: Option<PathBuf>,
}

impl Default for LayerDefinition {
    fn default() -> Self {
        Self {
            texture_index: 0,
            translation: [0.0, 0.0],
            rotation: 0.0,
            scale: [1.0, 1.0],
            layer_map: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainDefinition {
    /// Ground textures, indexed by `LayerDefinition::texture_index`
    pub textures: Vec<PathBuf>,
    pub general: GeneralSection,
    /// Layer 0 is the base layer
    pub layers: Vec<LayerDefinition>,
}

impl Default for TerrainDefinition {
    fn default() -> Self {
        Self {
            textures: Vec::new(),
            general: GeneralSection::default(),
            layers: vec![LayerDefinition::default()],
        }
    }
}
