//! Terrain data - pure data structures with NO methods
//!
//! An empty `TerrainData` (no height field) is the unloaded state; loading
//! fills every field at once and `release_terrain` returns to empty.

use super::block_data::TerrainBlock;
use super::heightfield_data::HeightFieldData;
use super::layer_data::TerrainLayer;
use crate::config::definition_data::TerrainDefinition;
use crate::renderer::backend::RenderBackend;
use cgmath::{Point3, Vector3};

pub struct TerrainData<B: RenderBackend> {
    pub definition: Option<TerrainDefinition>,
    pub heightfield: Option<HeightFieldData>,
    /// Opacity grids are released once the blocks exist; transforms stay
    pub layers: Vec<TerrainLayer>,
    /// Ground textures; `None` where loading failed
    pub textures: Vec<Option<B::Texture>>,
    /// Row-major, `blocks[bx + bz * blocks_wide]`
    pub blocks: Vec<TerrainBlock<B>>,
    pub blocks_wide: u32,
    pub blocks_high: u32,
    pub layer_enabled: Vec<bool>,
}

impl<B: RenderBackend> Default for TerrainData<B> {
    fn default() -> Self {
        Self {
            definition: None,
            heightfield: None,
            layers: Vec::new(),
            textures: Vec::new(),
            blocks: Vec::new(),
            blocks_wide: 0,
            blocks_high: 0,
            layer_enabled: Vec::new(),
        }
    }
}

/// Per-frame terrain statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerrainRenderStats {
    pub blocks_drawn: u32,
    pub blocks_culled: u32,
    pub draw_calls: u32,
    pub primitives: u32,
}

/// Result of resolving a body against the ground
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundClamp {
    pub position: Point3<f32>,
    pub velocity: Vector3<f32>,
    /// True when the body was below the surface and got lifted
    pub grounded: bool,
}
