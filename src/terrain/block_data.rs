//! Terrain block data - pure data structures with NO methods
//!
//! A block exists only once it has been generated; dropping it releases its
//! vertex buffer and every splat level's resources.

use crate::physics::aabb::AABB;
use crate::renderer::backend::RenderBackend;

/// Per-layer draw data of one block
pub struct SplatLevel<B: RenderBackend> {
    pub layer: usize,
    /// Quads where the layer is visible, as a triangle list over the block's vertex grid
    pub index_buffer: B::IndexBuffer,
    pub index_count: u32,
    pub primitive_count: u32,
    /// 4-bit alpha blend texture; the base layer has none
    pub blend_texture: Option<B::Texture>,
}

/// Position of a block inside the terrain grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    /// First height-map sample covered by the block
    pub start_x: u32,
    pub start_z: u32,
    pub quads_wide: u32,
    pub quads_high: u32,
}

/// Fixed-size terrain tile
pub struct TerrainBlock<B: RenderBackend> {
    pub layout: BlockLayout,
    /// Vertices per row / column (`quads + 1`)
    pub block_width: u32,
    pub block_height: u32,
    /// `neighbours[dz + 1][dx + 1]` is the block index at offset (dx, dz), `[1][1]` is this block
    pub neighbours: [[Option<usize>; 3]; 3],
    pub vertex_buffer: B::VertexBuffer,
    pub vertex_count: u32,
    pub bounds: AABB,
    /// Non-zero opacity texels per layer inside the block's footprint
    pub layer_usage: Vec<u32>,
    /// One entry per layer, `None` when the layer is absent from the block
    pub splats: Vec<Option<SplatLevel<B>>>,
}
