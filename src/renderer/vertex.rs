//! Vertex layouts uploaded to GPU vertex buffers
use bytemuck::{Pod, Zeroable};

/// Pre-lit terrain vertex
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    /// Baked directional light, rgb = brightness, a = 1
    pub diffuse: [f32; 4],
    /// Ground texture coordinates in height-map units (tiled by the layer transform)
    pub tex_coords: [f32; 2],
    /// 0..1 across the owning block, samples the splat blend texture
    pub blend_coords: [f32; 2],
}

/// Static scene vertex, lit at render time by the light group's lights
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SceneVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}
