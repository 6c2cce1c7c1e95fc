//! Render backend seam
//!
//! Terrain and scene code never talk to a graphics API directly. They create
//! resources and issue state changes / draws through `RenderBackend`, which
//! owns the API-specific handle types. Handles are exclusively owned by the
//! block, splat or group that created them and are released when dropped.

use crate::error::EngineResult;
use crate::scene::light_group_data::{Material, SceneLight};
use bytemuck::Pod;
use cgmath::Matrix3;
use std::path::Path;

/// Fixed-function style texture stage configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageSetup {
    /// Stage 0 colour = texture * vertex diffuse, stage 1 alpha = blend texture alpha,
    /// alpha blending src-alpha / inv-src-alpha, stage 0 coordinates transformed
    TerrainSplat,
    /// Stage 0 colour = texture * lit diffuse, no blending
    SceneLit,
}

/// Parameters of one indexed triangle-list draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedDraw {
    /// Added to every index before fetching a vertex
    pub base_vertex: u32,
    /// Number of vertices the indices may reference, starting at `base_vertex`
    pub vertex_count: u32,
    pub index_count: u32,
    pub primitive_count: u32,
}

pub trait RenderBackend {
    type VertexBuffer;
    type IndexBuffer;
    type Texture;

    fn create_vertex_buffer<V: Pod>(
        &mut self,
        label: &str,
        vertices: &[V],
    ) -> EngineResult<Self::VertexBuffer>;

    fn create_index_buffer(&mut self, label: &str, indices: &[u16]) -> EngineResult<Self::IndexBuffer>;

    /// Create a blend texture from packed A4R4G4B4 texels (only the alpha nibble is meaningful)
    fn create_blend_texture(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        texels: &[u16],
    ) -> EngineResult<Self::Texture>;

    /// Load a colour texture from an image file
    fn load_texture(&mut self, path: &Path) -> EngineResult<Self::Texture>;

    fn set_stage_setup(&mut self, setup: StageSetup);

    fn set_vertex_buffer(&mut self, buffer: &Self::VertexBuffer);

    fn set_texture(&mut self, stage: u32, texture: Option<&Self::Texture>);

    /// `None` disables coordinate transformation on the stage
    fn set_texture_transform(&mut self, stage: u32, transform: Option<&Matrix3<f32>>);

    /// `None` disables the light slot
    fn set_light(&mut self, slot: u32, light: Option<&SceneLight>);

    fn set_material(&mut self, material: &Material);

    fn draw_indexed(&mut self, indices: &Self::IndexBuffer, draw: IndexedDraw);
}
