//! Scene batch data - pure data structures with NO methods
//!
//! A scene is a list of light groups. Each light group owns one vertex buffer
//! and a tree of property groups: texture groups whose children are material
//! groups, each covering a contiguous vertex range with its own index buffer.

use crate::renderer::backend::RenderBackend;
use crate::renderer::vertex::SceneVertex;
use cgmath::{Matrix3, Point3, SquareMatrix, Vector3};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Point,
    Spot,
    Directional,
}

/// Light as programmed into a fixed-function light slot
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLight {
    pub kind: LightKind,
    pub diffuse: [f32; 4],
    pub ambient: [f32; 4],
    pub specular: [f32; 4],
    pub position: Point3<f32>,
    pub direction: Vector3<f32>,
    pub range: f32,
    /// Constant, linear, quadratic
    pub attenuation: [f32; 3],
    pub falloff: f32,
    pub theta: f32,
    pub phi: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub diffuse: [f32; 4],
    pub ambient: [f32; 4],
    pub emissive: [f32; 4],
    pub specular: [f32; 4],
    pub power: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: [1.0; 4],
            ambient: [1.0; 4],
            emissive: [0.0; 4],
            specular: [0.0; 4],
            power: 0.0,
        }
    }
}

/// Batching settings supplied by the application
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Hardware light slots; 0 = scene light count + reserved
    pub light_limit: u32,
    /// Slots `0..reserved_lights` are left to the application (dynamic lights)
    pub reserved_lights: u32,
    /// Name of a texture whose coordinates scroll over time (water)
    pub scrolling_texture: Option<String>,
    /// Scroll speed in texture units per second
    pub scroll_speed: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            light_limit: 0,
            reserved_lights: 0,
            scrolling_texture: None,
            scroll_speed: 0.5,
        }
    }
}

/// Material child of a texture group
pub struct MaterialGroup<B: RenderBackend> {
    pub material: Option<usize>,
    /// First vertex of this group inside the light group's vertex buffer
    pub vertex_start: u32,
    pub vertex_count: u32,
    /// Staging indices, relative to `vertex_start`; released after upload
    pub indices: Vec<u16>,
    pub index_count: u32,
    pub index_buffer: Option<B::IndexBuffer>,
}

/// Texture property group
pub struct PropertyGroup<B: RenderBackend> {
    pub texture: Option<usize>,
    pub materials: Vec<MaterialGroup<B>>,
}

pub struct LightGroup<B: RenderBackend> {
    /// Selected scene light indices (order irrelevant for matching)
    pub lights: Vec<usize>,
    /// Staging vertices; released after upload
    pub vertices: Vec<SceneVertex>,
    pub vertex_count: u32,
    pub groups: Vec<PropertyGroup<B>>,
    pub vertex_buffer: Option<B::VertexBuffer>,
}

pub struct SceneData<B: RenderBackend> {
    pub settings: SceneSettings,
    /// Effective light limit after resolving `light_limit == 0`
    pub light_limit: u32,
    pub lights: Vec<SceneLight>,
    pub materials: Vec<Material>,
    pub textures: Vec<Option<B::Texture>>,
    pub light_groups: Vec<LightGroup<B>>,
    pub scrolling_texture: Option<usize>,
    pub texture_transform: Matrix3<f32>,
}

impl<B: RenderBackend> Default for SceneData<B> {
    fn default() -> Self {
        Self {
            settings: SceneSettings::default(),
            light_limit: 0,
            lights: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            light_groups: Vec::new(),
            scrolling_texture: None,
            texture_transform: Matrix3::identity(),
        }
    }
}

/// Per-frame scene statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneRenderStats {
    pub light_groups: u32,
    pub draw_calls: u32,
    pub primitives: u32,
}
