//! Scene input model
//!
//! In-memory object model of an externally parsed scene: entities, materials,
//! texture references and meshes made of surfaces. This is what the batcher
//! consumes; `scene_io` can read it from JSON.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    #[serde(default)]
    pub entities: Vec<EntityDesc>,
    #[serde(default)]
    pub materials: Vec<MaterialDesc>,
    #[serde(default)]
    pub textures: Vec<TextureRef>,
    #[serde(default)]
    pub meshes: Vec<MeshDesc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityDesc {
    Light(LightEntity),
    /// Any entity the batcher has no use for
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightEntityKind {
    Ambient,
    Point,
    Spot,
    Directional,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightEntity {
    pub kind: LightEntityKind,
    #[serde(default = "white")]
    pub diffuse: [f32; 4],
    #[serde(default)]
    pub ambient: [f32; 4],
    #[serde(default)]
    pub specular: [f32; 4],
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default = "down")]
    pub direction: [f32; 3],
    #[serde(default)]
    pub range: f32,
    /// Constant, linear, quadratic
    #[serde(default = "constant_attenuation")]
    pub attenuation: [f32; 3],
    #[serde(default = "one")]
    pub falloff: f32,
    /// Inner cone angle, radians
    #[serde(default)]
    pub theta: f32,
    /// Outer cone angle, radians
    #[serde(default)]
    pub phi: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDesc {
    #[serde(default = "white")]
    pub diffuse: [f32; 4],
    #[serde(default = "white")]
    pub ambient: [f32; 4],
    #[serde(default)]
    pub emissive: [f32; 4],
    #[serde(default)]
    pub specular: [f32; 4],
    #[serde(default)]
    pub power: f32,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            diffuse: white(),
            ambient: white(),
            emissive: [0.0; 4],
            specular: [0.0; 4],
            power: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureSource {
    /// Image file next to the scene file
    #[default]
    External,
    /// Embedded in the scene container; not loaded
    Internal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureRef {
    pub name: String,
    #[serde(default)]
    pub source: TextureSource,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshDesc {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surfaces: Vec<SurfaceDesc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveLayout {
    #[default]
    List,
    Strip,
    Fan,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceDesc {
    pub vertices: Vec<SurfaceVertex>,
    /// Empty means the vertices are consumed in order
    #[serde(default)]
    pub indices: Vec<u32>,
    #[serde(default)]
    pub layout: PrimitiveLayout,
    #[serde(default)]
    pub material: Option<usize>,
    #[serde(default)]
    pub texture: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceVertex {
    pub position: [f32; 3],
    #[serde(default)]
    pub normal: [f32; 3],
    #[serde(default)]
    pub tex_coords: Option<[f32; 2]>,
}

fn white() -> [f32; 4] {
    [1.0; 4]
}

fn down() -> [f32; 3] {
    [0.0, -1.0, 0.0]
}

fn constant_attenuation() -> [f32; 3] {
    [1.0, 0.0, 0.0]
}

fn one() -> f32 {
    1.0
}
