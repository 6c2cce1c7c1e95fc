/// Terrain layer data - pure data structures with NO methods
use cgmath::Matrix3;

/// One ground-cover layer
///
/// The opacity grid covers the whole terrain at `blend_tex_ratio` texels per
/// quad and only lives until the blocks have been generated.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainLayer {
    /// Index into the terrain's ground texture list
    pub texture_index: usize,
    pub width: u32,
    pub height: u32,
    /// `opacity[x + z * width]`, 0 = transparent, 255 = opaque
    pub opacity: Option<Vec<u8>>,
    /// Texture coordinate transform (rotation, scale, translation)
    pub transform: Matrix3<f32>,
}
