/// Height field data - pure data structures with NO methods
use cgmath::Vector3;

/// Grid of elevations, `samples[x + z * width]`, in raw height-map units
///
/// Smoothed once at load time and immutable afterwards. `scale` maps grid
/// coordinates (and raw elevations, via `scale.y`) to world units.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightFieldData {
    pub width: u32,
    pub height: u32,
    pub scale: Vector3<f32>,
    pub samples: Vec<f32>,
}
