//! Camera data structures - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in camera_operations.rs

use cgmath::{Point3, Vector4};

/// Behaviour of the camera. The set of modes is closed, so a tagged
/// variant replaces per-mode subclasses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraMode {
    /// Eye sits at the player position, rotation limited to yaw/pitch
    FirstPerson,
    /// Eye trails the player and always looks at `target`
    ThirdPerson { target: Point3<f32> },
    /// Free six-degree camera, never ground-clamped
    SpaceCraft,
}

/// Camera data structure - pure data, no methods
#[derive(Debug, Clone, Copy)]
pub struct CameraData {
    /// Camera position in world space
    pub position: Point3<f32>,

    /// Yaw rotation (radians, around Y axis)
    pub yaw_radians: f32,

    /// Pitch rotation (radians, around X axis)
    pub pitch_radians: f32,

    /// Field of view (vertical, radians)
    pub fov_radians: f32,

    /// Aspect ratio (width / height)
    pub aspect_ratio: f32,

    /// Near clipping plane distance
    pub near_plane: f32,

    /// Far clipping plane distance
    pub far_plane: f32,

    pub mode: CameraMode,

    /// Lowest point of the camera's collision volume, relative to `position`
    pub volume_min_y: f32,
}

/// Six clip planes (a, b, c, d) with normals pointing into the volume
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    /// left, right, top, bottom, near, far
    pub planes: [Vector4<f32>; 6],
}

impl Default for CameraData {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 0.0),
            yaw_radians: 0.0,
            pitch_radians: 0.0,
            fov_radians: 60.0_f32.to_radians(),
            aspect_ratio: 4.0 / 3.0,
            near_plane: 1.01,
            far_plane: 5000.0,
            mode: CameraMode::FirstPerson,
            volume_min_y: -3.0,
        }
    }
}
