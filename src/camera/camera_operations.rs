//! Camera operations - Pure DOP functions
//!
//! All functions are pure: they take data, return new data, no side effects.
//! No methods, no self, just transformations.

use super::camera_data::{CameraData, CameraMode, Frustum};
use crate::physics::aabb::{aabb_positive_vertex, AABB};
use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3, Vector4};

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize camera with default settings
pub fn init_camera(position: Point3<f32>, yaw: f32, pitch: f32) -> CameraData {
    CameraData {
        position,
        yaw_radians: yaw,
        pitch_radians: pitch,
        ..Default::default()
    }
}

// ============================================================================
// VIEW/PROJECTION MATRICES
// ============================================================================

/// Build view matrix from camera data
pub fn build_view_matrix(camera: &CameraData) -> Matrix4<f32> {
    let up = Vector3::new(0.0, 1.0, 0.0);
    let target = match camera.mode {
        CameraMode::ThirdPerson { target } if target != camera.position => target,
        _ => camera.position + calculate_forward_vector(camera.yaw_radians, camera.pitch_radians),
    };

    Matrix4::look_at_rh(camera.position, target, up)
}

/// Build projection matrix from camera data
pub fn build_projection_matrix(camera: &CameraData) -> Matrix4<f32> {
    cgmath::perspective(
        Rad(camera.fov_radians),
        camera.aspect_ratio,
        camera.near_plane,
        camera.far_plane,
    )
}

pub fn build_view_projection_matrix(camera: &CameraData) -> Matrix4<f32> {
    build_projection_matrix(camera) * build_view_matrix(camera)
}

// ============================================================================
// UPDATES
// ============================================================================

/// Point a third-person camera at a new target; other modes are unchanged
pub fn set_look_at(camera: &CameraData, target: Point3<f32>) -> CameraData {
    let mut new_camera = *camera;
    if let CameraMode::ThirdPerson { .. } = camera.mode {
        new_camera.mode = CameraMode::ThirdPerson { target };
    }
    new_camera
}

/// Rotate camera by yaw/pitch deltas (radians)
pub fn rotate(camera: &CameraData, yaw_delta: f32, pitch_delta: f32) -> CameraData {
    let mut new_camera = *camera;
    new_camera.yaw_radians += yaw_delta;
    new_camera.pitch_radians += pitch_delta;

    // Spacecraft cameras may loop freely
    if camera.mode != CameraMode::SpaceCraft {
        const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
        new_camera.pitch_radians = new_camera.pitch_radians.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    new_camera
}

// ============================================================================
// UTILITIES
// ============================================================================

/// Calculate forward vector from yaw and pitch
pub fn calculate_forward_vector(yaw: f32, pitch: f32) -> Vector3<f32> {
    Vector3::new(
        yaw.cos() * pitch.cos(),
        pitch.sin(),
        yaw.sin() * pitch.cos(),
    )
    .normalize()
}

// ============================================================================
// FRUSTUM
// ============================================================================

/// Extract frustum planes from a view-projection matrix (Gribb-Hartmann)
pub fn extract_frustum(view_proj: &Matrix4<f32>) -> Frustum {
    let m = view_proj;

    let planes = [
        // Left plane
        Vector4::new(m.x.w + m.x.x, m.y.w + m.y.x, m.z.w + m.z.x, m.w.w + m.w.x),
        // Right plane
        Vector4::new(m.x.w - m.x.x, m.y.w - m.y.x, m.z.w - m.z.x, m.w.w - m.w.x),
        // Top plane
        Vector4::new(m.x.w - m.x.y, m.y.w - m.y.y, m.z.w - m.z.y, m.w.w - m.w.y),
        // Bottom plane
        Vector4::new(m.x.w + m.x.y, m.y.w + m.y.y, m.z.w + m.z.y, m.w.w + m.w.y),
        // Near plane
        Vector4::new(m.x.w + m.x.z, m.y.w + m.y.z, m.z.w + m.z.z, m.w.w + m.w.z),
        // Far plane
        Vector4::new(m.x.w - m.x.z, m.y.w - m.y.z, m.z.w - m.z.z, m.w.w - m.w.z),
    ];

    Frustum {
        planes: planes.map(normalize_plane),
    }
}

fn normalize_plane(plane: Vector4<f32>) -> Vector4<f32> {
    let length = (plane.x * plane.x + plane.y * plane.y + plane.z * plane.z).sqrt();
    if length > 0.0 {
        plane / length
    } else {
        plane
    }
}

/// Frustum of the camera's current view
pub fn camera_frustum(camera: &CameraData) -> Frustum {
    extract_frustum(&build_view_projection_matrix(camera))
}

/// Conservative box test: false only when the box lies entirely behind one plane
pub fn bounds_in_frustum(frustum: &Frustum, bounds: &AABB) -> bool {
    frustum.planes.iter().all(|plane| {
        let normal = plane.truncate();
        let corner = aabb_positive_vertex(bounds, normal);
        normal.dot(corner.to_vec()) + plane.w >= 0.0
    })
}

/// Log camera context for debugging
pub fn log_camera_context(camera: &CameraData) {
    log::debug!(
        "[Camera] Position: ({:.1}, {:.1}, {:.1}) | Mode: {:?}",
        camera.position.x,
        camera.position.y,
        camera.position.z,
        camera.mode
    );

    log::debug!(
        "[Camera] Yaw: {:.3}rad ({:.1}°) | Pitch: {:.3}rad ({:.1}°) | FOV: {:.3}rad ({:.1}°)",
        camera.yaw_radians,
        camera.yaw_radians.to_degrees(),
        camera.pitch_radians,
        camera.pitch_radians.to_degrees(),
        camera.fov_radians,
        camera.fov_radians.to_degrees()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::aabb::create_aabb;

    fn looking_down_x() -> CameraData {
        init_camera(Point3::new(0.0, 10.0, 0.0), 0.0, 0.0)
    }

    #[test]
    fn test_box_ahead_is_visible() {
        let frustum = camera_frustum(&looking_down_x());
        let ahead = create_aabb(Point3::new(40.0, 0.0, -5.0), Point3::new(60.0, 20.0, 5.0));
        assert!(bounds_in_frustum(&frustum, &ahead));
    }

    #[test]
    fn test_box_behind_is_culled() {
        let frustum = camera_frustum(&looking_down_x());
        let behind = create_aabb(Point3::new(-60.0, 0.0, -5.0), Point3::new(-40.0, 20.0, 5.0));
        assert!(!bounds_in_frustum(&frustum, &behind));
    }

    #[test]
    fn test_box_beyond_far_plane_is_culled() {
        let frustum = camera_frustum(&looking_down_x());
        let far = create_aabb(Point3::new(6000.0, 0.0, -5.0), Point3::new(6100.0, 20.0, 5.0));
        assert!(!bounds_in_frustum(&frustum, &far));
    }

    #[test]
    fn test_box_containing_camera_is_visible() {
        let frustum = camera_frustum(&looking_down_x());
        let around = create_aabb(Point3::new(-100.0, 0.0, -100.0), Point3::new(100.0, 20.0, 100.0));
        assert!(bounds_in_frustum(&frustum, &around));
    }

    #[test]
    fn test_set_look_at_only_affects_third_person() {
        let first = looking_down_x();
        let unchanged = set_look_at(&first, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(unchanged.mode, CameraMode::FirstPerson);

        let mut third = looking_down_x();
        third.mode = CameraMode::ThirdPerson {
            target: Point3::new(0.0, 0.0, 0.0),
        };
        let moved = set_look_at(&third, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(
            moved.mode,
            CameraMode::ThirdPerson {
                target: Point3::new(1.0, 2.0, 3.0)
            }
        );
    }

    #[test]
    fn test_spacecraft_pitch_unclamped() {
        let mut camera = looking_down_x();
        camera.mode = CameraMode::SpaceCraft;
        let rotated = rotate(&camera, 0.0, 2.0);
        assert!((rotated.pitch_radians - 2.0).abs() < 1e-6);

        let clamped = rotate(&looking_down_x(), 0.0, 2.0);
        assert!(clamped.pitch_radians < std::f32::consts::FRAC_PI_2);
    }
}
