/// Camera Module - Data-Oriented Programming (DOP) style
///
/// This module follows pure DOP principles:
/// - camera_data.rs: Pure data structures with NO methods
/// - camera_operations.rs: Pure functions that operate on data

pub mod camera_data;
pub mod camera_operations;

// Re-export data structures
pub use camera_data::{CameraData, CameraMode, Frustum};

// Re-export all operations
pub use camera_operations::{
    // Initialization
    init_camera,

    // View/projection
    build_view_matrix,
    build_projection_matrix,
    build_view_projection_matrix,

    // Updates
    set_look_at,
    rotate,

    // Utilities
    calculate_forward_vector,

    // Culling
    extract_frustum,
    camera_frustum,
    bounds_in_frustum,

    // Diagnostics
    log_camera_context,
};
