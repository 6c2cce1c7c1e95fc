// splatscape - Data-Oriented Programming (DOP) Architecture
//
// Splatted height-field terrain and light-grouped static scene batching.
// - *_data.rs modules hold plain data, *_operations.rs modules hold pure functions
// - Graphics API access goes through renderer::RenderBackend
// - RecordingBackend renders headless; WgpuBackend (feature "gpu") drives wgpu

// Constants module
pub mod constants;

// Core modules
pub mod error;

// Essential systems
pub mod camera;
pub mod config;
pub mod physics;
pub mod renderer;
pub mod scene;
pub mod terrain;

// GPU systems
pub mod gpu;

pub use camera::{CameraData, CameraMode, Frustum};
pub use config::{load_definition, TerrainDefinition};
pub use error::{EngineError, EngineResult, ErrorContext, OptionExt};
pub use physics::AABB;
pub use renderer::{create_recording_backend, IndexedDraw, RecordingBackend, RenderBackend, StageSetup};
pub use scene::{build_scene, load_scene, render_scene, SceneData, SceneSettings};
pub use terrain::{
    create_terrain, load_terrain, release_terrain, render_terrain, set_layer_enabled, terrain_height,
    TerrainData, TerrainRenderStats,
};

// Re-export wgpu for applications that drive the GPU backend
#[cfg(feature = "gpu")]
pub use wgpu;
