//! Rendering seam: vertex layouts, the backend trait and its implementations

pub mod backend;
pub mod recording;
pub mod vertex;
#[cfg(feature = "gpu")]
pub mod wgpu_backend;

pub use backend::{IndexedDraw, RenderBackend, StageSetup};
pub use recording::{create_recording_backend, BackendCommand, RecordingBackend, ResourceId};
pub use vertex::{SceneVertex, TerrainVertex};
#[cfg(feature = "gpu")]
pub use wgpu_backend::{create_wgpu_backend, GpuTexture, RecordedDraw, WgpuBackend};
