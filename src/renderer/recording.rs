//! Headless backend that records every resource and command
//!
//! Used for tests and for offline inspection of generated terrain/scene
//! batches (see `demos/terrain_report.rs`).

use super::backend::{IndexedDraw, RenderBackend, StageSetup};
use crate::error::{EngineError, EngineResult};
use crate::scene::light_group_data::{Material, SceneLight};
use bytemuck::Pod;
use cgmath::Matrix3;
use std::path::{Path, PathBuf};

/// Opaque handle to a recorded resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(pub u32);

#[derive(Debug, Clone)]
pub struct RecordedVertexBuffer {
    pub id: ResourceId,
    pub label: String,
    pub vertex_count: usize,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RecordedIndexBuffer {
    pub id: ResourceId,
    pub label: String,
    pub indices: Vec<u16>,
}

#[derive(Debug, Clone)]
pub struct RecordedTexture {
    pub id: ResourceId,
    pub label: String,
    pub width: u32,
    pub height: u32,
    /// Packed texels for generated textures, empty for loaded files
    pub texels: Vec<u16>,
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    StageSetup(StageSetup),
    SetVertexBuffer(ResourceId),
    SetTexture {
        stage: u32,
        texture: Option<ResourceId>,
    },
    SetTextureTransform {
        stage: u32,
        transform: Option<Matrix3<f32>>,
    },
    SetLight {
        slot: u32,
        light: Option<SceneLight>,
    },
    SetMaterial(Material),
    DrawIndexed {
        indices: ResourceId,
        draw: IndexedDraw,
    },
}

/// Recording backend data - resources are kept so callers can inspect them
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_id: u32,
    pub vertex_buffers: Vec<RecordedVertexBuffer>,
    pub index_buffers: Vec<RecordedIndexBuffer>,
    pub textures: Vec<RecordedTexture>,
    pub commands: Vec<BackendCommand>,
    /// When set, every buffer creation fails (exercises load-failure paths)
    pub fail_buffer_creation: bool,
}

pub fn create_recording_backend() -> RecordingBackend {
    RecordingBackend::default()
}

fn allocate_id(backend: &mut RecordingBackend) -> ResourceId {
    let id = ResourceId(backend.next_id);
    backend.next_id += 1;
    id
}

fn check_buffer_creation(backend: &RecordingBackend, label: &str, size: usize) -> EngineResult<()> {
    if backend.fail_buffer_creation {
        return Err(EngineError::BufferCreationFailed {
            label: label.to_string(),
            size,
            error: "buffer creation disabled on recording backend".to_string(),
        });
    }
    Ok(())
}

impl RenderBackend for RecordingBackend {
    type VertexBuffer = ResourceId;
    type IndexBuffer = ResourceId;
    type Texture = ResourceId;

    fn create_vertex_buffer<V: Pod>(&mut self, label: &str, vertices: &[V]) -> EngineResult<ResourceId> {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        check_buffer_creation(self, label, bytes.len())?;
        let id = allocate_id(self);
        self.vertex_buffers.push(RecordedVertexBuffer {
            id,
            label: label.to_string(),
            vertex_count: vertices.len(),
            bytes: bytes.to_vec(),
        });
        Ok(id)
    }

    fn create_index_buffer(&mut self, label: &str, indices: &[u16]) -> EngineResult<ResourceId> {
        check_buffer_creation(self, label, indices.len() * std::mem::size_of::<u16>())?;
        let id = allocate_id(self);
        self.index_buffers.push(RecordedIndexBuffer {
            id,
            label: label.to_string(),
            indices: indices.to_vec(),
        });
        Ok(id)
    }

    fn create_blend_texture(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        texels: &[u16],
    ) -> EngineResult<ResourceId> {
        if texels.len() != (width * height) as usize {
            return Err(EngineError::TextureCreationFailed {
                label: label.to_string(),
                width,
                height,
                error: format!("expected {} texels, got {}", width * height, texels.len()),
            });
        }
        let id = allocate_id(self);
        self.textures.push(RecordedTexture {
            id,
            label: label.to_string(),
            width,
            height,
            texels: texels.to_vec(),
            source: None,
        });
        Ok(id)
    }

    fn load_texture(&mut self, path: &Path) -> EngineResult<ResourceId> {
        if !path.is_file() {
            return Err(EngineError::IoError {
                path: path.display().to_string(),
                error: "texture file not found".to_string(),
            });
        }
        let id = allocate_id(self);
        self.textures.push(RecordedTexture {
            id,
            label: path.display().to_string(),
            width: 0,
            height: 0,
            texels: Vec::new(),
            source: Some(path.to_path_buf()),
        });
        Ok(id)
    }

    fn set_stage_setup(&mut self, setup: StageSetup) {
        self.commands.push(BackendCommand::StageSetup(setup));
    }

    fn set_vertex_buffer(&mut self, buffer: &ResourceId) {
        self.commands.push(BackendCommand::SetVertexBuffer(*buffer));
    }

    fn set_texture(&mut self, stage: u32, texture: Option<&ResourceId>) {
        self.commands.push(BackendCommand::SetTexture {
            stage,
            texture: texture.copied(),
        });
    }

    fn set_texture_transform(&mut self, stage: u32, transform: Option<&Matrix3<f32>>) {
        self.commands.push(BackendCommand::SetTextureTransform {
            stage,
            transform: transform.copied(),
        });
    }

    fn set_light(&mut self, slot: u32, light: Option<&SceneLight>) {
        self.commands.push(BackendCommand::SetLight {
            slot,
            light: light.cloned(),
        });
    }

    fn set_material(&mut self, material: &Material) {
        self.commands.push(BackendCommand::SetMaterial(material.clone()));
    }

    fn draw_indexed(&mut self, indices: &ResourceId, draw: IndexedDraw) {
        self.commands.push(BackendCommand::DrawIndexed {
            indices: *indices,
            draw,
        });
    }
}

/// All draw commands recorded so far, in issue order
pub fn recorded_draws(backend: &RecordingBackend) -> Vec<(ResourceId, IndexedDraw)> {
    backend
        .commands
        .iter()
        .filter_map(|command| match command {
            BackendCommand::DrawIndexed { indices, draw } => Some((*indices, *draw)),
            _ => None,
        })
        .collect()
}

pub fn find_index_buffer(backend: &RecordingBackend, id: ResourceId) -> Option<&RecordedIndexBuffer> {
    backend.index_buffers.iter().find(|buffer| buffer.id == id)
}

pub fn find_texture(backend: &RecordingBackend, id: ResourceId) -> Option<&RecordedTexture> {
    backend.textures.iter().find(|texture| texture.id == id)
}

/// Forget recorded commands but keep resources (start of a new frame)
pub fn clear_commands(backend: &mut RecordingBackend) {
    backend.commands.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::vertex::SceneVertex;

    #[test]
    fn test_resources_get_distinct_ids() {
        let mut backend = create_recording_backend();
        let vb = backend
            .create_vertex_buffer("vb", &[SceneVertex::default(); 3])
            .unwrap();
        let ib = backend.create_index_buffer("ib", &[0, 1, 2]).unwrap();
        assert_ne!(vb, ib);
        assert_eq!(backend.vertex_buffers[0].vertex_count, 3);
        assert_eq!(backend.vertex_buffers[0].bytes.len(), 3 * 32);
        assert_eq!(find_index_buffer(&backend, ib).unwrap().indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_failing_buffer_creation() {
        let mut backend = create_recording_backend();
        backend.fail_buffer_creation = true;
        assert!(matches!(
            backend.create_index_buffer("ib", &[0, 1, 2]),
            Err(EngineError::BufferCreationFailed { .. })
        ));
    }

    #[test]
    fn test_blend_texture_size_checked() {
        let mut backend = create_recording_backend();
        assert!(backend.create_blend_texture("bad", 2, 2, &[0; 3]).is_err());
        let id = backend.create_blend_texture("ok", 2, 2, &[0xF000; 4]).unwrap();
        assert_eq!(find_texture(&backend, id).unwrap().texels.len(), 4);
    }

    #[test]
    fn test_missing_texture_file_fails() {
        let mut backend = create_recording_backend();
        assert!(backend.load_texture(Path::new("does/not/exist.png")).is_err());
    }

    #[test]
    fn test_draws_recorded_in_order() {
        let mut backend = create_recording_backend();
        let ib = backend.create_index_buffer("ib", &[0, 1, 2]).unwrap();
        let draw = IndexedDraw {
            base_vertex: 0,
            vertex_count: 3,
            index_count: 3,
            primitive_count: 1,
        };
        backend.set_stage_setup(StageSetup::SceneLit);
        backend.draw_indexed(&ib, draw);
        assert_eq!(recorded_draws(&backend), vec![(ib, draw)]);

        clear_commands(&mut backend);
        assert!(backend.commands.is_empty());
        assert_eq!(backend.index_buffers.len(), 1);
    }
}
