//! wgpu implementation of `RenderBackend`
//!
//! Resource creation goes straight to the device. State changes and draws are
//! captured into a per-frame list of `RecordedDraw`s; the application encodes
//! them into its own render pass with `encode_frame`, binding pipelines and
//! bind groups from the snapshot carried by each draw.

use super::backend::{IndexedDraw, RenderBackend, StageSetup};
use super::vertex::{SceneVertex, TerrainVertex};
use crate::error::{EngineError, EngineResult, ErrorContext};
use crate::scene::light_group_data::{Material, SceneLight};
use bytemuck::Pod;
use cgmath::Matrix3;
use std::path::Path;
use std::sync::Arc;
use wgpu::util::DeviceExt;

/// Texture plus its default view
#[derive(Debug)]
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

/// Number of texture stages tracked per draw
pub const STAGE_COUNT: usize = 2;

/// Snapshot of the bound state at the time of a draw
#[derive(Debug, Clone)]
pub struct RecordedDraw {
    pub stage_setup: StageSetup,
    pub vertex_buffer: Arc<wgpu::Buffer>,
    pub index_buffer: Arc<wgpu::Buffer>,
    pub textures: [Option<Arc<GpuTexture>>; STAGE_COUNT],
    pub texture_transforms: [Option<Matrix3<f32>>; STAGE_COUNT],
    /// Indexed by light slot, `None` = disabled
    pub lights: Vec<Option<SceneLight>>,
    pub material: Material,
    pub draw: IndexedDraw,
}

pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    stage_setup: StageSetup,
    vertex_buffer: Option<Arc<wgpu::Buffer>>,
    textures: [Option<Arc<GpuTexture>>; STAGE_COUNT],
    texture_transforms: [Option<Matrix3<f32>>; STAGE_COUNT],
    lights: Vec<Option<SceneLight>>,
    material: Material,
    frame: Vec<RecordedDraw>,
}

pub fn create_wgpu_backend(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> WgpuBackend {
    WgpuBackend {
        device,
        queue,
        stage_setup: StageSetup::TerrainSplat,
        vertex_buffer: None,
        textures: [None, None],
        texture_transforms: [None, None],
        lights: Vec::new(),
        material: Material::default(),
        frame: Vec::new(),
    }
}

/// Drop last frame's draws and bound state
pub fn begin_frame(backend: &mut WgpuBackend) {
    backend.frame.clear();
    backend.vertex_buffer = None;
    backend.textures = [None, None];
    backend.texture_transforms = [None, None];
}

pub fn frame_draws(backend: &WgpuBackend) -> &[RecordedDraw] {
    &backend.frame
}

/// Encode the recorded frame. `bind` sets pipeline and bind groups for each draw
/// before its buffers are bound and the draw is issued.
pub fn encode_frame<'a>(
    backend: &'a WgpuBackend,
    pass: &mut wgpu::RenderPass<'a>,
    mut bind: impl FnMut(&mut wgpu::RenderPass<'a>, &'a RecordedDraw),
) {
    for recorded in &backend.frame {
        bind(pass, recorded);
        pass.set_vertex_buffer(0, recorded.vertex_buffer.slice(..));
        pass.set_index_buffer(recorded.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(
            0..recorded.draw.index_count,
            recorded.draw.base_vertex as i32,
            0..1,
        );
    }
}

/// Expand A4R4G4B4 alpha nibbles into one R8 byte per texel
pub fn expand_blend_alpha(texels: &[u16]) -> Vec<u8> {
    texels.iter().map(|t| ((t >> 12) as u8) * 17).collect()
}

const TERRAIN_ATTRIBUTES: [wgpu::VertexAttribute; 4] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4, 2 => Float32x2, 3 => Float32x2];

const SCENE_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

pub fn terrain_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<TerrainVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &TERRAIN_ATTRIBUTES,
    }
}

pub fn scene_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<SceneVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &SCENE_ATTRIBUTES,
    }
}

/// Run `create` inside validation/OOM error scopes and report any captured error
fn with_error_scope<T>(device: &wgpu::Device, create: impl FnOnce() -> T) -> Result<T, String> {
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    let validation = pollster::block_on(device.pop_error_scope());
    let out_of_memory = pollster::block_on(device.pop_error_scope());

    match validation.or(out_of_memory) {
        Some(error) => Err(error.to_string()),
        None => Ok(value),
    }
}

fn create_buffer(
    backend: &WgpuBackend,
    label: &str,
    contents: &[u8],
    usage: wgpu::BufferUsages,
) -> EngineResult<Arc<wgpu::Buffer>> {
    let device = &backend.device;
    let buffer = with_error_scope(device, || {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage,
        })
    })
    .map_err(|error| {
        log::error!("[wgpu_backend::create_buffer] '{}' ({} bytes): {}", label, contents.len(), error);
        EngineError::BufferCreationFailed {
            label: label.to_string(),
            size: contents.len(),
            error,
        }
    })?;

    Ok(Arc::new(buffer))
}

fn create_texture(
    backend: &WgpuBackend,
    label: &str,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    bytes_per_texel: u32,
    data: &[u8],
) -> EngineResult<Arc<GpuTexture>> {
    let device = &backend.device;
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };

    let texture = with_error_scope(device, || {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        backend.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_texel * width),
                rows_per_image: Some(height),
            },
            size,
        );

        texture
    })
    .map_err(|error| EngineError::TextureCreationFailed {
        label: label.to_string(),
        width,
        height,
        error,
    })?;

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    Ok(Arc::new(GpuTexture {
        texture,
        view,
        width,
        height,
    }))
}

fn ensure_light_slot(backend: &mut WgpuBackend, slot: u32) {
    let needed = slot as usize + 1;
    if backend.lights.len() < needed {
        backend.lights.resize(needed, None);
    }
}

impl RenderBackend for WgpuBackend {
    type VertexBuffer = Arc<wgpu::Buffer>;
    type IndexBuffer = Arc<wgpu::Buffer>;
    type Texture = Arc<GpuTexture>;

    fn create_vertex_buffer<V: Pod>(&mut self, label: &str, vertices: &[V]) -> EngineResult<Self::VertexBuffer> {
        create_buffer(self, label, bytemuck::cast_slice(vertices), wgpu::BufferUsages::VERTEX)
    }

    fn create_index_buffer(&mut self, label: &str, indices: &[u16]) -> EngineResult<Self::IndexBuffer> {
        // wgpu requires 4-byte aligned buffer sizes
        let mut padded = indices.to_vec();
        if padded.len() % 2 != 0 {
            padded.push(0);
        }
        create_buffer(self, label, bytemuck::cast_slice(&padded), wgpu::BufferUsages::INDEX)
    }

    fn create_blend_texture(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        texels: &[u16],
    ) -> EngineResult<Self::Texture> {
        if texels.len() != (width * height) as usize {
            return Err(EngineError::TextureCreationFailed {
                label: label.to_string(),
                width,
                height,
                error: format!("expected {} texels, got {}", width * height, texels.len()),
            });
        }
        let alpha = expand_blend_alpha(texels);
        create_texture(self, label, width, height, wgpu::TextureFormat::R8Unorm, 1, &alpha)
    }

    fn load_texture(&mut self, path: &Path) -> EngineResult<Self::Texture> {
        let image = image::open(path).with_path(path)?.to_rgba8();
        let (width, height) = image.dimensions();
        log::debug!(
            "[wgpu_backend::load_texture] {} ({}x{})",
            path.display(),
            width,
            height
        );
        create_texture(
            self,
            &path.display().to_string(),
            width,
            height,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            4,
            image.as_raw(),
        )
    }

    fn set_stage_setup(&mut self, setup: StageSetup) {
        self.stage_setup = setup;
    }

    fn set_vertex_buffer(&mut self, buffer: &Self::VertexBuffer) {
        self.vertex_buffer = Some(Arc::clone(buffer));
    }

    fn set_texture(&mut self, stage: u32, texture: Option<&Self::Texture>) {
        if let Some(slot) = self.textures.get_mut(stage as usize) {
            *slot = texture.cloned();
        }
    }

    fn set_texture_transform(&mut self, stage: u32, transform: Option<&Matrix3<f32>>) {
        if let Some(slot) = self.texture_transforms.get_mut(stage as usize) {
            *slot = transform.copied();
        }
    }

    fn set_light(&mut self, slot: u32, light: Option<&SceneLight>) {
        ensure_light_slot(self, slot);
        self.lights[slot as usize] = light.cloned();
    }

    fn set_material(&mut self, material: &Material) {
        self.material = material.clone();
    }

    fn draw_indexed(&mut self, indices: &Self::IndexBuffer, draw: IndexedDraw) {
        let Some(vertex_buffer) = self.vertex_buffer.clone() else {
            log::warn!("[wgpu_backend::draw_indexed] Draw issued with no vertex buffer bound, skipped");
            return;
        };

        self.frame.push(RecordedDraw {
            stage_setup: self.stage_setup,
            vertex_buffer,
            index_buffer: Arc::clone(indices),
            textures: self.textures.clone(),
            texture_transforms: self.texture_transforms,
            lights: self.lights.clone(),
            material: self.material.clone(),
            draw,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_alpha_expands_nibble() {
        assert_eq!(expand_blend_alpha(&[0x0000, 0xF000, 0x8000, 0x0FFF]), vec![0, 255, 136, 0]);
    }

    #[test]
    fn test_vertex_layout_strides() {
        assert_eq!(terrain_vertex_layout().array_stride, 44);
        assert_eq!(scene_vertex_layout().array_stride, 32);
        assert_eq!(terrain_vertex_layout().attributes.len(), 4);
    }
}
