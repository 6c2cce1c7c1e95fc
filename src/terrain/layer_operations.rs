//! Terrain layer operations - Pure DOP functions

use super::layer_data::TerrainLayer;
use crate::config::definition_data::{LayerDefinition, TerrainDefinition};
use crate::config::definition_operations::layer_section_name;
use crate::constants::terrain::{MAX_BLEND_ALPHA, MIN_BLEND_ALPHA};
use crate::error::{EngineError, EngineResult, ErrorContext, OptionExt};
use cgmath::Matrix3;
use std::path::Path;

/// Snap near-transparent samples to 0 and near-opaque samples to 255
pub fn clamp_opacity(value: u8) -> u8 {
    if value < MIN_BLEND_ALPHA {
        0
    } else if value > MAX_BLEND_ALPHA {
        255
    } else {
        value
    }
}

/// 2-D texture transform: rotate, then scale, with the translation scaled too
///
/// Applied to `(u, v, 1)` column vectors.
pub fn build_texture_transform(translation: [f32; 2], rotation_degrees: f32, scale: [f32; 2]) -> Matrix3<f32> {
    let (sin, cos) = rotation_degrees.to_radians().sin_cos();
    let [sx, sy] = scale;
    let [tx, ty] = translation;

    Matrix3::new(
        sx * cos, sy * sin, 0.0,
        -sx * sin, sy * cos, 0.0,
        sx * tx, sy * ty, 1.0,
    )
}

/// Layer with an opacity grid of `width x height` texels, all set to `fill`
pub fn create_layer(definition: &LayerDefinition, width: u32, height: u32, fill: u8) -> TerrainLayer {
    TerrainLayer {
        texture_index: definition.texture_index,
        width,
        height,
        opacity: Some(vec![fill; width as usize * height as usize]),
        transform: build_texture_transform(definition.translation, definition.rotation, definition.scale),
    }
}

/// Opacity at `(x, z)`; 0 outside the grid or once released
pub fn opacity_at(layer: &TerrainLayer, x: u32, z: u32) -> u8 {
    match layer.opacity.as_ref() {
        Some(opacity) if x < layer.width && z < layer.height => {
            opacity[x as usize + z as usize * layer.width as usize]
        }
        _ => 0,
    }
}

/// Mean of the texel and its in-bounds N/E/S/W neighbours
pub fn filtered_alpha(layer: &TerrainLayer, x: u32, z: u32) -> u8 {
    let Some(opacity) = layer.opacity.as_ref() else {
        return 0;
    };
    let (w, h) = (layer.width as i64, layer.height as i64);
    let (x, z) = (x as i64, z as i64);

    let mut total = 0u32;
    let mut count = 0u32;
    for (dx, dz) in [(0, 0), (0, -1), (1, 0), (0, 1), (-1, 0)] {
        let (nx, nz) = (x + dx, z + dz);
        if nx >= 0 && nz >= 0 && nx < w && nz < h {
            total += opacity[(nx + nz * w) as usize] as u32;
            count += 1;
        }
    }

    if count == 0 {
        0
    } else {
        (total / count) as u8
    }
}

/// Read the blue channel of an image into a `width x height` opacity grid
///
/// The image is copied into the top-left corner; anything it does not cover
/// stays transparent. Values are clamped with `clamp_opacity`.
pub fn load_layer_map(path: &Path, width: u32, height: u32) -> EngineResult<Vec<u8>> {
    let image = image::open(path).with_path(path)?.to_rgb8();
    let (image_width, image_height) = image.dimensions();

    if image_width != width || image_height != height {
        log::warn!(
            "[layer_operations::load_layer_map] {} is {}x{}, layer grid is {}x{}; copying the overlap",
            path.display(),
            image_width,
            image_height,
            width,
            height
        );
    }

    let mut opacity = vec![0u8; width as usize * height as usize];
    for z in 0..image_height.min(height) {
        for x in 0..image_width.min(width) {
            let blue = image.get_pixel(x, z)[2];
            opacity[(x + z * width) as usize] = clamp_opacity(blue);
        }
    }

    log::debug!(
        "[layer_operations::load_layer_map] Loaded {} ({}x{})",
        path.display(),
        image_width,
        image_height
    );
    Ok(opacity)
}

/// Build every layer of a definition over a `grid_width x grid_height` texel grid
///
/// The base layer is fully opaque; the others come from their layer maps.
pub fn build_layers(
    definition: &TerrainDefinition,
    grid_width: u32,
    grid_height: u32,
) -> EngineResult<Vec<TerrainLayer>> {
    let mut layers = Vec::with_capacity(definition.layers.len());

    for (index, layer_definition) in definition.layers.iter().enumerate() {
        if index == 0 {
            layers.push(create_layer(layer_definition, grid_width, grid_height, 255));
            continue;
        }

        let map_path = layer_definition
            .layer_map
            .as_deref()
            .ok_or_engine(|| EngineError::MissingConfig {
                field: format!("{}.LayerMap", layer_section_name(index)),
            })?;
        let mut layer = create_layer(layer_definition, grid_width, grid_height, 0);
        layer.opacity = Some(load_layer_map(map_path, grid_width, grid_height)?);
        layers.push(layer);
    }

    log::info!(
        "[layer_operations::build_layers] Built {} layers over a {}x{} blend grid",
        layers.len(),
        grid_width,
        grid_height
    );
    Ok(layers)
}

/// Hide texels that a later layer fully covers
///
/// Layers are processed in order; a texel of layer `i` is cleared when any
/// layer `j > i` has a filtered alpha of 255 at the same spot.
pub fn apply_occlusion(layers: &mut [TerrainLayer]) {
    let mut cleared = 0usize;

    for i in 0..layers.len() {
        let (lower, upper) = layers.split_at_mut(i + 1);
        let layer = &mut lower[i];
        let (width, height) = (layer.width, layer.height);
        let Some(opacity) = layer.opacity.as_mut() else {
            continue;
        };

        for z in 0..height {
            for x in 0..width {
                let index = (x + z * width) as usize;
                if opacity[index] == 0 {
                    continue;
                }
                if upper.iter().any(|above| filtered_alpha(above, x, z) == 255) {
                    opacity[index] = 0;
                    cleared += 1;
                }
            }
        }
    }

    log::debug!(
        "[layer_operations::apply_occlusion] Cleared {} occluded texels across {} layers",
        cleared,
        layers.len()
    );
}

/// Free the opacity grid (after block generation)
pub fn release_opacity(layer: &mut TerrainLayer) {
    layer.opacity = None;
}
