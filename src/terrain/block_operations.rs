//! Terrain block operations - Pure DOP functions
//!
//! Generation turns a rectangle of the height field plus the layer opacity
//! grids into one vertex buffer and a splat level per visible layer.

use super::block_data::{BlockLayout, SplatLevel, TerrainBlock};
use super::heightfield_data::HeightFieldData;
use super::heightfield_operations::normal_at;
use super::layer_data::TerrainLayer;
use super::layer_operations::opacity_at;
use crate::constants::gpu_limits::MAX_INDEX_16;
use crate::constants::terrain::{BLEND_STAGE, BRIGHTNESS_BOOST, MAX_BRIGHTNESS, MIN_BRIGHTNESS, SUN_DIRECTION};
use crate::error::{EngineError, EngineResult};
use crate::physics::aabb::{aabb_expand_to_point, empty_aabb, AABB};
use crate::renderer::backend::{IndexedDraw, RenderBackend};
use crate::renderer::vertex::TerrainVertex;
use cgmath::{InnerSpace, Point3, Vector3};

// ============================================================================
// LAYOUT
// ============================================================================

/// 3x3 neighbour table of block `(block_x, block_z)` in a row-major block grid
pub fn block_neighbours(
    block_x: u32,
    block_z: u32,
    blocks_wide: u32,
    blocks_high: u32,
) -> [[Option<usize>; 3]; 3] {
    let mut neighbours = [[None; 3]; 3];
    for (row, dz) in (-1i64..=1).enumerate() {
        for (column, dx) in (-1i64..=1).enumerate() {
            let (nx, nz) = (block_x as i64 + dx, block_z as i64 + dz);
            if nx >= 0 && nz >= 0 && nx < blocks_wide as i64 && nz < blocks_high as i64 {
                neighbours[row][column] = Some((nx + nz * blocks_wide as i64) as usize);
            }
        }
    }
    neighbours
}

// ============================================================================
// VERTICES
// ============================================================================

/// Baked sun brightness for the vertex at sample `(x, z)`
///
/// Averages N.L over the four normals around the vertex, adds a flat boost
/// and clamps the result.
pub fn vertex_diffuse(heightfield: &HeightFieldData, x: u32, z: u32) -> f32 {
    let to_sun = -Vector3::from(SUN_DIRECTION);
    let (x, z) = (x as i64, z as i64);

    let total: f32 = [(x, z), (x + 1, z), (x + 1, z + 1), (x, z + 1)]
        .iter()
        .map(|&(nx, nz)| normal_at(heightfield, nx, nz).dot(to_sun))
        .sum();

    (total / 4.0 + BRIGHTNESS_BOOST).clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS)
}

/// One vertex per height sample of the block, row by row, plus the bounds they span
pub fn build_block_vertices(heightfield: &HeightFieldData, layout: &BlockLayout) -> (Vec<TerrainVertex>, AABB) {
    let block_width = layout.quads_wide + 1;
    let block_height = layout.quads_high + 1;
    let scale = heightfield.scale;

    let mut vertices = Vec::with_capacity((block_width * block_height) as usize);
    let mut bounds = empty_aabb();

    for z in layout.start_z..layout.start_z + block_height {
        for x in layout.start_x..layout.start_x + block_width {
            let elevation = heightfield.samples[(x + z * heightfield.width) as usize];
            let position = Point3::new(x as f32 * scale.x, elevation * scale.y, z as f32 * scale.z);
            let brightness = vertex_diffuse(heightfield, x, z);

            vertices.push(TerrainVertex {
                position: position.into(),
                diffuse: [brightness, brightness, brightness, 1.0],
                tex_coords: [x as f32, z as f32],
                blend_coords: [
                    (x - layout.start_x) as f32 / layout.quads_wide as f32,
                    (z - layout.start_z) as f32 / layout.quads_high as f32,
                ],
            });
            aabb_expand_to_point(&mut bounds, position);
        }
    }

    (vertices, bounds)
}

// ============================================================================
// SPLAT LEVELS
// ============================================================================

/// Non-zero opacity texels of `layer` inside the block's footprint
pub fn count_layer_usage(layer: &TerrainLayer, layout: &BlockLayout, ratio: u32) -> u32 {
    let mut usage = 0;
    for z in layout.start_z * ratio..(layout.start_z + layout.quads_high) * ratio {
        for x in layout.start_x * ratio..(layout.start_x + layout.quads_wide) * ratio {
            if opacity_at(layer, x, z) > 0 {
                usage += 1;
            }
        }
    }
    usage
}

fn quad_visible(layer: &TerrainLayer, layout: &BlockLayout, ratio: u32, quad_x: u32, quad_z: u32) -> bool {
    let texel_x = (quad_x + layout.start_x) * ratio;
    let texel_z = (quad_z + layout.start_z) * ratio;
    (0..ratio).any(|dz| (0..ratio).any(|dx| opacity_at(layer, texel_x + dx, texel_z + dz) > 0))
}

fn vertex_index(index: u32) -> EngineResult<u16> {
    u16::try_from(index).map_err(|_| EngineError::IndexOverflow {
        index,
        max: MAX_INDEX_16,
    })
}

/// Triangle list over every quad whose footprint holds a non-zero texel
pub fn build_splat_indices(layer: &TerrainLayer, layout: &BlockLayout, ratio: u32) -> EngineResult<Vec<u16>> {
    let block_width = layout.quads_wide + 1;
    let mut indices = Vec::with_capacity((layout.quads_wide * layout.quads_high * 6) as usize);

    for z in 0..layout.quads_high {
        for x in 0..layout.quads_wide {
            if !quad_visible(layer, layout, ratio, x, z) {
                continue;
            }
            let top_left = x + z * block_width;
            let bottom_left = x + (z + 1) * block_width;
            for index in [
                top_left,
                bottom_left,
                bottom_left + 1,
                top_left,
                bottom_left + 1,
                top_left + 1,
            ] {
                indices.push(vertex_index(index)?);
            }
        }
    }

    Ok(indices)
}

/// Block-sized A4R4G4B4 texels carrying the top four bits of the layer opacity
pub fn build_blend_texels(layer: &TerrainLayer, layout: &BlockLayout, ratio: u32) -> Vec<u16> {
    let width = layout.quads_wide * ratio;
    let height = layout.quads_high * ratio;
    let origin_x = layout.start_x * ratio;
    let origin_z = layout.start_z * ratio;

    let mut texels = Vec::with_capacity(width as usize * height as usize);
    for z in 0..height {
        for x in 0..width {
            let opacity = opacity_at(layer, x + origin_x, z + origin_z);
            texels.push(((opacity as u16) << 8) & 0xF000);
        }
    }
    texels
}

fn build_splat_level<B: RenderBackend>(
    layers: &[TerrainLayer],
    layer_index: usize,
    layout: &BlockLayout,
    ratio: u32,
    backend: &mut B,
) -> EngineResult<SplatLevel<B>> {
    let layer = &layers[layer_index];
    let indices = build_splat_indices(layer, layout, ratio)?;
    let label = format!(
        "Terrain Block ({}, {}) Layer {} Indices",
        layout.start_x, layout.start_z, layer_index
    );
    let index_buffer = backend.create_index_buffer(&label, &indices)?;

    let blend_texture = if layer_index == 0 {
        None
    } else {
        let label = format!(
            "Terrain Block ({}, {}) Layer {} Blend",
            layout.start_x, layout.start_z, layer_index
        );
        let texels = build_blend_texels(layer, layout, ratio);
        Some(backend.create_blend_texture(
            &label,
            layout.quads_wide * ratio,
            layout.quads_high * ratio,
            &texels,
        )?)
    };

    let index_count = indices.len() as u32;
    Ok(SplatLevel {
        layer: layer_index,
        index_buffer,
        index_count,
        primitive_count: index_count / 3,
        blend_texture,
    })
}

// ============================================================================
// GENERATION / RENDER
// ============================================================================

/// Build a complete block; any resource failure aborts the whole block
pub fn generate_block<B: RenderBackend>(
    heightfield: &HeightFieldData,
    layers: &[TerrainLayer],
    layout: BlockLayout,
    blend_tex_ratio: u32,
    neighbours: [[Option<usize>; 3]; 3],
    backend: &mut B,
) -> EngineResult<TerrainBlock<B>> {
    let (vertices, bounds) = build_block_vertices(heightfield, &layout);
    let label = format!("Terrain Block ({}, {}) Vertices", layout.start_x, layout.start_z);
    let vertex_buffer = backend.create_vertex_buffer(&label, &vertices)?;

    let layer_usage: Vec<u32> = layers
        .iter()
        .map(|layer| count_layer_usage(layer, &layout, blend_tex_ratio))
        .collect();

    let mut splats = Vec::with_capacity(layers.len());
    for (layer_index, &usage) in layer_usage.iter().enumerate() {
        if usage == 0 {
            splats.push(None);
            continue;
        }
        splats.push(Some(build_splat_level(
            layers,
            layer_index,
            &layout,
            blend_tex_ratio,
            backend,
        )?));
    }

    log::debug!(
        "[block_operations::generate_block] Block ({}, {}): {} vertices, {} of {} layers present",
        layout.start_x,
        layout.start_z,
        vertices.len(),
        splats.iter().filter(|splat| splat.is_some()).count(),
        layers.len()
    );

    Ok(TerrainBlock {
        layout,
        block_width: layout.quads_wide + 1,
        block_height: layout.quads_high + 1,
        neighbours,
        vertex_buffer,
        vertex_count: vertices.len() as u32,
        bounds,
        layer_usage,
        splats,
    })
}

/// Draw one layer of a block; returns the primitives drawn
///
/// Expects the block's vertex buffer and the layer's ground texture to be bound.
pub fn render_block<B: RenderBackend>(block: &TerrainBlock<B>, backend: &mut B, layer: usize) -> u32 {
    let Some(splat) = block.splats.get(layer).and_then(Option::as_ref) else {
        return 0;
    };

    backend.set_texture(BLEND_STAGE, splat.blend_texture.as_ref());
    if splat.primitive_count == 0 {
        return 0;
    }

    backend.draw_indexed(
        &splat.index_buffer,
        IndexedDraw {
            base_vertex: 0,
            vertex_count: block.block_width * block.block_height,
            index_count: splat.index_count,
            primitive_count: splat.primitive_count,
        },
    );
    splat.primitive_count
}
