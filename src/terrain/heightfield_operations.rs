//! Height field operations - Pure DOP functions
//!
//! Loading and smoothing of 8-bit height maps, plus the queries used by block
//! generation and ground collision.

use super::heightfield_data::HeightFieldData;
use crate::error::{EngineError, EngineResult, ErrorContext};
use cgmath::{InnerSpace, Vector3};
use std::path::Path;

/// 3x3 box filter over interior samples; the outer ring is copied unchanged
///
/// Every interior output is the mean of the *unfiltered* neighbourhood.
pub fn box_filter(samples: &[f32], width: u32, height: u32) -> Vec<f32> {
    let (w, h) = (width as usize, height as usize);
    let mut filtered = samples.to_vec();

    for z in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            let mut total = 0.0;
            for dz in 0..3 {
                for dx in 0..3 {
                    total += samples[(x + dx - 1) + (z + dz - 1) * w];
                }
            }
            filtered[x + z * w] = total / 9.0;
        }
    }

    filtered
}

/// Build a smoothed height field from raw bytes (extra trailing bytes are ignored)
pub fn heightfield_from_samples(
    raw: &[u8],
    width: u32,
    height: u32,
    scale: Vector3<f32>,
) -> EngineResult<HeightFieldData> {
    let expected = width as usize * height as usize;
    if raw.len() < expected {
        return Err(EngineError::HeightMapTooShort {
            path: "<memory>".to_string(),
            expected,
            found: raw.len(),
        });
    }

    let samples: Vec<f32> = raw[..expected].iter().map(|&b| b as f32).collect();
    Ok(HeightFieldData {
        width,
        height,
        scale,
        samples: box_filter(&samples, width, height),
    })
}

/// Read a raw `width * height` byte height map and smooth it
pub fn load_heightfield(path: &Path, width: u32, height: u32, scale: Vector3<f32>) -> EngineResult<HeightFieldData> {
    let raw = std::fs::read(path).with_path(path)?;

    let heightfield = heightfield_from_samples(&raw, width, height, scale).map_err(|e| match e {
        EngineError::HeightMapTooShort { expected, found, .. } => {
            log::error!(
                "[heightfield_operations::load_heightfield] {} holds {} bytes, {} needed",
                path.display(),
                found,
                expected
            );
            EngineError::HeightMapTooShort {
                path: path.display().to_string(),
                expected,
                found,
            }
        }
        other => other,
    })?;

    log::info!(
        "[heightfield_operations::load_heightfield] Loaded {}x{} height map from {}",
        width,
        height,
        path.display()
    );
    Ok(heightfield)
}

/// Raw sample with coordinates clamped to the grid
fn sample(heightfield: &HeightFieldData, x: usize, z: usize) -> f32 {
    let x = x.min(heightfield.width as usize - 1);
    let z = z.min(heightfield.height as usize - 1);
    heightfield.samples[x + z * heightfield.width as usize]
}

/// World-space elevation at `(world_x, world_z)`, 0 outside the grid
///
/// The enclosing quad is split along one diagonal (top-right to bottom-left,
/// or top-left to bottom-right when `reverse_quad` is set). The missing corner
/// of the triangle containing the point is synthesised on that triangle's plane
/// before bilinear interpolation, so the result is exact at grid corners and
/// continuous across the diagonal.
pub fn height_at(heightfield: &HeightFieldData, world_x: f32, world_z: f32, reverse_quad: bool) -> f32 {
    let x = world_x / heightfield.scale.x;
    let z = world_z / heightfield.scale.z;
    if !(x >= 0.0 && z >= 0.0 && x < heightfield.width as f32 && z < heightfield.height as f32) {
        return 0.0;
    }

    let ix = x as usize;
    let iz = z as usize;
    let px = x - ix as f32;
    let pz = z - iz as f32;
    let sy = heightfield.scale.y;

    let corner = |cx: usize, cz: usize| sample(heightfield, cx, cz) * sy;

    let (top_left, top_right, bottom_left, bottom_right);
    if reverse_quad {
        top_left = corner(ix, iz);
        bottom_right = corner(ix + 1, iz + 1);
        if px < pz {
            bottom_left = corner(ix, iz + 1);
            top_right = top_left + (bottom_right - bottom_left);
        } else {
            top_right = corner(ix + 1, iz);
            bottom_left = top_left + (bottom_right - top_right);
        }
    } else {
        top_right = corner(ix + 1, iz);
        bottom_left = corner(ix, iz + 1);
        if px < 1.0 - pz {
            top_left = corner(ix, iz);
            bottom_right = bottom_left + (top_right - top_left);
        } else {
            bottom_right = corner(ix + 1, iz + 1);
            top_left = top_right + (bottom_left - bottom_right);
        }
    }

    let top = top_left + (top_right - top_left) * px;
    let bottom = bottom_left + (bottom_right - bottom_left) * px;
    top + (bottom - top) * pz
}

/// Surface normal at grid sample `(x, z)`; straight up outside the grid
///
/// Uses the +X / +Z neighbours, falling back to -X / -Z on the last column/row.
pub fn normal_at(heightfield: &HeightFieldData, x: i64, z: i64) -> Vector3<f32> {
    let (w, h) = (heightfield.width as i64, heightfield.height as i64);
    if x < 0 || z < 0 || x >= w || z >= h {
        return Vector3::unit_y();
    }

    let at = |sx: i64, sz: i64| heightfield.samples[(sx + sz * w) as usize] * heightfield.scale.y;
    let step_x = if x < w - 1 { 1 } else { -1 };
    let step_z = if z < h - 1 { 1 } else { -1 };

    let y1 = at(x, z);
    let y2 = at(x + step_x, z);
    let y3 = at(x, z + step_z);

    let edge1 = Vector3::new(0.0, y3 - y1, heightfield.scale.z);
    let edge2 = Vector3::new(heightfield.scale.x, y2 - y1, 0.0);
    edge1.cross(edge2).normalize()
}
