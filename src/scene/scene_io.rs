//! Scene file import
//!
//! Reads the scene object model from JSON and checks every cross reference
//! before the batcher sees it.

use super::error::{scene_load_failed, SceneError};
use super::scene_data::{PrimitiveLayout, SceneFile};
use crate::constants::gpu_limits::MAX_BLOCK_VERTICES;
use crate::error::EngineResult;
use std::path::Path;

pub fn parse_scene_json(text: &str) -> Result<SceneFile, SceneError> {
    Ok(serde_json::from_str(text)?)
}

/// Check material/texture references and index ranges of every surface
pub fn validate_scene_file(file: &SceneFile) -> Result<(), SceneError> {
    for (mesh_index, mesh) in file.meshes.iter().enumerate() {
        for (surface_index, surface) in mesh.surfaces.iter().enumerate() {
            if let Some(material) = surface.material {
                if material >= file.materials.len() {
                    return Err(SceneError::InvalidReference {
                        mesh: mesh_index,
                        surface: surface_index,
                        kind: "material",
                        index: material,
                    });
                }
            }

            if let Some(texture) = surface.texture {
                if texture >= file.textures.len() {
                    return Err(SceneError::InvalidReference {
                        mesh: mesh_index,
                        surface: surface_index,
                        kind: "texture",
                        index: texture,
                    });
                }
            }

            if surface.vertices.len() > MAX_BLOCK_VERTICES as usize {
                return Err(SceneError::TooManyVertices {
                    mesh: mesh_index,
                    surface: surface_index,
                    vertex_count: surface.vertices.len(),
                });
            }

            if let Some(&bad) = surface
                .indices
                .iter()
                .find(|&&index| index as usize >= surface.vertices.len())
            {
                return Err(SceneError::IndexOutOfRange {
                    mesh: mesh_index,
                    surface: surface_index,
                    index: bad,
                    vertex_count: surface.vertices.len(),
                });
            }

            if surface.layout != PrimitiveLayout::List && surface.vertices.len() < 3 {
                log::debug!(
                    "[scene_io::validate_scene_file] Mesh {} surface {} is a degenerate {:?}",
                    mesh_index,
                    surface_index,
                    surface.layout
                );
            }
        }
    }

    Ok(())
}

/// Read and validate a JSON scene; any failure is reported as a scene-load failure
pub fn load_scene_file(path: &Path) -> EngineResult<SceneFile> {
    let text = std::fs::read_to_string(path).map_err(|e| scene_load_failed(path, e))?;
    let file = parse_scene_json(&text).map_err(|e| scene_load_failed(path, e))?;
    validate_scene_file(&file).map_err(|e| scene_load_failed(path, e))?;

    log::info!(
        "[scene_io::load_scene_file] {}: {} entities, {} materials, {} textures, {} meshes",
        path.display(),
        file.entities.len(),
        file.materials.len(),
        file.textures.len(),
        file.meshes.len()
    );

    Ok(file)
}
