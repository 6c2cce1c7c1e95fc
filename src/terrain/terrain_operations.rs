//! Terrain operations - Pure DOP functions
//!
//! Loading, culled rendering, layer toggles, height queries and the ground
//! collision helpers for players and cameras.

use super::block_data::{BlockLayout, TerrainBlock};
use super::block_operations::{block_neighbours, generate_block, render_block};
use super::heightfield_data::HeightFieldData;
use super::heightfield_operations::{height_at, load_heightfield, normal_at};
use super::layer_data::TerrainLayer;
use super::layer_operations::{apply_occlusion, build_layers, release_opacity};
use super::terrain_data::{GroundClamp, TerrainData, TerrainRenderStats};
use crate::camera::camera_data::{CameraData, CameraMode};
use crate::camera::camera_operations::{bounds_in_frustum, camera_frustum, set_look_at};
use crate::config::definition_data::TerrainDefinition;
use crate::config::definition_operations::{load_definition, validate_definition};
use crate::constants::terrain::GROUND_STAGE;
use crate::error::{EngineError, EngineResult};
use crate::renderer::backend::{RenderBackend, StageSetup};
use cgmath::{Point3, Vector3};
use std::path::Path;

// ============================================================================
// LIFECYCLE
// ============================================================================

pub fn create_terrain<B: RenderBackend>() -> TerrainData<B> {
    TerrainData::default()
}

pub fn is_loaded<B: RenderBackend>(terrain: &TerrainData<B>) -> bool {
    terrain.heightfield.is_some()
}

fn ensure_unloaded<B: RenderBackend>(terrain: &TerrainData<B>) -> EngineResult<()> {
    if is_loaded(terrain) {
        log::error!("[terrain_operations::load_terrain] Terrain already loaded; release it first");
        return Err(EngineError::StateError {
            expected: "unloaded terrain".to_string(),
            actual: "loaded terrain".to_string(),
        });
    }
    Ok(())
}

/// Load a terrain definition file and build everything it describes
pub fn load_terrain<B: RenderBackend>(
    terrain: &mut TerrainData<B>,
    definition_path: &Path,
    backend: &mut B,
) -> EngineResult<()> {
    ensure_unloaded(terrain)?;
    let definition = load_definition(definition_path)?;
    load_terrain_from_definition(terrain, definition, backend)
}

fn load_ground_textures<B: RenderBackend>(definition: &TerrainDefinition, backend: &mut B) -> Vec<Option<B::Texture>> {
    definition
        .textures
        .iter()
        .map(|path| match backend.load_texture(path) {
            Ok(texture) => Some(texture),
            Err(e) => {
                log::warn!(
                    "[terrain_operations::load_ground_textures] Ground texture {} unavailable: {}",
                    path.display(),
                    e
                );
                None
            }
        })
        .collect()
}

fn generate_blocks<B: RenderBackend>(
    heightfield: &HeightFieldData,
    definition: &TerrainDefinition,
    layers: &[TerrainLayer],
    backend: &mut B,
) -> EngineResult<(Vec<TerrainBlock<B>>, u32, u32)> {
    let general = &definition.general;
    let quads_wide = general.block_size[0] - 1;
    let quads_high = general.block_size[1] - 1;
    let terrain_quads_wide = heightfield.width - 1;
    let terrain_quads_high = heightfield.height - 1;

    if terrain_quads_wide % quads_wide != 0 || terrain_quads_high % quads_high != 0 {
        log::warn!(
            "[terrain_operations::generate_blocks] {}x{} quads do not divide into {}x{} blocks; the remainder is not drawn",
            terrain_quads_wide,
            terrain_quads_high,
            quads_wide,
            quads_high
        );
    }

    let blocks_wide = terrain_quads_wide / quads_wide;
    let blocks_high = terrain_quads_high / quads_high;
    let mut blocks = Vec::with_capacity((blocks_wide * blocks_high) as usize);

    for block_z in 0..blocks_high {
        for block_x in 0..blocks_wide {
            let layout = BlockLayout {
                start_x: block_x * quads_wide,
                start_z: block_z * quads_high,
                quads_wide,
                quads_high,
            };
            blocks.push(generate_block(
                heightfield,
                layers,
                layout,
                general.blend_tex_ratio,
                block_neighbours(block_x, block_z, blocks_wide, blocks_high),
                backend,
            )?);
        }
    }

    Ok((blocks, blocks_wide, blocks_high))
}

/// Build a terrain from an already parsed definition (paths must be resolved)
///
/// Nothing is stored until every step has succeeded.
pub fn load_terrain_from_definition<B: RenderBackend>(
    terrain: &mut TerrainData<B>,
    definition: TerrainDefinition,
    backend: &mut B,
) -> EngineResult<()> {
    ensure_unloaded(terrain)?;
    validate_definition(&definition)?;

    let general = &definition.general;
    let [width, height] = general.terrain_size;
    let heightfield = load_heightfield(&general.heightmap, width, height, Vector3::from(general.scale))?;

    let textures = load_ground_textures(&definition, backend);

    let ratio = general.blend_tex_ratio;
    let mut layers = build_layers(&definition, (width - 1) * ratio, (height - 1) * ratio)?;
    apply_occlusion(&mut layers);

    let (blocks, blocks_wide, blocks_high) = generate_blocks(&heightfield, &definition, &layers, backend)?;
    for layer in &mut layers {
        release_opacity(layer);
    }

    log::info!(
        "[terrain_operations::load_terrain_from_definition] {}x{} terrain: {}x{} blocks, {} layers, {} of {} textures loaded",
        width,
        height,
        blocks_wide,
        blocks_high,
        layers.len(),
        textures.iter().filter(|texture| texture.is_some()).count(),
        textures.len()
    );

    terrain.layer_enabled = vec![true; layers.len()];
    terrain.layers = layers;
    terrain.textures = textures;
    terrain.blocks = blocks;
    terrain.blocks_wide = blocks_wide;
    terrain.blocks_high = blocks_high;
    terrain.heightfield = Some(heightfield);
    terrain.definition = Some(definition);
    Ok(())
}

/// Drop every block, texture and layer
pub fn release_terrain<B: RenderBackend>(terrain: &mut TerrainData<B>) {
    *terrain = TerrainData::default();
}

// ============================================================================
// RENDER
// ============================================================================

/// Draw every block the camera can see, layer by layer
pub fn render_terrain<B: RenderBackend>(
    terrain: &TerrainData<B>,
    camera: &CameraData,
    backend: &mut B,
) -> TerrainRenderStats {
    let mut stats = TerrainRenderStats::default();
    if terrain.blocks.is_empty() {
        return stats;
    }

    let frustum = camera_frustum(camera);
    backend.set_stage_setup(StageSetup::TerrainSplat);

    for block in &terrain.blocks {
        if !bounds_in_frustum(&frustum, &block.bounds) {
            stats.blocks_culled += 1;
            continue;
        }
        stats.blocks_drawn += 1;
        backend.set_vertex_buffer(&block.vertex_buffer);

        for (layer_index, layer) in terrain.layers.iter().enumerate() {
            if !layer_enabled(terrain, layer_index) {
                continue;
            }
            if block.splats.get(layer_index).map_or(true, Option::is_none) {
                continue;
            }

            let texture = terrain.textures.get(layer.texture_index).and_then(Option::as_ref);
            backend.set_texture(GROUND_STAGE, texture);
            backend.set_texture_transform(GROUND_STAGE, Some(&layer.transform));

            let primitives = render_block(block, backend, layer_index);
            if primitives > 0 {
                stats.draw_calls += 1;
                stats.primitives += primitives;
            }
        }
    }

    stats
}

// ============================================================================
// LAYER TOGGLES
// ============================================================================

pub fn set_layer_enabled<B: RenderBackend>(
    terrain: &mut TerrainData<B>,
    layer: usize,
    enabled: bool,
) -> EngineResult<()> {
    let layer_count = terrain.layer_enabled.len();
    let flag = terrain
        .layer_enabled
        .get_mut(layer)
        .ok_or(EngineError::LayerOutOfBounds { layer, layer_count })?;
    *flag = enabled;
    Ok(())
}

/// False for layers that do not exist
pub fn layer_enabled<B: RenderBackend>(terrain: &TerrainData<B>, layer: usize) -> bool {
    terrain.layer_enabled.get(layer).copied().unwrap_or(false)
}

// ============================================================================
// QUERIES / COLLISION
// ============================================================================

/// World-space elevation; 0 when nothing is loaded or outside the terrain
pub fn terrain_height<B: RenderBackend>(terrain: &TerrainData<B>, x: f32, z: f32, reverse_quad: bool) -> f32 {
    terrain
        .heightfield
        .as_ref()
        .map_or(0.0, |heightfield| height_at(heightfield, x, z, reverse_quad))
}

/// Normal at grid sample `(x, z)`; straight up when nothing is loaded
pub fn terrain_normal<B: RenderBackend>(terrain: &TerrainData<B>, x: i64, z: i64) -> Vector3<f32> {
    terrain
        .heightfield
        .as_ref()
        .map_or_else(Vector3::unit_y, |heightfield| normal_at(heightfield, x, z))
}

/// Lift a body whose collision volume reaches `volume_min_y` below its origin
/// back onto the surface, killing any vertical velocity
pub fn clamp_to_ground<B: RenderBackend>(
    terrain: &TerrainData<B>,
    position: Point3<f32>,
    velocity: Vector3<f32>,
    volume_min_y: f32,
) -> GroundClamp {
    let ground = terrain_height(terrain, position.x, position.z, true) - volume_min_y;
    if position.y < ground {
        GroundClamp {
            position: Point3::new(position.x, ground, position.z),
            velocity: Vector3::new(velocity.x, 0.0, velocity.z),
            grounded: true,
        }
    } else {
        GroundClamp {
            position,
            velocity,
            grounded: false,
        }
    }
}

/// Keep a third-person camera above the ground and aimed at its target
///
/// Other camera modes are returned unchanged.
pub fn clamp_camera_to_ground<B: RenderBackend>(
    terrain: &TerrainData<B>,
    camera: &CameraData,
    target: Point3<f32>,
) -> CameraData {
    if !matches!(camera.mode, CameraMode::ThirdPerson { .. }) {
        return *camera;
    }

    let ground = terrain_height(terrain, camera.position.x, camera.position.z, true) - camera.volume_min_y;
    let mut clamped = *camera;
    if clamped.position.y < ground {
        clamped.position.y = ground;
    }
    set_look_at(&clamped, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::camera_operations::init_camera;
    use crate::renderer::recording::{create_recording_backend, recorded_draws, BackendCommand, RecordingBackend};
    use std::path::PathBuf;

    fn write_flat_terrain(dir: &Path, size: u32, elevation: u8) -> PathBuf {
        let heightmap = dir.join("flat.raw");
        std::fs::write(&heightmap, vec![elevation; (size * size) as usize]).unwrap();
        heightmap
    }

    fn flat_definition(dir: &Path, size: u32, block: u32) -> TerrainDefinition {
        let mut definition = TerrainDefinition::default();
        definition.general.heightmap = write_flat_terrain(dir, size, 100);
        definition.general.terrain_size = [size, size];
        definition.general.block_size = [block, block];
        definition
    }

    fn loaded(definition: TerrainDefinition) -> (TerrainData<RecordingBackend>, RecordingBackend) {
        let mut backend = create_recording_backend();
        let mut terrain = create_terrain();
        load_terrain_from_definition(&mut terrain, definition, &mut backend).unwrap();
        (terrain, backend)
    }

    fn looking_at_terrain() -> CameraData {
        // High above the middle of a 256x256 terrain, looking along +X and down
        init_camera(Point3::new(-50.0, 200.0, 128.0), 0.0, -0.6)
    }

    #[test]
    fn test_flat_257_terrain_end_to_end() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        let definition_path = dir.path().join("flat.ini");
        write_flat_terrain(dir.path(), 257, 100);
        std::fs::write(
            &definition_path,
            "[General]\nHeightmap = flat.raw\nTerrainSize = 257, 257\nBlockSize = 17, 17\nLayerCount = 1\n",
        )
        .unwrap();

        let mut backend = create_recording_backend();
        let mut terrain = create_terrain();
        load_terrain(&mut terrain, &definition_path, &mut backend).unwrap();

        assert!(is_loaded(&terrain));
        assert_eq!((terrain.blocks_wide, terrain.blocks_high), (16, 16));
        assert_eq!(terrain.blocks.len(), 256);
        for block in &terrain.blocks {
            assert_eq!(block.vertex_count, 17 * 17);
            assert_eq!(block.bounds.min.y, 100.0);
            assert_eq!(block.bounds.max.y, 100.0);
            assert_eq!(block.splats.len(), 1);
            let base = block.splats[0].as_ref().unwrap();
            assert_eq!(base.primitive_count, 16 * 16 * 2);
            assert!(base.blend_texture.is_none());
        }
        // No blend textures and no ground textures were created
        assert!(backend.textures.is_empty());
        assert!(terrain.layers.iter().all(|layer| layer.opacity.is_none()));
        assert_eq!(terrain.blocks[17].neighbours[0][0], Some(0));
    }

    #[test]
    fn test_second_load_is_state_error() {
        let dir = tempfile::tempdir().unwrap();
        let (mut terrain, mut backend) = loaded(flat_definition(dir.path(), 9, 5));
        let result = load_terrain_from_definition(&mut terrain, flat_definition(dir.path(), 9, 5), &mut backend);
        assert!(matches!(result, Err(EngineError::StateError { .. })));

        release_terrain(&mut terrain);
        assert!(!is_loaded(&terrain));
        assert!(terrain.blocks.is_empty());
        load_terrain_from_definition(&mut terrain, flat_definition(dir.path(), 9, 5), &mut backend).unwrap();
    }

    #[test]
    fn test_failed_load_leaves_terrain_unloaded() {
        let dir = tempfile::tempdir().unwrap();
        let mut definition = flat_definition(dir.path(), 9, 5);
        definition.general.terrain_size = [17, 17];
        let mut backend = create_recording_backend();
        let mut terrain = create_terrain();

        assert!(matches!(
            load_terrain_from_definition(&mut terrain, definition, &mut backend),
            Err(EngineError::HeightMapTooShort { .. })
        ));
        assert!(!is_loaded(&terrain));

        backend.fail_buffer_creation = true;
        assert!(load_terrain_from_definition(&mut terrain, flat_definition(dir.path(), 9, 5), &mut backend).is_err());
        assert!(!is_loaded(&terrain));
        assert!(terrain.blocks.is_empty());
    }

    #[test]
    fn test_oversized_blend_ratio_rejected_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let mut definition = flat_definition(dir.path(), 257, 17);
        definition.general.blend_tex_ratio = 20_000_000;
        let mut backend = create_recording_backend();
        let mut terrain = create_terrain();

        assert!(matches!(
            load_terrain_from_definition(&mut terrain, definition, &mut backend),
            Err(EngineError::InvalidConfig { .. })
        ));
        assert!(!is_loaded(&terrain));
        assert!(backend.vertex_buffers.is_empty());
    }

    #[test]
    fn test_layer_map_splats_and_occlusion() {
        let dir = tempfile::tempdir().unwrap();
        // 9x9 samples -> 8x8 quads, 4-quad blocks; rock covers the left half
        let mut map = image::RgbImage::new(8, 8);
        for (x, _, pixel) in map.enumerate_pixels_mut() {
            *pixel = image::Rgb([0, 0, if x < 4 { 255 } else { 0 }]);
        }
        let map_path = dir.path().join("rock.png");
        map.save(&map_path).unwrap();
        let grass = dir.path().join("grass.png");
        image::RgbImage::new(2, 2).save(&grass).unwrap();

        let mut definition = flat_definition(dir.path(), 9, 5);
        definition.textures = vec![grass, dir.path().join("missing.png")];
        definition.layers.push(crate::config::definition_data::LayerDefinition {
            texture_index: 1,
            layer_map: Some(map_path),
            ..Default::default()
        });
        let (terrain, backend) = loaded(definition);

        assert_eq!(terrain.blocks.len(), 4);
        assert!(terrain.textures[0].is_some());
        assert!(terrain.textures[1].is_none());

        // Left blocks: rock everywhere, base hidden except where the rock edge softens the filter
        let left = &terrain.blocks[0];
        assert_eq!(left.layer_usage[1], 16);
        assert!(left.splats[1].as_ref().unwrap().blend_texture.is_some());
        assert!(left.layer_usage[0] < 16);

        // Right blocks: no rock at all
        let right = &terrain.blocks[1];
        assert!(right.splats[1].is_none());
        assert_eq!(right.layer_usage[0], 16);

        // Blend textures only for the layer above the base
        assert_eq!(backend.textures.len(), 1 + 2);
    }

    #[test]
    fn test_render_culls_and_respects_layer_toggles() {
        let dir = tempfile::tempdir().unwrap();
        let (mut terrain, mut backend) = loaded(flat_definition(dir.path(), 257, 17));

        let stats = render_terrain(&terrain, &looking_at_terrain(), &mut backend);
        assert_eq!(stats.blocks_drawn + stats.blocks_culled, 256);
        assert!(stats.blocks_drawn > 0);
        assert_eq!(stats.draw_calls, stats.blocks_drawn);
        assert_eq!(stats.primitives, stats.blocks_drawn * 512);
        assert_eq!(backend.commands[0], BackendCommand::StageSetup(StageSetup::TerrainSplat));
        assert_eq!(recorded_draws(&backend).len() as u32, stats.draw_calls);

        // Facing away from the terrain
        let away = init_camera(Point3::new(-50.0, 200.0, 128.0), std::f32::consts::PI, 0.0);
        let stats = render_terrain(&terrain, &away, &mut backend);
        assert_eq!(stats.blocks_drawn, 0);

        set_layer_enabled(&mut terrain, 0, false).unwrap();
        assert!(!layer_enabled(&terrain, 0));
        let stats = render_terrain(&terrain, &looking_at_terrain(), &mut backend);
        assert!(stats.blocks_drawn > 0);
        assert_eq!(stats.draw_calls, 0);

        assert!(matches!(
            set_layer_enabled(&mut terrain, 3, true),
            Err(EngineError::LayerOutOfBounds { layer: 3, layer_count: 1 })
        ));
    }

    #[test]
    fn test_render_binds_each_layer_texture_transform() {
        let dir = tempfile::tempdir().unwrap();
        let mut map = image::RgbImage::new(8, 8);
        for (x, _, pixel) in map.enumerate_pixels_mut() {
            *pixel = image::Rgb([0, 0, if x < 4 { 255 } else { 0 }]);
        }
        let map_path = dir.path().join("rock.png");
        map.save(&map_path).unwrap();

        let mut definition = flat_definition(dir.path(), 9, 5);
        definition.layers[0].scale = [4.0, 4.0];
        definition.layers.push(crate::config::definition_data::LayerDefinition {
            texture_index: 0,
            translation: [0.5, 0.25],
            rotation: 90.0,
            scale: [2.0, 2.0],
            layer_map: Some(map_path),
        });
        let (terrain, mut backend) = loaded(definition);
        assert_ne!(terrain.layers[0].transform, terrain.layers[1].transform);

        // Just west of the 8x8 terrain, looking east and down at it
        let camera = init_camera(Point3::new(-10.0, 110.0, 4.0), 0.0, -0.6);
        let stats = render_terrain(&terrain, &camera, &mut backend);
        assert!(stats.draw_calls > 0);

        let mut ground_transform = None;
        let mut drawn_layers = Vec::new();
        for command in &backend.commands {
            match command {
                BackendCommand::SetTextureTransform { stage, transform } if *stage == GROUND_STAGE => {
                    ground_transform = *transform;
                }
                BackendCommand::DrawIndexed { indices, .. } => {
                    let layer = terrain
                        .blocks
                        .iter()
                        .find_map(|block| {
                            block
                                .splats
                                .iter()
                                .position(|splat| splat.as_ref().is_some_and(|s| s.index_buffer == *indices))
                        })
                        .unwrap();
                    assert_eq!(ground_transform, Some(terrain.layers[layer].transform));
                    drawn_layers.push(layer);
                }
                _ => {}
            }
        }
        assert!(drawn_layers.contains(&0));
        assert!(drawn_layers.contains(&1));
    }

    #[test]
    fn test_queries_and_ground_clamp() {
        let dir = tempfile::tempdir().unwrap();
        let mut definition = flat_definition(dir.path(), 9, 5);
        definition.general.scale = [2.0, 0.5, 2.0];
        let (terrain, _backend) = loaded(definition);

        assert!((terrain_height(&terrain, 5.0, 5.0, false) - 50.0).abs() < 1e-4);
        assert_eq!(terrain_height(&terrain, -1.0, 5.0, true), 0.0);
        assert!((terrain_normal(&terrain, 3, 3).y - 1.0).abs() < 1e-6);

        let below = clamp_to_ground(&terrain, Point3::new(4.0, 10.0, 4.0), Vector3::new(1.0, -5.0, 2.0), -3.0);
        assert!(below.grounded);
        assert!((below.position.y - 53.0).abs() < 1e-4);
        assert_eq!(below.velocity, Vector3::new(1.0, 0.0, 2.0));

        let above = clamp_to_ground(&terrain, Point3::new(4.0, 80.0, 4.0), Vector3::new(0.0, -5.0, 0.0), -3.0);
        assert!(!above.grounded);
        assert_eq!(above.velocity.y, -5.0);
    }

    #[test]
    fn test_camera_clamp_only_in_third_person() {
        let dir = tempfile::tempdir().unwrap();
        let (terrain, _backend) = loaded(flat_definition(dir.path(), 9, 5));
        let target = Point3::new(4.0, 100.0, 6.0);

        let first_person = init_camera(Point3::new(4.0, 0.0, 4.0), 0.0, 0.0);
        let unchanged = clamp_camera_to_ground(&terrain, &first_person, target);
        assert_eq!(unchanged.position.y, 0.0);

        let mut third_person = first_person;
        third_person.mode = CameraMode::ThirdPerson {
            target: Point3::new(0.0, 0.0, 0.0),
        };
        let clamped = clamp_camera_to_ground(&terrain, &third_person, target);
        assert!((clamped.position.y - (100.0 - third_person.volume_min_y)).abs() < 1e-4);
        assert_eq!(clamped.mode, CameraMode::ThirdPerson { target });
    }

    #[test]
    fn test_unloaded_terrain_queries() {
        let terrain = create_terrain::<RecordingBackend>();
        assert_eq!(terrain_height(&terrain, 1.0, 1.0, false), 0.0);
        assert_eq!(terrain_normal(&terrain, 0, 0), Vector3::unit_y());
        assert!(!layer_enabled(&terrain, 0));
        let mut backend = create_recording_backend();
        let camera = looking_at_terrain();
        assert_eq!(render_terrain(&terrain, &camera, &mut backend), TerrainRenderStats::default());
        assert!(backend.commands.is_empty());
    }
}
