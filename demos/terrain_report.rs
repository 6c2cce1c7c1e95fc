//! Headless terrain/scene load report
//!
//! Loads a terrain definition (and optionally a JSON scene) into the recording
//! backend, renders one frame from above the terrain and prints what was built.
//!
//! Usage: cargo run --example terrain_report -- <definition.ini|toml> [scene.json]

use anyhow::{Context, Result};
use cgmath::Point3;
use splatscape::camera::{init_camera, log_camera_context};
use splatscape::renderer::recording::{clear_commands, recorded_draws};
use splatscape::scene::{load_scene, render_scene, SceneSettings};
use splatscape::terrain::{create_terrain, load_terrain, render_terrain, terrain_height};
use splatscape::create_recording_backend;
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let definition_path: PathBuf = args
        .next()
        .context("usage: terrain_report <definition.ini|toml> [scene.json]")?
        .into();
    let scene_path = args.next().map(PathBuf::from);

    let mut backend = create_recording_backend();
    let mut terrain = create_terrain();
    load_terrain(&mut terrain, &definition_path, &mut backend)
        .with_context(|| format!("loading terrain {}", definition_path.display()))?;

    println!("Terrain: {}", definition_path.display());
    println!("  blocks: {} x {}", terrain.blocks_wide, terrain.blocks_high);
    println!("  layers: {}", terrain.layers.len());
    for (layer, enabled) in terrain.layer_enabled.iter().enumerate() {
        let blocks_with_splat = terrain
            .blocks
            .iter()
            .filter(|block| block.splats.get(layer).is_some_and(Option::is_some))
            .count();
        println!("    layer {}: enabled={}, present in {} blocks", layer, enabled, blocks_with_splat);
    }
    println!(
        "  resources: {} vertex buffers, {} index buffers, {} textures",
        backend.vertex_buffers.len(),
        backend.index_buffers.len(),
        backend.textures.len()
    );

    // Look across the terrain from above its south-west corner
    let Some(heightfield) = terrain.heightfield.as_ref() else {
        anyhow::bail!("terrain reported loaded without a height field");
    };
    let centre_x = heightfield.width as f32 * heightfield.scale.x * 0.5;
    let centre_z = heightfield.height as f32 * heightfield.scale.z * 0.5;
    let ground = terrain_height(&terrain, centre_x, centre_z, false);
    let camera = init_camera(Point3::new(0.0, ground + 150.0, 0.0), std::f32::consts::FRAC_PI_4, -0.4);

    log_camera_context(&camera);

    clear_commands(&mut backend);
    let stats = render_terrain(&terrain, &camera, &mut backend);
    println!(
        "Frame: {} blocks drawn, {} culled, {} draw calls, {} primitives ({} recorded draws)",
        stats.blocks_drawn,
        stats.blocks_culled,
        stats.draw_calls,
        stats.primitives,
        recorded_draws(&backend).len()
    );

    if let Some(scene_path) = scene_path {
        let scene = load_scene(&scene_path, SceneSettings::default(), &mut backend)
            .with_context(|| format!("loading scene {}", scene_path.display()))?;
        clear_commands(&mut backend);
        let scene_stats = render_scene(&scene, &mut backend);
        println!(
            "Scene: {} lights, {} light groups, {} draw calls, {} primitives ({} recorded draws)",
            scene.lights.len(),
            scene.light_groups.len(),
            scene_stats.draw_calls,
            scene_stats.primitives,
            recorded_draws(&backend).len()
        );
    }

    Ok(())
}
