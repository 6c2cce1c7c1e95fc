/// Scene Module - Data-Oriented Programming (DOP) style
///
/// Static scene batching by light set, texture and material:
/// - scene_data.rs: input object model (entities, materials, textures, meshes)
/// - light_group_data.rs: batch tree data
/// - lighting_operations.rs / light_group_operations.rs: pure functions
pub mod error;
pub mod light_group_data;
pub mod light_group_operations;
pub mod lighting_operations;
pub mod scene_data;
pub mod scene_io;

pub use error::SceneError;
pub use light_group_data::{
    LightGroup, LightKind, Material, MaterialGroup, PropertyGroup, SceneData, SceneLight, SceneRenderStats,
    SceneSettings,
};
pub use light_group_operations::{
    animate_scene, assign_light_groups, batch_surfaces, build_scene, build_scene_buffers,
    find_or_create_light_group, group_matches, load_scene, release_scene, render_scene,
    triangulate_indices,
};
pub use lighting_operations::{light_contribution, process_entities, process_materials, select_lights};
pub use scene_data::{PrimitiveLayout, SceneFile, SurfaceDesc};
pub use scene_io::{load_scene_file, parse_scene_json, validate_scene_file};
