/// Terrain Module - Data-Oriented Programming (DOP) style
///
/// Height field, ground-cover layers and splatted terrain blocks:
/// - *_data.rs: pure data structures
/// - *_operations.rs: pure functions over that data
pub mod block_data;
pub mod block_operations;
pub mod heightfield_data;
pub mod heightfield_operations;
pub mod layer_data;
pub mod layer_operations;
pub mod terrain_data;
pub mod terrain_operations;

pub use block_data::{BlockLayout, SplatLevel, TerrainBlock};
pub use block_operations::{
    block_neighbours, build_blend_texels, build_block_vertices, build_splat_indices, count_layer_usage,
    generate_block, render_block, vertex_diffuse,
};
pub use heightfield_data::HeightFieldData;
pub use heightfield_operations::{box_filter, height_at, heightfield_from_samples, load_heightfield, normal_at};
pub use layer_data::TerrainLayer;
pub use layer_operations::{
    apply_occlusion, build_layers, build_texture_transform, clamp_opacity, filtered_alpha, load_layer_map,
};
pub use terrain_data::{GroundClamp, TerrainData, TerrainRenderStats};
pub use terrain_operations::{
    clamp_camera_to_ground, clamp_to_ground, create_terrain, is_loaded, layer_enabled, load_terrain,
    load_terrain_from_definition, release_terrain, render_terrain, set_layer_enabled, terrain_height,
    terrain_normal,
};
