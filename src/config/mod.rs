/// Configuration Module
///
/// Terrain definition files (INI or TOML) and their validation.
pub mod definition_data;
pub mod definition_operations;
pub mod ini;

pub use definition_data::{GeneralSection, LayerDefinition, TerrainDefinition};
pub use definition_operations::{
    layer_section_name, load_definition, parse_definition_ini, parse_definition_toml, resolve_path,
    validate_definition,
};
