//! Terrain definition operations - Pure DOP functions
//!
//! Parse INI or TOML definitions, resolve file names and validate the result
//! before any terrain data is touched.

use super::definition_data::{LayerDefinition, TerrainDefinition};
use super::ini::{ini_get, parse_ini, IniDocument};
use crate::constants::gpu_limits::MAX_BLOCK_VERTICES;
use crate::error::{EngineError, EngineResult, ErrorContext};
use std::path::{Path, PathBuf};
use std::str::FromStr;

// ============================================================================
// VALUE PARSING
// ============================================================================

fn parse_value<T: FromStr>(value: &str, expected_type: &str) -> EngineResult<T> {
    value.trim().parse().map_err(|_| EngineError::ParseError {
        value: value.to_string(),
        expected_type: expected_type.to_string(),
    })
}

/// Parse `"a, b, c"` into exactly `N` values
fn parse_list<T: FromStr + Copy + Default, const N: usize>(value: &str, expected_type: &str) -> EngineResult<[T; N]> {
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() != N {
        return Err(EngineError::ParseError {
            value: value.to_string(),
            expected_type: format!("{} comma-separated {}", N, expected_type),
        });
    }

    let mut out = [T::default(); N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = parse_value(part, expected_type)?;
    }
    Ok(out)
}

fn read_value<T: FromStr>(doc: &IniDocument, section: &str, key: &str, default: T, expected: &str) -> EngineResult<T> {
    match ini_get(doc, section, key) {
        Some(value) => parse_value(value, expected),
        None => Ok(default),
    }
}

fn read_list<T: FromStr + Copy + Default, const N: usize>(
    doc: &IniDocument,
    section: &str,
    key: &str,
    default: [T; N],
    expected: &str,
) -> EngineResult<[T; N]> {
    match ini_get(doc, section, key) {
        Some(value) => parse_list(value, expected),
        None => Ok(default),
    }
}

fn read_path(doc: &IniDocument, section: &str, key: &str) -> Option<PathBuf> {
    ini_get(doc, section, key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Section name of layer `index` (`Base Layer`, `Layer 1`, ...)
pub fn layer_section_name(index: usize) -> String {
    if index == 0 {
        "Base Layer".to_string()
    } else {
        format!("Layer {}", index)
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Parse an INI terrain definition
pub fn parse_definition_ini(text: &str) -> EngineResult<TerrainDefinition> {
    let doc = parse_ini(text);
    let mut definition = TerrainDefinition::default();

    let general = &mut definition.general;
    general.heightmap = read_path(&doc, "General", "Heightmap").unwrap_or_default();
    general.scale = read_list(&doc, "General", "Scale", general.scale, "number")?;
    general.terrain_size = read_list(&doc, "General", "TerrainSize", general.terrain_size, "integer")?;
    general.block_size = read_list(&doc, "General", "BlockSize", general.block_size, "integer")?;
    general.blend_tex_ratio = read_value(&doc, "General", "BlendTexRatio", general.blend_tex_ratio, "integer")?;

    let texture_count: usize = read_value(&doc, "Textures", "TextureCount", 0, "integer")?;
    definition.textures = (0..texture_count)
        .map(|i| read_path(&doc, "Textures", &format!("Texture[{}]", i)).unwrap_or_default())
        .collect();

    let layer_count: usize = read_value(&doc, "General", "LayerCount", 1, "integer")?;
    definition.layers = (0..layer_count)
        .map(|i| -> EngineResult<LayerDefinition> {
            let section = layer_section_name(i);
            let defaults = LayerDefinition::default();
            Ok(LayerDefinition {
                texture_index: read_value(&doc, &section, "TextureIndex", defaults.texture_index, "integer")?,
                translation: read_list(&doc, &section, "Translation", defaults.translation, "number")?,
                rotation: read_value(&doc, &section, "Rotation", defaults.rotation, "number")?,
                scale: read_list(&doc, &section, "Scale", defaults.scale, "number")?,
                layer_map: read_path(&doc, &section, "LayerMap"),
            })
        })
        .collect::<EngineResult<Vec<_>>>()?;

    Ok(definition)
}

/// Parse a TOML terrain definition with the same structure
pub fn parse_definition_toml(text: &str) -> EngineResult<TerrainDefinition> {
    Ok(toml::from_str(text)?)
}

/// Absolute paths are kept; relative ones are joined onto `base_dir`
pub fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || path.as_os_str().is_empty() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn resolve_paths(definition: &mut TerrainDefinition, base_dir: &Path) {
    definition.general.heightmap = resolve_path(base_dir, &definition.general.heightmap);
    for texture in &mut definition.textures {
        *texture = resolve_path(base_dir, texture);
    }
    for layer in &mut definition.layers {
        if let Some(map) = layer.layer_map.as_mut() {
            *map = resolve_path(base_dir, map);
        }
    }
}

/// Read, parse (TOML by extension, INI otherwise), resolve and validate a definition
pub fn load_definition(path: &Path) -> EngineResult<TerrainDefinition> {
    let text = std::fs::read_to_string(path).with_path(path)?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let mut definition = if is_toml {
        parse_definition_toml(&text)?
    } else {
        parse_definition_ini(&text)?
    };

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    resolve_paths(&mut definition, base_dir);
    validate_definition(&definition)?;

    log::info!(
        "[definition_operations::load_definition] {} ({}): {}x{} samples, {}x{} blocks, {} textures, {} layers",
        path.display(),
        if is_toml { "toml" } else { "ini" },
        definition.general.terrain_size[0],
        definition.general.terrain_size[1],
        definition.general.block_size[0],
        definition.general.block_size[1],
        definition.textures.len(),
        definition.layers.len()
    );
    Ok(definition)
}

// ============================================================================
// VALIDATION
// ============================================================================

fn invalid(field: &str, value: impl ToString, reason: &str) -> EngineError {
    EngineError::InvalidConfig {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_definition(definition: &TerrainDefinition) -> EngineResult<()> {
    let general = &definition.general;
    let [width, height] = general.terrain_size;
    let [block_width, block_height] = general.block_size;

    if general.heightmap.as_os_str().is_empty() {
        return Err(EngineError::MissingConfig {
            field: "General.Heightmap".to_string(),
        });
    }
    if width < 2 || height < 2 {
        return Err(invalid("General.TerrainSize", format!("{}, {}", width, height), "must be at least 2x2"));
    }
    if block_width < 2 || block_height < 2 {
        return Err(invalid("General.BlockSize", format!("{}, {}", block_width, block_height), "must be at least 2x2"));
    }
    if block_width > width || block_height > height {
        return Err(invalid(
            "General.BlockSize",
            format!("{}, {}", block_width, block_height),
            "larger than the terrain",
        ));
    }
    if block_width as u64 * block_height as u64 > MAX_BLOCK_VERTICES as u64 {
        return Err(invalid(
            "General.BlockSize",
            format!("{}, {}", block_width, block_height),
            "too many vertices for 16-bit indices",
        ));
    }
    if width.checked_mul(height).is_none() {
        return Err(invalid("General.TerrainSize", format!("{}, {}", width, height), "too many samples"));
    }
    let ratio = general.blend_tex_ratio;
    if ratio == 0 {
        return Err(invalid("General.BlendTexRatio", 0, "must be at least 1"));
    }
    // Opacity texels are addressed with u32 indices over the whole blend grid
    let texel_count = (width - 1)
        .checked_mul(ratio)
        .zip((height - 1).checked_mul(ratio))
        .and_then(|(texels_wide, texels_high)| texels_wide.checked_mul(texels_high));
    if texel_count.is_none() {
        return Err(invalid("General.BlendTexRatio", ratio, "blend texture grid too large for the terrain size"));
    }
    if definition.layers.is_empty() {
        return Err(invalid("General.LayerCount", 0, "at least the base layer is required"));
    }

    for (index, layer) in definition.layers.iter().enumerate() {
        let section = layer_section_name(index);
        if !definition.textures.is_empty() && layer.texture_index >= definition.textures.len() {
            return Err(invalid(
                &format!("{}.TextureIndex", section),
                layer.texture_index,
                "outside the texture list",
            ));
        }
        if index > 0 && layer.layer_map.is_none() {
            return Err(EngineError::MissingConfig {
                field: format!("{}.LayerMap", section),
            });
        }
    }

    Ok(())
}
