/// Scene import errors
///
/// Everything that can go wrong between reading a scene file and handing a
/// validated `SceneFile` to the batcher. At the crate boundary all of these
/// collapse into `EngineError::SceneLoadFailed`.
use crate::error::EngineError;

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("Scene could not be parsed: {0}")]
    Parse(String),

    #[error("Mesh {mesh} surface {surface} references missing {kind} {index}")]
    InvalidReference {
        mesh: usize,
        surface: usize,
        kind: &'static str,
        index: usize,
    },

    #[error("Mesh {mesh} surface {surface} index {index} is outside its {vertex_count} vertices")]
    IndexOutOfRange {
        mesh: usize,
        surface: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("Mesh {mesh} surface {surface} has {vertex_count} vertices, more than a 16-bit index can address")]
    TooManyVertices {
        mesh: usize,
        surface: usize,
        vertex_count: usize,
    },
}

impl From<serde_json::Error> for SceneError {
    fn from(error: serde_json::Error) -> Self {
        SceneError::Parse(error.to_string())
    }
}

impl From<SceneError> for EngineError {
    fn from(error: SceneError) -> Self {
        EngineError::SceneLoadFailed {
            path: "<memory>".to_string(),
            reason: error.to_string(),
        }
    }
}

/// Wrap any import failure as a single scene-load failure for `path`
pub fn scene_load_failed(path: &std::path::Path, error: impl std::fmt::Display) -> EngineError {
    EngineError::SceneLoadFailed {
        path: path.display().to_string(),
        reason: error.to_string(),
    }
}
