//! Comprehensive error handling for splatscape
//!
//! This module provides a unified error type for terrain, scene and backend
//! operations. Library code never panics; every fallible path returns
//! `EngineResult` and propagates with `?`.

use std::error::Error as StdError;
use std::fmt;

/// Main error type for splatscape
#[derive(Debug)]
pub enum EngineError {
    // Resource Errors
    BufferCreationFailed {
        label: String,
        size: usize,
        error: String,
    },
    TextureCreationFailed {
        label: String,
        width: u32,
        height: u32,
        error: String,
    },
    IndexOverflow {
        index: u32,
        max: u32,
    },

    // Terrain Errors
    HeightMapTooShort {
        path: String,
        expected: usize,
        found: usize,
    },
    LayerOutOfBounds {
        layer: usize,
        layer_count: usize,
    },

    // Scene Errors
    SceneLoadFailed {
        path: String,
        reason: String,
    },

    // Configuration Errors
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },
    MissingConfig {
        field: String,
    },

    // System Errors
    IoError {
        path: String,
        error: String,
    },
    ImageError {
        path: String,
        error: String,
    },
    ParseError {
        value: String,
        expected_type: String,
    },
    StateError {
        expected: String,
        actual: String,
    },
    ResourceNotFound {
        resource_type: String,
        id: String,
    },

    // Device Errors
    DeviceLost,
    DeviceResetFailed {
        error: String,
    },

    // Generic fallback for unexpected errors
    Internal {
        message: String,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::BufferCreationFailed { label, size, error } => write!(
                f,
                "Buffer creation failed for {} ({} bytes): {}",
                label, size, error
            ),
            EngineError::TextureCreationFailed {
                label,
                width,
                height,
                error,
            } => write!(
                f,
                "Texture creation failed for {} ({}x{}): {}",
                label, width, height, error
            ),
            EngineError::IndexOverflow { index, max } => {
                write!(f, "Index {} exceeds 16-bit index limit {}", index, max)
            }

            EngineError::HeightMapTooShort {
                path,
                expected,
                found,
            } => write!(
                f,
                "Height map {} too short: expected {} bytes, found {}",
                path, expected, found
            ),
            EngineError::LayerOutOfBounds { layer, layer_count } => write!(
                f,
                "Layer {} out of bounds for layer count {}",
                layer, layer_count
            ),

            EngineError::SceneLoadFailed { path, reason } => {
                write!(f, "Scene load failed for {}: {}", path, reason)
            }

            EngineError::InvalidConfig {
                field,
                value,
                reason,
            } => write!(f, "Invalid config: {} = {} ({})", field, value, reason),
            EngineError::MissingConfig { field } => write!(f, "Missing required config: {}", field),

            EngineError::IoError { path, error } => write!(f, "IO error for {}: {}", path, error),
            EngineError::ImageError { path, error } => {
                write!(f, "Image error for {}: {}", path, error)
            }
            EngineError::ParseError {
                value,
                expected_type,
            } => write!(
                f,
                "Parse error: '{}' is not a valid {}",
                value, expected_type
            ),
            EngineError::StateError { expected, actual } => {
                write!(f, "State error: expected {}, actual {}", expected, actual)
            }
            EngineError::ResourceNotFound { resource_type, id } => {
                write!(f, "Resource not found: {} '{}'", resource_type, id)
            }

            EngineError::DeviceLost => write!(f, "Render device lost"),
            EngineError::DeviceResetFailed { error } => {
                write!(f, "Render device reset failed: {}", error)
            }

            EngineError::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl StdError for EngineError {}

/// Type alias for Results in splatscape
pub type EngineResult<T> = Result<T, EngineError>;

// Conversion traits for common error types

impl From<std::io::Error> for EngineError {
    fn from(error: std::io::Error) -> Self {
        EngineError::IoError {
            path: String::new(),
            error: error.to_string(),
        }
    }
}

impl From<image::ImageError> for EngineError {
    fn from(error: image::ImageError) -> Self {
        EngineError::ImageError {
            path: String::new(),
            error: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(error: toml::de::Error) -> Self {
        EngineError::ParseError {
            value: error.message().to_string(),
            expected_type: "terrain definition (toml)".to_string(),
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(error: serde_json::Error) -> Self {
        EngineError::ParseError {
            value: error.to_string(),
            expected_type: "scene description (json)".to_string(),
        }
    }
}

// Helper functions for common error patterns

/// Convert Option to Result with context
pub trait OptionExt<T> {
    fn ok_or_engine<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> EngineError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_engine<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> EngineError,
    {
        self.ok_or_else(f)
    }
}

/// Extension trait for attaching a file path to IO-flavoured errors
pub trait ErrorContext<T> {
    fn with_path(self, path: &std::path::Path) -> EngineResult<T>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: Into<EngineError>,
{
    fn with_path(self, path: &std::path::Path) -> EngineResult<T> {
        let path = path.display().to_string();
        self.map_err(|e| match e.into() {
            EngineError::IoError { error, .. } => EngineError::IoError { path, error },
            EngineError::ImageError { error, .. } => EngineError::ImageError { path, error },
            other => other,
        })
    }
}
