//! Error types for asset and resource loading.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal asset-loading failures.
///
/// Every asset named by the scene is required; the application reports the
/// error and exits instead of rendering a partial scene with missing
/// textures or geometry.
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset file does not exist or cannot be accessed
    #[error("Asset not found: {0}")]
    NotFound(PathBuf),

    /// Image file exists but could not be decoded
    #[error("Failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    /// Water mesh file is malformed
    #[error("Invalid mesh file {path} (line {line}): {reason}")]
    MeshParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// I/O error while reading an asset
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl AssetError {
    /// Create a mesh-parse error with a formatted reason.
    pub fn mesh(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        Self::MeshParse {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}

/// Result type alias for asset loading.
pub type Result<T> = std::result::Result<T, AssetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = AssetError::NotFound(PathBuf::from("assets/water.obj"));
        assert!(e.to_string().contains("water.obj"));

        let e = AssetError::mesh("assets/water.obj", 12, "face index out of range");
        assert!(e.to_string().contains("line 12"));
        assert!(e.to_string().contains("face index"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let e = AssetError::Io {
            path: PathBuf::from("assets/images/tile.jpg"),
            source: io_err,
        };
        assert!(e.to_string().contains("tile.jpg"));
    }
}
