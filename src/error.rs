// error.rs - Failure modes of mesh generation
//
// Nothing here is retried internally. Callers decide whether a failed
// export is worth another attempt.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeshError {
    /// Grid extents disagree with the declared width/height, or the depth
    /// and color rasters differ in size. Raised before any file is written.
    #[error("dimension mismatch: expected {expected_width}x{expected_height}, got {actual_width}x{actual_height}")]
    DimensionMismatch {
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },

    /// More vertices than 1-based `u32` face indices can address
    #[error("grid {width}x{height} is too large to index")]
    GridTooLarge { width: usize, height: usize },

    #[error("I/O error on {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Two of the mesh, material and texture outputs resolve to one file
    #[error("output path {path:?} is used for more than one file")]
    PathConflict { path: PathBuf },

    /// Texture extension names a lossy or unknown image format
    #[error("texture {path:?} must be png, tiff or bmp")]
    TextureFormat { path: PathBuf },

    /// A mesh with zero vertices is rejected rather than written.
    #[error("mesh has no vertices")]
    EmptyMesh,

    #[cfg(not(target_arch = "wasm32"))]
    #[error("image error for {path:?}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("depth/color generation failed: {0}")]
    Inference(String),

    #[error("prompt is empty")]
    EmptyPrompt,
}

impl MeshError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn mismatch(expected: (usize, usize), actual: (usize, usize)) -> Self {
        Self::DimensionMismatch {
            expected_width: expected.0,
            expected_height: expected.1,
            actual_width: actual.0,
            actual_height: actual.1,
        }
    }
}

pub type Result<T> = std::result::Result<T, MeshError>;
