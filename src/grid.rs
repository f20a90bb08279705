// grid.rs - Depth raster storage
//
// Samples are stored row-major: index = row * width + col.
// Values are nominally in [0, 1] (0 = far, 1 = near) but are never clamped.

#[cfg(not(target_arch = "wasm32"))]
use image::{GrayImage, ImageBuffer, Luma};

use crate::error::{MeshError, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct DepthGrid {
    width: usize,
    height: usize,
    samples: Vec<f32>,
}

impl DepthGrid {
    pub fn new(width: usize, height: usize, samples: Vec<f32>) -> Result<Self> {
        if width.checked_mul(height) != Some(samples.len()) {
            // Report the extent the buffer could actually hold at this width
            let actual_height = if width == 0 { 0 } else { samples.len() / width };
            return Err(MeshError::mismatch((width, height), (width, actual_height)));
        }
        Ok(Self { width, height, samples })
    }

    /// Build from nested rows, the shape depth estimators hand back.
    /// Every row must have the same length as the first.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());

        let mut samples = Vec::with_capacity(width * height);
        for row in rows {
            if row.len() != width {
                return Err(MeshError::mismatch((width, height), (row.len(), height)));
            }
            samples.extend_from_slice(row);
        }

        Ok(Self { width, height, samples })
    }

    /// 8-bit depth raster, normalized by 255
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_luma(img: &GrayImage) -> Self {
        Self {
            width: img.width() as usize,
            height: img.height() as usize,
            samples: img.pixels().map(|p| p[0] as f32 / 255.0).collect(),
        }
    }

    /// 16-bit depth raster, normalized by 65535
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_luma16(img: &ImageBuffer<Luma<u16>, Vec<u16>>) -> Self {
        Self {
            width: img.width() as usize,
            height: img.height() as usize,
            samples: img.pixels().map(|p| p[0] as f32 / 65535.0).collect(),
        }
    }

    #[inline]
    pub fn width(&self) -> usize { self.width }

    #[inline]
    pub fn height(&self) -> usize { self.height }

    #[inline]
    pub fn samples(&self) -> &[f32] { &self.samples }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.height || col >= self.width { return None; }
        Some(self.samples[row * self.width + col])
    }

    pub fn row(&self, row: usize) -> Option<&[f32]> {
        if row >= self.height { return None; }
        let start = row * self.width;
        Some(&self.samples[start..start + self.width])
    }

    /// Fails if the declared extent disagrees with the stored one
    pub fn ensure_extent(&self, width: usize, height: usize) -> Result<()> {
        if self.width != width || self.height != height {
            return Err(MeshError::mismatch((width, height), (self.width, self.height)));
        }
        Ok(())
    }
}
