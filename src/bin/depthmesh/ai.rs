// ai.rs - Depth estimation collaborator (MiDaS over ONNX Runtime)
//
// Treats the prompt as a path to a photograph, estimates its depth and
// hands back the (depth, color) pair for meshing.

use anyhow::{Context, bail};
use depthmesh::{DepthColorSource, DepthGrid, GeneratedScene, MeshError};
use image::{DynamicImage, GenericImageView, imageops::FilterType};
use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};

// ImageNet normalization constants
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

const MIDAS_SIZE: u32 = 256;

pub fn default_model_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("models/midas_small.onnx")
}

pub struct MidasSource {
    model_path: PathBuf,
    /// Resample the photograph to this (cols, rows) before meshing
    target: Option<(u32, u32)>,
}

impl MidasSource {
    pub fn new(model_path: PathBuf, target: Option<(u32, u32)>) -> Self {
        Self { model_path, target }
    }
}

impl DepthColorSource for MidasSource {
    fn generate(&mut self, prompt: &str) -> depthmesh::Result<GeneratedScene> {
        let img = image::open(prompt)
            .map_err(|e| MeshError::Inference(format!("cannot open {prompt:?}: {e}")))?;

        let img = match self.target {
            Some((cols, rows)) => img.resize_exact(cols, rows, FilterType::Lanczos3),
            None => img,
        };
        let (tw, th) = img.dimensions();
        tracing::info!("Estimating depth for {} ({}x{})", prompt, tw, th);

        let depth = estimate_depth(&img, &self.model_path, tw, th);
        GeneratedScene::new(DepthGrid::from_rows(&depth)?, img.to_rgb8())
    }
}

/// Estimate depth using MiDaS model
/// Returns depth map normalized to [0, 1] where 0=far, 1=near
pub fn estimate_depth(img: &DynamicImage, model_path: &Path, tw: u32, th: u32) -> Vec<Vec<f32>> {
    if !model_path.exists() {
        tracing::warn!("MiDaS model not found at {:?}, using fallback", model_path);
        return fallback_depth(tw, th);
    }

    match run_midas(img, model_path, tw, th) {
        Ok(depth) => depth,
        Err(e) => {
            tracing::warn!("MiDaS inference failed ({:#}), using fallback", e);
            fallback_depth(tw, th)
        }
    }
}

fn run_midas(img: &DynamicImage, model_path: &Path, tw: u32, th: u32) -> anyhow::Result<Vec<Vec<f32>>> {
    let mut session = Session::builder()?
        .commit_from_file(model_path)
        .with_context(|| format!("loading {:?}", model_path))?;

    tracing::debug!("Running MiDaS...");
    let resized = img.resize_exact(MIDAS_SIZE, MIDAS_SIZE, FilterType::Lanczos3);

    // Prepare input tensor
    let mut input = Array4::<f32>::zeros((1, 3, MIDAS_SIZE as usize, MIDAS_SIZE as usize));
    for y in 0..MIDAS_SIZE {
        for x in 0..MIDAS_SIZE {
            let p = resized.get_pixel(x, y);
            for c in 0..3 {
                input[[0, c, y as usize, x as usize]] = (p[c] as f32 / 255.0 - MEAN[c]) / STD[c];
            }
        }
    }

    // Run inference
    let input_val = Value::from_array(input)?;
    let input_name = session.inputs.first().map(|i| i.name.clone()).unwrap_or_else(|| "image".into());
    let outputs = session.run(ort::inputs![input_name => input_val])?;
    let arr = outputs[0].try_extract_array::<f32>()?;

    // Extract output dimensions
    let shape = arr.shape();
    let (oh, ow) = match shape.len() {
        4 => (shape[2], shape[3]),
        3 => (shape[1], shape[2]),
        2 => (shape[0], shape[1]),
        n => bail!("unexpected MiDaS output rank {}", n),
    };
    if oh == 0 || ow == 0 {
        bail!("empty MiDaS output");
    }

    // Normalize depth values
    let flat: Vec<f32> = arr.iter().copied().collect();
    let (min_d, max_d) = flat.iter().fold((f32::MAX, f32::MIN), |(mn, mx), &v| (mn.min(v), mx.max(v)));
    let range = (max_d - min_d).max(1e-6);

    // Bilinear resize to target
    Ok(bilinear_resize(&flat, ow, oh, tw as usize, th as usize, min_d, range))
}

// Vertical gradient: top of the frame far, bottom near
fn fallback_depth(w: u32, h: u32) -> Vec<Vec<f32>> {
    (0..h as usize)
        .map(|y| vec![y as f32 / h as f32; w as usize])
        .collect()
}

fn bilinear_resize(
    src: &[f32],
    sw: usize,
    sh: usize,
    tw: usize,
    th: usize,
    min_d: f32,
    range: f32,
) -> Vec<Vec<f32>> {
    let (sx, sy) = (sw as f32 / tw as f32, sh as f32 / th as f32);
    let mut depth = vec![vec![0.0f32; tw]; th];

    for y in 0..th {
        for x in 0..tw {
            let (fx, fy) = (x as f32 * sx, y as f32 * sy);
            let (x0, y0) = ((fx as usize).min(sw - 1), (fy as usize).min(sh - 1));
            let (x1, y1) = ((x0 + 1).min(sw - 1), (y0 + 1).min(sh - 1));
            let (tx, ty) = (fx.fract(), fy.fract());

            let sample = |sx: usize, sy: usize| {
                let v = src.get(sy * sw + sx).copied().unwrap_or(0.0);
                (v - min_d) / range
            };

            depth[y][x] = sample(x0, y0) * (1.0 - tx) * (1.0 - ty)
                + sample(x1, y0) * tx * (1.0 - ty)
                + sample(x0, y1) * (1.0 - tx) * ty
                + sample(x1, y1) * tx * ty;
        }
    }

    depth
}
