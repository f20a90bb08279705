// pipeline.rs - Prompt -> depth/color pair -> textured mesh on disk
//
// The depth/color generator is injected by the caller; this module owns no
// model handle of its own.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageError, RgbImage};

use crate::error::{MeshError, Result};
use crate::grid::DepthGrid;
use crate::mesh::{self, ObjOptions};

const DEFAULT_MESH_PATH: &str = "generated_model.obj";
const DEFAULT_TEXTURE_PATH: &str = "texture.png";

/// Anything that can turn a prompt into a same-size depth grid and color image
pub trait DepthColorSource {
    fn generate(&mut self, prompt: &str) -> Result<GeneratedScene>;
}

impl<F> DepthColorSource for F
where
    F: FnMut(&str) -> Result<GeneratedScene>,
{
    fn generate(&mut self, prompt: &str) -> Result<GeneratedScene> {
        self(prompt)
    }
}

/// A depth grid and the color image that textures it
#[derive(Clone, Debug)]
pub struct GeneratedScene {
    depth: DepthGrid,
    color: RgbImage,
}

impl GeneratedScene {
    pub fn new(depth: DepthGrid, color: RgbImage) -> Result<Self> {
        depth.ensure_extent(color.width() as usize, color.height() as usize)?;
        Ok(Self { depth, color })
    }

    /// Load a depth raster (8 or 16 bit grayscale) and its color image
    pub fn open(depth_path: &Path, color_path: &Path) -> Result<Self> {
        let depth = match open_image(depth_path)? {
            DynamicImage::ImageLuma16(img) => DepthGrid::from_luma16(&img),
            other => DepthGrid::from_luma(&other.to_luma8()),
        };
        let color = open_image(color_path)?.to_rgb8();
        Self::new(depth, color)
    }

    pub fn depth(&self) -> &DepthGrid { &self.depth }
    pub fn color(&self) -> &RgbImage { &self.color }
    pub fn width(&self) -> usize { self.depth.width() }
    pub fn height(&self) -> usize { self.depth.height() }
}

/// Where the three output files go
#[derive(Clone, Debug, PartialEq)]
pub struct OutputConfig {
    pub mesh_path: PathBuf,
    pub texture_path: PathBuf,
    pub obj: ObjOptions,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mesh_path: PathBuf::from(DEFAULT_MESH_PATH),
            texture_path: PathBuf::from(DEFAULT_TEXTURE_PATH),
            obj: ObjOptions::default(),
        }
    }
}

impl OutputConfig {
    pub fn with_mesh_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.mesh_path = path.into();
        self
    }

    pub fn with_texture_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.texture_path = path.into();
        self
    }

    pub fn with_mtllib(mut self, mtllib: bool) -> Self {
        self.obj.mtllib = mtllib;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct MeshPipeline {
    config: OutputConfig,
}

impl MeshPipeline {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OutputConfig { &self.config }

    /// Ask `source` for a depth/color pair and export it. Returns the mesh path.
    pub fn generate_mesh<S>(&self, source: &mut S, prompt: &str) -> Result<PathBuf>
    where
        S: DepthColorSource + ?Sized,
    {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(MeshError::EmptyPrompt);
        }

        tracing::debug!("Generating depth/color for {:?}", prompt);
        let scene = source.generate(prompt)?;
        self.export(&scene)
    }

    /// Write texture, mesh and material for an already generated scene.
    ///
    /// Meshing and output path checks run before any file is created, so a
    /// bad grid or a clashing/lossy path leaves the output directory untouched.
    pub fn export(&self, scene: &GeneratedScene) -> Result<PathBuf> {
        let (w, h) = (scene.width(), scene.height());

        #[cfg(feature = "parallel")]
        let mesh = mesh::build_parallel(scene.depth(), w, h)?;
        #[cfg(not(feature = "parallel"))]
        let mesh = mesh::build(scene.depth(), w, h)?;

        if mesh.is_empty() {
            return Err(MeshError::EmptyMesh);
        }
        mesh::check_output_paths(&self.config.mesh_path, &self.config.texture_path)?;
        mesh::texture_format(&self.config.texture_path)?;

        let texture = mesh::write_texture(scene.color(), &self.config.texture_path)?;
        mesh::write_mesh_with(&mesh, &self.config.mesh_path, &texture, &self.config.obj)
    }
}

fn open_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|e| match e {
        ImageError::IoError(source) => MeshError::io(path, source),
        source => MeshError::Image { path: path.to_path_buf(), source },
    })
}
