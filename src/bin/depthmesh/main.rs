// depthmesh - Turn a depth raster and its color image into a textured OBJ mesh
//
// Pipeline:
//   1. Obtain a (depth, color) pair: MiDaS over a photograph, or files on disk
//   2. Save the color image as the texture
//   3. Mesh the depth grid (one vertex per pixel, two triangles per quad)
//   4. Write .obj + .mtl referencing the texture
//
// Usage:
//   depthmesh generate <image> [--cols N --rows N] [--mesh PATH] [--texture PATH]
//   depthmesh convert <depth.png> <color.png> [--mesh PATH] [--texture PATH]
//   depthmesh display <path>

mod ai;
mod viewer;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use depthmesh::{GeneratedScene, MeshPipeline, OutputConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "depthmesh")]
#[command(about = "Depth raster + color image to textured OBJ mesh")]
#[command(version)]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate depth for a photograph and mesh it
    Generate {
        /// Source photograph
        image: PathBuf,

        /// MiDaS ONNX model
        #[arg(long, env = "DEPTHMESH_MODEL")]
        model: Option<PathBuf>,

        /// Resample to this many columns before meshing
        #[arg(long, requires = "rows")]
        cols: Option<u32>,

        /// Resample to this many rows before meshing
        #[arg(long, requires = "cols")]
        rows: Option<u32>,

        /// Open the mesh in the default viewer when done
        #[arg(long)]
        display: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Mesh an existing depth/color image pair
    Convert {
        /// Grayscale depth raster (8 or 16 bit, bright = near)
        depth: PathBuf,

        /// Color image, same size as the depth raster
        color: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Open a generated file in the default viewer
    Display {
        #[arg(default_value = "generated_model.obj")]
        path: PathBuf,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Output .obj file (material goes next to it as .mtl)
    #[arg(short, long, default_value = "generated_model.obj")]
    mesh: PathBuf,

    /// Output texture image (png, tiff or bmp)
    #[arg(short, long, default_value = "texture.png")]
    texture: PathBuf,

    /// Reference the material from the .obj (mtllib/usemtl)
    #[arg(long)]
    mtllib: bool,
}

impl OutputArgs {
    fn into_config(self) -> OutputConfig {
        OutputConfig::default()
            .with_mesh_path(self.mesh)
            .with_texture_path(self.texture)
            .with_mtllib(self.mtllib)
    }
}

/// RUST_LOG wins when set and valid; otherwise -v picks debug over info
fn log_filter(rust_log: Option<&str>, verbose: bool) -> EnvFilter {
    let fallback = if verbose { "debug" } else { "info" };
    rust_log
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref(), cli.verbose))
        .init();

    match cli.command {
        Commands::Generate { image, model, cols, rows, display, output } => {
            let model = model.unwrap_or_else(ai::default_model_path);
            let mut source = ai::MidasSource::new(model, cols.zip(rows));
            let pipeline = MeshPipeline::new(output.into_config());

            let prompt = image.to_string_lossy();
            let mesh = pipeline
                .generate_mesh(&mut source, &prompt)
                .with_context(|| format!("Failed to generate mesh from {:?}", image))?;
            tracing::info!("Done! Mesh saved as {:?}", mesh);

            if display {
                viewer::display(&mesh)?;
            }
        }

        Commands::Convert { depth, color, output } => {
            tracing::info!("Converting {:?} + {:?}", depth, color);
            let scene = GeneratedScene::open(&depth, &color)
                .with_context(|| format!("Failed to load {:?} / {:?}", depth, color))?;
            let mesh = MeshPipeline::new(output.into_config()).export(&scene)?;
            tracing::info!("Done! Mesh saved as {:?}", mesh);
        }

        Commands::Display { path } => viewer::display(&path)?,
    }

    Ok(())
}
