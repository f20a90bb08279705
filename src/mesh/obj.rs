// obj.rs - Wavefront OBJ + MTL output, and the PNG texture they point at
//
// Mesh file layout, in this order:
//   v <x> <y> <z>        one per vertex
//   vt <u> <v>           one per vertex, same order
//   f a/a b/b c/c        one per triangle, 1-based
//
// The material file sits next to the mesh with an .mtl extension.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[cfg(not(target_arch = "wasm32"))]
use image::{ImageError, ImageFormat, RgbImage};

use crate::error::{MeshError, Result};

use super::types::{Material, Mesh, MATERIAL_NAME};

/// Extra header lines for the mesh file
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObjOptions {
    /// Emit `mtllib` / `usemtl` so viewers pick up the texture on their own.
    /// Off by default, which keeps the file to the three plain sections.
    pub mtllib: bool,
}

/// `foo.obj` -> `foo.mtl`
pub fn material_path_for(mesh_path: &Path) -> PathBuf {
    mesh_path.with_extension("mtl")
}

/// Stream the OBJ text for `mesh`. `material_lib` adds the material header.
pub fn write_obj<W: Write>(mesh: &Mesh, mut out: W, material_lib: Option<&str>) -> io::Result<()> {
    if let Some(lib) = material_lib {
        writeln!(out, "mtllib {}", lib)?;
        writeln!(out, "usemtl {}", MATERIAL_NAME)?;
    }

    for v in mesh.vertices() {
        writeln!(out, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for t in mesh.uvs() {
        writeln!(out, "vt {} {}", t.u, t.v)?;
    }
    // Position and UV lists are co-indexed, so each index doubles as its UV index
    for f in mesh.triangles() {
        let [a, b, c] = f.0;
        writeln!(out, "f {a}/{a} {b}/{b} {c}/{c}")?;
    }

    Ok(())
}

pub fn write_mtl<W: Write>(material: &Material, mut out: W) -> io::Result<()> {
    writeln!(out, "newmtl {}", material.name)?;
    writeln!(out, "map_Kd {}", material.texture.display())?;
    Ok(())
}

/// Write `mesh` to `mesh_path` and its material to the sibling `.mtl`.
///
/// Empty meshes and colliding output paths are rejected before anything
/// touches the disk. The material file is only written once the mesh file
/// has been flushed; a failed mesh write can leave a partial `.obj` behind
/// but never a new `.mtl` next to it.
pub fn write_mesh(mesh: &Mesh, mesh_path: &Path, texture_path: &Path) -> Result<PathBuf> {
    write_mesh_with(mesh, mesh_path, texture_path, &ObjOptions::default())
}

pub fn write_mesh_with(
    mesh: &Mesh,
    mesh_path: &Path,
    texture_path: &Path,
    opts: &ObjOptions,
) -> Result<PathBuf> {
    if mesh.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    let mtl_path = check_output_paths(mesh_path, texture_path)?;
    let lib_name = mtl_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|_| opts.mtllib);

    write_file(mesh_path, |w| write_obj(mesh, w, lib_name.as_deref()))?;
    write_file(&mtl_path, |w| write_mtl(&Material::new(texture_path), w))?;

    tracing::info!(
        "Wrote {:?} ({} vertices, {} triangles) + {:?}",
        mesh_path,
        mesh.vertices().len(),
        mesh.triangles().len(),
        mtl_path
    );

    Ok(mesh_path.to_path_buf())
}

/// Mesh, material and texture must be three distinct files.
/// Returns the material path.
pub fn check_output_paths(mesh_path: &Path, texture_path: &Path) -> Result<PathBuf> {
    let mtl_path = material_path_for(mesh_path);
    if mtl_path == mesh_path || texture_path == mesh_path {
        return Err(MeshError::PathConflict { path: mesh_path.to_path_buf() });
    }
    if texture_path == mtl_path {
        return Err(MeshError::PathConflict { path: mtl_path });
    }
    Ok(mtl_path)
}

/// OBJ text for an in-memory consumer. Empty meshes are rejected, as on disk.
pub fn obj_string(mesh: &Mesh, material_lib: Option<&str>) -> Result<String> {
    if mesh.is_empty() {
        return Err(MeshError::EmptyMesh);
    }
    let mut buf = Vec::new();
    write_obj(mesh, &mut buf, material_lib).map_err(|e| MeshError::io("<memory>", e))?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn mtl_string(material: &Material) -> String {
    format!("newmtl {}\nmap_Kd {}\n", material.name, material.texture.display())
}

/// Lossless format for a texture path; no extension means PNG
#[cfg(not(target_arch = "wasm32"))]
pub fn texture_format(path: &Path) -> Result<ImageFormat> {
    if path.extension().is_none() {
        return Ok(ImageFormat::Png);
    }
    match ImageFormat::from_path(path) {
        Ok(f @ (ImageFormat::Png | ImageFormat::Tiff | ImageFormat::Bmp)) => Ok(f),
        _ => Err(MeshError::TextureFormat { path: path.to_path_buf() }),
    }
}

/// Save the color raster losslessly: PNG, TIFF or BMP by extension,
/// PNG when there is none. Lossy or unknown extensions are refused.
#[cfg(not(target_arch = "wasm32"))]
pub fn write_texture(image: &RgbImage, path: &Path) -> Result<PathBuf> {
    let format = texture_format(path)?;

    image.save_with_format(path, format).map_err(|e| match e {
        ImageError::IoError(source) => MeshError::io(path, source),
        source => MeshError::Image { path: path.to_path_buf(), source },
    })?;

    tracing::info!("Wrote texture {:?} ({}x{})", path, image.width(), image.height());
    Ok(path.to_path_buf())
}

fn write_file(path: &Path, body: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>) -> Result<()> {
    let file = File::create(path).map_err(|e| MeshError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    body(&mut writer)
        .and_then(|_| writer.flush())
        .map_err(|e| MeshError::io(path, e))
}
