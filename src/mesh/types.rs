// types.rs - Mesh data as produced by the builder and consumed by the writer

use std::path::{Path, PathBuf};

/// Name of the single material every exported mesh references
pub const MATERIAL_NAME: &str = "material_0";

/// Grid-space position: x = column, y = row, z = depth sample
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Uv {
    pub u: f32,
    pub v: f32,
}

/// Three 1-based indices into the vertex (and UV) list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Triangle(pub [u32; 3]);

/// Vertices and UVs are co-indexed: entry i of each belongs to the same
/// grid cell. Not mutable after construction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    uvs: Vec<Uv>,
    triangles: Vec<Triangle>,
}

impl Mesh {
    pub(crate) fn from_parts(vertices: Vec<Vertex>, uvs: Vec<Uv>, triangles: Vec<Triangle>) -> Self {
        debug_assert_eq!(vertices.len(), uvs.len());
        Self { vertices, uvs, triangles }
    }

    pub fn vertices(&self) -> &[Vertex] { &self.vertices }
    pub fn uvs(&self) -> &[Uv] { &self.uvs }
    pub fn triangles(&self) -> &[Triangle] { &self.triangles }

    pub fn is_empty(&self) -> bool { self.vertices.is_empty() }

    pub fn into_parts(self) -> (Vec<Vertex>, Vec<Uv>, Vec<Triangle>) {
        (self.vertices, self.uvs, self.triangles)
    }
}

/// A named material bound to an external diffuse texture
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub texture: PathBuf,
}

impl Material {
    pub fn new(texture: impl AsRef<Path>) -> Self {
        Self {
            name: MATERIAL_NAME.to_string(),
            texture: texture.as_ref().to_path_buf(),
        }
    }
}
