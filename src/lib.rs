use wasm_bindgen::prelude::*;

// ============================================================================
// DEPTHMESH - Depth raster + color image -> textured OBJ mesh
// ============================================================================

pub mod error;
pub mod grid;
pub mod mesh;

#[cfg(not(target_arch = "wasm32"))]
pub mod pipeline;

pub use error::{MeshError, Result};
pub use grid::DepthGrid;
pub use mesh::{Material, Mesh, ObjOptions, Triangle, Uv, Vertex};

#[cfg(not(target_arch = "wasm32"))]
pub use pipeline::{DepthColorSource, GeneratedScene, MeshPipeline, OutputConfig};

// ============================================================================
// Browser surface: mesh a depth buffer without touching the filesystem
// ============================================================================

#[wasm_bindgen]
pub struct DepthMesh {
    mesh: Mesh,
}

#[wasm_bindgen]
impl DepthMesh {
    /// `depth` is row-major, `width * height` samples long
    #[wasm_bindgen(constructor)]
    pub fn new(depth: &[f32], width: u32, height: u32) -> std::result::Result<DepthMesh, JsError> {
        let (w, h) = (width as usize, height as usize);
        let grid = DepthGrid::new(w, h, depth.to_vec())?;
        let mesh = mesh::build(&grid, w, h)?;
        Ok(Self { mesh })
    }

    pub fn vertex_count(&self) -> usize { self.mesh.vertices().len() }
    pub fn triangle_count(&self) -> usize { self.mesh.triangles().len() }

    /// xyz triples
    pub fn positions(&self) -> js_sys::Float32Array {
        let flat: Vec<f32> = self.mesh.vertices().iter().flat_map(|v| [v.x, v.y, v.z]).collect();
        js_sys::Float32Array::from(flat.as_slice())
    }

    /// uv pairs
    pub fn uvs(&self) -> js_sys::Float32Array {
        let flat: Vec<f32> = self.mesh.uvs().iter().flat_map(|t| [t.u, t.v]).collect();
        js_sys::Float32Array::from(flat.as_slice())
    }

    /// 1-based, as written to OBJ. Subtract 1 for GPU index buffers.
    pub fn indices(&self) -> js_sys::Uint32Array {
        let flat: Vec<u32> = self.mesh.triangles().iter().flat_map(|t| t.0).collect();
        js_sys::Uint32Array::from(flat.as_slice())
    }

    /// OBJ text; `mtllib` names the material file to reference, if any
    pub fn to_obj(&self, mtllib: Option<String>) -> std::result::Result<String, JsError> {
        Ok(mesh::obj_string(&self.mesh, mtllib.as_deref())?)
    }

    pub fn to_mtl(&self, texture: &str) -> String {
        mesh::mtl_string(&Material::new(texture))
    }
}
