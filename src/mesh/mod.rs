// mesh/ - Depth grid to textured triangle mesh
//
// builder: grid -> vertices, UVs, triangles (pure)
// obj:     mesh -> .obj + .mtl files, color raster -> texture

mod builder;
mod obj;
mod types;

pub use builder::*;
pub use obj::*;
pub use types::*;
