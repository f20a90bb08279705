// builder.rs - Depth grid to vertices, UVs and triangles
//
// One vertex per grid cell, emitted row-major. Each interior quad is split
// along the same diagonal:
//
//   i+1 ---- i+2
//    |     /  |
//    |   /    |
//   i+w+1 -- i+w+2
//
// The triangulation does not adapt to the local depth curvature.

use crate::error::{MeshError, Result};
use crate::grid::DepthGrid;

use super::types::{Mesh, Triangle, Uv, Vertex};

/// Build the mesh for a `width` x `height` depth grid.
///
/// Fails with `DimensionMismatch` if the grid is not exactly that size.
/// Grids narrower or shorter than 2 cells produce vertices and UVs but
/// no triangles.
pub fn build(grid: &DepthGrid, width: usize, height: usize) -> Result<Mesh> {
    grid.ensure_extent(width, height)?;
    check_addressable(width, height)?;

    let count = width * height;
    let depth = grid.samples();
    let mut vertices = Vec::with_capacity(count);
    let mut uvs = Vec::with_capacity(count);

    for y in 0..height {
        for x in 0..width {
            vertices.push(vertex_at(x, y, depth[y * width + x]));
            uvs.push(uv_at(x, y, width, height));
        }
    }

    let mut triangles = Vec::with_capacity(triangle_count(width, height));
    for y in 0..height.saturating_sub(1) {
        for x in 0..width.saturating_sub(1) {
            triangles.extend(quad_triangles(x, y, width));
        }
    }

    tracing::debug!(
        "Built mesh: {} vertices, {} triangles from {}x{} grid",
        vertices.len(), triangles.len(), width, height
    );

    Ok(Mesh::from_parts(vertices, uvs, triangles))
}

/// Same output as [`build`], with rows filled in parallel.
///
/// Each row owns a disjoint chunk of the preallocated outputs, so ordering
/// and index values match the sequential build exactly.
#[cfg(feature = "parallel")]
pub fn build_parallel(grid: &DepthGrid, width: usize, height: usize) -> Result<Mesh> {
    use rayon::prelude::*;

    grid.ensure_extent(width, height)?;
    check_addressable(width, height)?;

    let count = width * height;
    let mut vertices = vec![Vertex::default(); count];
    let mut uvs = vec![Uv::default(); count];

    if width > 0 {
        vertices
            .par_chunks_mut(width)
            .zip(uvs.par_chunks_mut(width))
            .zip(grid.samples().par_chunks(width))
            .enumerate()
            .for_each(|(y, ((vrow, uvrow), depth))| {
                for x in 0..width {
                    vrow[x] = vertex_at(x, y, depth[x]);
                    uvrow[x] = uv_at(x, y, width, height);
                }
            });
    }

    let quads = width.saturating_sub(1);
    let mut triangles = vec![Triangle([0; 3]); triangle_count(width, height)];

    if quads > 0 {
        triangles
            .par_chunks_mut(2 * quads)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..quads {
                    let [a, b] = quad_triangles(x, y, width);
                    row[2 * x] = a;
                    row[2 * x + 1] = b;
                }
            });
    }

    Ok(Mesh::from_parts(vertices, uvs, triangles))
}

/// 2 * (w-1) * (h-1), or 0 for degenerate grids
#[inline]
pub fn triangle_count(width: usize, height: usize) -> usize {
    2 * width.saturating_sub(1) * height.saturating_sub(1)
}

#[inline]
fn vertex_at(x: usize, y: usize, z: f32) -> Vertex {
    Vertex { x: x as f32, y: y as f32, z }
}

// v is not flipped: the top raster row maps to v = 0
#[inline]
fn uv_at(x: usize, y: usize, width: usize, height: usize) -> Uv {
    Uv { u: x as f32 / width as f32, v: y as f32 / height as f32 }
}

#[inline]
fn quad_triangles(x: usize, y: usize, width: usize) -> [Triangle; 2] {
    let i = (y * width + x) as u32;
    let w = width as u32;
    [
        Triangle([i + 1, i + 2, i + w + 1]),
        Triangle([i + 2, i + w + 2, i + w + 1]),
    ]
}

fn check_addressable(width: usize, height: usize) -> Result<()> {
    match width.checked_mul(height) {
        Some(n) if n <= u32::MAX as usize - 1 => Ok(()),
        _ => Err(MeshError::GridTooLarge { width, height }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(width: usize, height: usize) -> DepthGrid {
        DepthGrid::new(width, height, vec![0.0; width * height]).unwrap()
    }

    fn ramp(width: usize, height: usize) -> DepthGrid {
        let samples = (0..width * height).map(|i| i as f32 / 10.0).collect();
        DepthGrid::new(width, height, samples).unwrap()
    }

    #[test]
    fn two_by_two_flat_grid() {
        let mesh = build(&flat(2, 2), 2, 2).unwrap();

        let positions: Vec<_> = mesh.vertices().iter().map(|v| (v.x, v.y, v.z)).collect();
        assert_eq!(positions, vec![(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0), (1.0, 1.0, 0.0)]);

        let uvs: Vec<_> = mesh.uvs().iter().map(|t| (t.u, t.v)).collect();
        assert_eq!(uvs, vec![(0.0, 0.0), (0.5, 0.0), (0.0, 0.5), (0.5, 0.5)]);

        assert_eq!(mesh.triangles(), &[Triangle([1, 2, 3]), Triangle([2, 4, 3])]);
    }

    #[test]
    fn counts_follow_grid_size() {
        for &(w, h) in &[(2, 2), (3, 2), (2, 5), (7, 4), (16, 9)] {
            let mesh = build(&ramp(w, h), w, h).unwrap();
            assert_eq!(mesh.vertices().len(), w * h);
            assert_eq!(mesh.uvs().len(), w * h);
            assert_eq!(mesh.triangles().len(), 2 * (w - 1) * (h - 1));
        }
    }

    #[test]
    fn indices_stay_in_range() {
        let (w, h) = (6, 5);
        let mesh = build(&ramp(w, h), w, h).unwrap();
        let max = (w * h) as u32;
        for t in mesh.triangles() {
            assert!(t.0.iter().all(|&i| i >= 1 && i <= max), "{:?}", t);
        }
    }

    #[test]
    fn uvs_are_exact_ratios() {
        let (w, h) = (5, 3);
        let mesh = build(&ramp(w, h), w, h).unwrap();
        for row in 0..h {
            for col in 0..w {
                let uv = mesh.uvs()[row * w + col];
                assert_eq!(uv.u, col as f32 / w as f32);
                assert_eq!(uv.v, row as f32 / h as f32);
            }
        }
    }

    #[test]
    fn depth_lands_in_z() {
        let grid = DepthGrid::from_rows(&[vec![0.1, 0.2], vec![0.3, 1.5]]).unwrap();
        let mesh = build(&grid, 2, 2).unwrap();
        let z: Vec<f32> = mesh.vertices().iter().map(|v| v.z).collect();
        assert_eq!(z, vec![0.1, 0.2, 0.3, 1.5]);
    }

    #[test]
    fn second_row_uses_width_offset() {
        let mesh = build(&flat(3, 3), 3, 3).unwrap();
        // quad at row 1, col 1 -> idx 4
        assert_eq!(mesh.triangles()[6], Triangle([5, 6, 8]));
        assert_eq!(mesh.triangles()[7], Triangle([6, 9, 8]));
    }

    #[test]
    fn degenerate_grids_have_no_triangles() {
        let row = build(&ramp(4, 1), 4, 1).unwrap();
        assert_eq!(row.vertices().len(), 4);
        assert_eq!(row.uvs().len(), 4);
        assert!(row.triangles().is_empty());

        let column = build(&ramp(1, 3), 1, 3).unwrap();
        assert_eq!(column.vertices().len(), 3);
        assert!(column.triangles().is_empty());
    }

    #[test]
    fn rejects_mismatched_extent() {
        let err = build(&flat(3, 2), 2, 3).unwrap_err();
        assert!(matches!(err, MeshError::DimensionMismatch { .. }));
    }

    #[test]
    fn repeated_builds_are_identical() {
        let grid = ramp(8, 6);
        assert_eq!(build(&grid, 8, 6).unwrap(), build(&grid, 8, 6).unwrap());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_build_matches_sequential() {
        for &(w, h) in &[(1, 1), (1, 4), (4, 1), (2, 2), (33, 17)] {
            let grid = ramp(w, h);
            assert_eq!(build_parallel(&grid, w, h).unwrap(), build(&grid, w, h).unwrap());
        }
    }
}
