// End-to-end: depth/color pair on disk -> .obj + .mtl + texture

use depthmesh::mesh::{self, ObjOptions};
use depthmesh::{DepthGrid, GeneratedScene, MeshError, MeshPipeline, OutputConfig};
use image::{GrayImage, Rgb, RgbImage};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn parse_faces(obj: &str) -> Vec<[u32; 3]> {
    obj.lines()
        .filter_map(|l| l.strip_prefix("f "))
        .map(|rest| {
            let idx: Vec<u32> = rest
                .split_whitespace()
                .map(|corner| {
                    let (v, t) = corner.split_once('/').unwrap();
                    assert_eq!(v, t, "position and uv index must match");
                    v.parse().unwrap()
                })
                .collect();
            [idx[0], idx[1], idx[2]]
        })
        .collect()
}

#[test]
fn flat_two_by_two_round_trip() {
    let dir = tempdir().unwrap();
    let config = OutputConfig::default()
        .with_mesh_path(dir.path().join("foo.obj"))
        .with_texture_path(dir.path().join("tex.png"));

    let depth = DepthGrid::new(2, 2, vec![0.0; 4]).unwrap();
    let scene = GeneratedScene::new(depth, RgbImage::new(2, 2)).unwrap();
    let path = MeshPipeline::new(config).export(&scene).unwrap();

    let obj = fs::read_to_string(&path).unwrap();
    let verts: Vec<&str> = obj.lines().filter(|l| l.starts_with("v ")).collect();
    let uvs: Vec<&str> = obj.lines().filter(|l| l.starts_with("vt ")).collect();
    assert_eq!(verts, ["v 0 0 0", "v 1 0 0", "v 0 1 0", "v 1 1 0"]);
    assert_eq!(uvs, ["vt 0 0", "vt 0.5 0", "vt 0 0.5", "vt 0.5 0.5"]);
    assert_eq!(parse_faces(&obj), vec![[1, 2, 3], [2, 4, 3]]);

    let mtl = fs::read_to_string(dir.path().join("foo.mtl")).unwrap();
    assert_eq!(mtl, format!("newmtl material_0\nmap_Kd {}\n", dir.path().join("tex.png").display()));
}

#[test]
fn converts_saved_rasters() {
    let dir = tempdir().unwrap();
    let (w, h) = (5u32, 4u32);

    let depth_path = dir.path().join("depth.png");
    let color_path = dir.path().join("color.png");
    GrayImage::from_fn(w, h, |x, y| image::Luma([(x * 50 + y) as u8])).save(&depth_path).unwrap();
    RgbImage::from_fn(w, h, |x, y| Rgb([x as u8 * 40, y as u8 * 60, 7])).save(&color_path).unwrap();

    let scene = GeneratedScene::open(&depth_path, &color_path).unwrap();
    let config = OutputConfig::default()
        .with_mesh_path(dir.path().join("scene.obj"))
        .with_texture_path(dir.path().join("scene.png"))
        .with_mtllib(true);
    let path = MeshPipeline::new(config).export(&scene).unwrap();

    let obj = fs::read_to_string(&path).unwrap();
    assert!(obj.starts_with("mtllib scene.mtl\nusemtl material_0\n"));

    let n = (w * h) as usize;
    assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), n);
    assert_eq!(obj.lines().filter(|l| l.starts_with("vt ")).count(), n);

    let faces = parse_faces(&obj);
    assert_eq!(faces.len(), 2 * (w as usize - 1) * (h as usize - 1));
    assert!(faces.iter().flatten().all(|&i| i >= 1 && i as usize <= n));

    // Line order: every v before every vt before every f
    let kinds: Vec<&str> = obj
        .lines()
        .filter_map(|l| l.split_whitespace().next())
        .filter(|k| matches!(*k, "v" | "vt" | "f"))
        .collect();
    let mut sorted = kinds.clone();
    sorted.sort_by_key(|k| match *k { "v" => 0, "vt" => 1, _ => 2 });
    assert_eq!(kinds, sorted);

    // Texture is the color raster, losslessly
    let texture = image::open(dir.path().join("scene.png")).unwrap().to_rgb8();
    assert_eq!(texture, image::open(&color_path).unwrap().to_rgb8());
}

#[test]
fn mismatched_rasters_write_nothing() {
    let dir = tempdir().unwrap();
    let depth_path = dir.path().join("depth.png");
    let color_path = dir.path().join("color.png");
    GrayImage::new(3, 3).save(&depth_path).unwrap();
    RgbImage::new(4, 3).save(&color_path).unwrap();

    let err = GeneratedScene::open(&depth_path, &color_path).unwrap_err();
    assert!(matches!(err, MeshError::DimensionMismatch { expected_width: 4, actual_width: 3, .. }));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn single_row_grid_writes_vertices_only() {
    let dir = tempdir().unwrap();
    let grid = DepthGrid::from_rows(&[vec![0.1, 0.2, 0.3]]).unwrap();
    let built = mesh::build(&grid, 3, 1).unwrap();

    let path = dir.path().join("strip.obj");
    mesh::write_mesh_with(&built, &path, Path::new("t.png"), &ObjOptions::default()).unwrap();

    let obj = fs::read_to_string(&path).unwrap();
    assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), 3);
    assert!(parse_faces(&obj).is_empty());
}
