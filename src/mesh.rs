//! Water surface mesh loading.
//!
//! The water surface comes from a fixed-name OBJ-style file holding vertex
//! positions and texture coordinates. Normals in the file are ignored; every
//! vertex gets a constant up normal, which is what the displacement shaders
//! expect as a starting point.

use std::path::Path;

use crate::error::{AssetError, Result};

/// Vertex format for the water surface.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct WaterVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Load the water mesh from disk. Missing or malformed files are fatal.
pub fn load_water_mesh(path: &Path) -> Result<Vec<WaterVertex>> {
    if !path.exists() {
        return Err(AssetError::NotFound(path.to_path_buf()));
    }
    let src = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_water_mesh(&src, path)
}

/// Parse OBJ-subset mesh text: `v x y z`, `vt u v` and `f` records with
/// `pos/tex[/nrm]` corners. Triangles pass through; quads are split into
/// two triangles sharing the first corner. The output is a flat,
/// non-indexed triangle list.
pub fn parse_water_mesh(src: &str, path: &Path) -> Result<Vec<WaterVertex>> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut texcoords: Vec<[f32; 2]> = Vec::new();
    let mut vertices: Vec<WaterVertex> = Vec::new();

    for (lineno, line) in src.lines().enumerate() {
        let lineno = lineno + 1;
        let mut it = line.split_whitespace();
        match it.next() {
            Some("v") => {
                let p: [f32; 3] = parse_floats(&mut it, path, lineno)?;
                positions.push(p);
            }
            Some("vt") => {
                let t: [f32; 2] = parse_floats(&mut it, path, lineno)?;
                texcoords.push(t);
            }
            Some("f") => {
                let corners: Vec<(usize, usize)> = it
                    .map(|c| parse_corner(c, path, lineno))
                    .collect::<Result<_>>()?;
                if corners.len() != 3 && corners.len() != 4 {
                    return Err(AssetError::mesh(
                        path,
                        lineno,
                        format!("face with {} corners, expected 3 or 4", corners.len()),
                    ));
                }
                let tris: &[[usize; 3]] =
                    if corners.len() == 4 { &[[0, 1, 2], [0, 2, 3]] } else { &[[0, 1, 2]] };
                for tri in tris {
                    for &c in tri {
                        let (pi, ti) = corners[c];
                        let position = *positions.get(pi).ok_or_else(|| {
                            AssetError::mesh(path, lineno, format!("position index {} out of range", pi + 1))
                        })?;
                        let uv = *texcoords.get(ti).ok_or_else(|| {
                            AssetError::mesh(path, lineno, format!("texcoord index {} out of range", ti + 1))
                        })?;
                        vertices.push(WaterVertex {
                            position,
                            // normals are synthesized, not read from the file
                            normal: [0.0, 1.0, 0.0],
                            uv,
                        });
                    }
                }
            }
            // vn, comments, object/group names: ignored
            _ => {}
        }
    }

    if vertices.is_empty() {
        return Err(AssetError::mesh(path, 0, "no faces found"));
    }
    Ok(vertices)
}

fn parse_floats<'a, const N: usize>(
    it: &mut impl Iterator<Item = &'a str>,
    path: &Path,
    lineno: usize,
) -> Result<[f32; N]> {
    let mut out = [0.0f32; N];
    for slot in out.iter_mut() {
        let tok = it
            .next()
            .ok_or_else(|| AssetError::mesh(path, lineno, "too few components"))?;
        *slot = tok
            .parse()
            .map_err(|_| AssetError::mesh(path, lineno, format!("bad number {:?}", tok)))?;
    }
    Ok(out)
}

/// Parse one `pos/tex` or `pos/tex/nrm` face corner into 0-based indices.
fn parse_corner(corner: &str, path: &Path, lineno: usize) -> Result<(usize, usize)> {
    let mut parts = corner.split('/');
    let pos = parse_index(parts.next(), corner, path, lineno)?;
    let tex = parse_index(parts.next(), corner, path, lineno)?;
    Ok((pos, tex))
}

fn parse_index(part: Option<&str>, corner: &str, path: &Path, lineno: usize) -> Result<usize> {
    let idx: usize = part
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| AssetError::mesh(path, lineno, format!("bad face corner {:?}", corner)))?;
    if idx == 0 {
        return Err(AssetError::mesh(path, lineno, "face indices are 1-based"));
    }
    Ok(idx - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn p() -> PathBuf {
        PathBuf::from("water.obj")
    }

    #[test]
    fn test_parse_triangle() {
        let src = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
f 1/1/1 2/2/1 3/3/1
";
        let verts = parse_water_mesh(src, &p()).unwrap();
        assert_eq!(verts.len(), 3);
        assert_eq!(verts[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(verts[2].uv, [0.0, 1.0]);
    }

    #[test]
    fn test_normals_are_constant_up() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 0 1\nvt 0 0\nvt 1 0\nvt 0 1\nf 1/1 2/2 3/3\n";
        let verts = parse_water_mesh(src, &p()).unwrap();
        for v in &verts {
            assert_eq!(v.normal, [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn test_quad_splits_into_two_triangles() {
        let src = "\
v -1 0 -1
v 1 0 -1
v 1 0 1
v -1 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
";
        let verts = parse_water_mesh(src, &p()).unwrap();
        assert_eq!(verts.len(), 6);
        // both triangles share the first corner
        assert_eq!(verts[0].position, verts[3].position);
        assert_eq!(verts[2].position, verts[4].position);
    }

    #[test]
    fn test_bad_index_is_error() {
        let src = "v 0 0 0\nvt 0 0\nf 1/1 2/1 3/1\n";
        let err = parse_water_mesh(src, &p()).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_empty_mesh_is_error() {
        let err = parse_water_mesh("v 0 0 0\n", &p()).unwrap_err();
        assert!(err.to_string().contains("no faces"));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = load_water_mesh(Path::new("/nonexistent/water.obj")).unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
    }
}
