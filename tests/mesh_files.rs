//! Integration tests for loading the water mesh from real files.

use std::io::Write;

use trackview::error::AssetError;
use trackview::mesh::load_water_mesh;

fn write_obj(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write temp file");
    file
}

#[test]
fn test_load_water_plane() {
    let file = write_obj(
        "\
# water surface
v -1.0 0.0 -1.0
v 1.0 0.0 -1.0
v 1.0 0.0 1.0
v -1.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 1.0 0.0
f 1/1/1 2/2/1 3/3/1 4/4/1
",
    );
    let verts = load_water_mesh(file.path()).expect("Failed to load mesh");
    assert_eq!(verts.len(), 6);
    // file normals are ignored; the loader synthesizes straight up
    for v in &verts {
        assert_eq!(v.normal, [0.0, 1.0, 0.0]);
    }
    assert_eq!(verts[0].uv, [0.0, 0.0]);
}

#[test]
fn test_missing_file_is_not_found() {
    let err = load_water_mesh(std::path::Path::new("/no/such/water.obj")).unwrap_err();
    assert!(matches!(err, AssetError::NotFound(_)));
}

#[test]
fn test_malformed_face_reports_line() {
    let file = write_obj("v 0 0 0\nvt 0 0\nf 1/1 zzz 1/1\n");
    let err = load_water_mesh(file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("line 3"), "unexpected message: {msg}");
}

#[test]
fn test_face_without_texcoord_is_rejected() {
    let file = write_obj("v 0 0 0\nv 1 0 0\nv 0 0 1\nf 1 2 3\n");
    let err = load_water_mesh(file.path()).unwrap_err();
    assert!(matches!(err, AssetError::MeshParse { .. }));
}
