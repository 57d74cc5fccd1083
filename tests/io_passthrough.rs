//! Mesh and solution file round trips through the bridge's I/O passthrough.

use mesh_bridge::error::BridgeError;
use mesh_bridge::prelude::*;
use std::fs;
use std::path::PathBuf;

type PlanarBridge = Bridge<ReferenceKernel<Planar>>;
type VolumetricBridge = Bridge<ReferenceKernel<Volumetric>>;

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("mesh_bridge_io_{}_{name}", std::process::id()))
}

#[test]
fn mesh_save_load_round_trip() {
    let path = scratch("square.mesh");
    let mut bridge = PlanarBridge::new();
    let h = bridge.init().unwrap();
    bridge.set_mesh_size(h, &[4, 2, 0, 2]).unwrap();
    bridge
        .set_vertices(
            h,
            &[0.0, 0.0, 1.5, 0.0, 1.5, 1.0, 0.0, 1.0],
            Some(&[1, 1, 2, 2]),
        )
        .unwrap();
    bridge
        .set_elements(h, EntityKind::Triangle, &[1, 2, 3, 1, 3, 4], Some(&[10, 20]))
        .unwrap();
    bridge
        .set_elements(h, EntityKind::Edge, &[1, 2, 3, 4], None)
        .unwrap();
    bridge.save_mesh(h, &path).unwrap();
    bridge.free(h).unwrap();

    let reloaded = bridge.init().unwrap();
    bridge.load_mesh(reloaded, &path).unwrap();
    let counts = bridge.mesh_size(reloaded).unwrap();
    assert_eq!(counts.as_slice(), &[4, 2, 0, 2]);
    let verts = bridge.vertices(reloaded).unwrap().unwrap();
    assert_eq!(verts.values, vec![0.0, 0.0, 1.5, 0.0, 1.5, 1.0, 0.0, 1.0]);
    let tris = bridge.elements(reloaded, EntityKind::Triangle).unwrap().unwrap();
    assert_eq!(tris.values, vec![1, 2, 3, 1, 3, 4]);
    let edges = bridge.elements(reloaded, EntityKind::Edge).unwrap().unwrap();
    assert_eq!(edges.values, vec![1, 2, 3, 4]);
    bridge.free(reloaded).unwrap();
    let _ = fs::remove_file(path);
}

#[test]
fn volumetric_mesh_round_trip_keeps_tets() {
    let path = scratch("tet.mesh");
    let mut bridge = VolumetricBridge::new();
    let h = bridge.init().unwrap();
    bridge.set_mesh_size(h, &[4, 1, 0, 0, 0, 0]).unwrap();
    bridge
        .set_vertices(
            h,
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            None,
        )
        .unwrap();
    bridge
        .set_elements(h, EntityKind::Tetrahedron, &[1, 2, 3, 4], None)
        .unwrap();
    bridge.save_mesh(h, &path).unwrap();

    let other = bridge.init().unwrap();
    bridge.load_mesh(other, &path).unwrap();
    let tets = bridge.elements(other, EntityKind::Tetrahedron).unwrap().unwrap();
    assert_eq!(tets.values, vec![1, 2, 3, 4]);
    assert!((bridge.quality(other, 1) - bridge.quality(h, 1)).abs() < 1e-12);
    bridge.free(h).unwrap();
    bridge.free(other).unwrap();
    let _ = fs::remove_file(path);
}

#[test]
fn sol_save_load_round_trip_for_both_kinds() {
    let scalar_path = scratch("field.sol");
    let tensor_path = scratch("metric.sol");
    let mut bridge = PlanarBridge::new();
    let h = bridge.init().unwrap();
    bridge.set_mesh_size(h, &[3, 1, 0, 0]).unwrap();
    bridge
        .set_vertices(h, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0], None)
        .unwrap();

    bridge.set_sol_size(h, SolKind::Scalar, 3).unwrap();
    bridge.set_scalar_field(h, &[1.0, 2.5, -0.5]).unwrap();
    bridge.save_sol(h, &scalar_path).unwrap();

    bridge.set_sol_size(h, SolKind::Tensor, 3).unwrap();
    let tensors: Vec<f64> = (0..9).map(|i| f64::from(i) * 0.5).collect();
    bridge.set_tensor_field(h, &tensors).unwrap();
    bridge.save_sol(h, &tensor_path).unwrap();

    // Loading the scalar file replaces the tensor declaration wholesale.
    bridge.load_sol(h, &scalar_path).unwrap();
    assert_eq!(bridge.sol_size(h).unwrap(), (SolKind::Scalar, 3));
    let field = bridge.scalar_field(h).unwrap().unwrap();
    assert_eq!(field.values, vec![1.0, 2.5, -0.5]);

    bridge.load_sol(h, &tensor_path).unwrap();
    assert_eq!(bridge.sol_size(h).unwrap(), (SolKind::Tensor, 3));
    assert_eq!(bridge.tensor_field(h).unwrap().unwrap().values, tensors);

    bridge.free(h).unwrap();
    let _ = fs::remove_file(scalar_path);
    let _ = fs::remove_file(tensor_path);
}

#[test]
fn missing_and_malformed_files_are_distinct_failures() {
    let mut bridge = PlanarBridge::new();
    let h = bridge.init().unwrap();

    let absent = scratch("does_not_exist.mesh");
    assert!(matches!(
        bridge.load_mesh(h, &absent),
        Err(BridgeError::Io { .. })
    ));

    let garbled = scratch("garbled.mesh");
    fs::write(&garbled, "MeshVersionFormatted 2\nTrapezoids\n1\n").unwrap();
    assert!(matches!(
        bridge.load_mesh(h, &garbled),
        Err(BridgeError::MalformedFile { .. })
    ));

    // Wrong dimension for the planar variant.
    let skewed = scratch("skewed.mesh");
    fs::write(&skewed, "MeshVersionFormatted 2\nDimension\n3\nEnd\n").unwrap();
    assert!(bridge.load_mesh(h, &skewed).is_err());

    // Connectivity past the vertex table is rejected before any state change.
    let dangling = scratch("dangling.mesh");
    fs::write(
        &dangling,
        "MeshVersionFormatted 2\nDimension\n2\nVertices\n2\n0 0 0\n1 0 0\nTriangles\n1\n1 2 9 0\nEnd\n",
    )
    .unwrap();
    assert!(matches!(
        bridge.load_mesh(h, &dangling),
        Err(BridgeError::MalformedFile { .. })
    ));
    assert_eq!(bridge.mesh_size(h).unwrap().vertices(), 0);

    // A truncated file never parses as success.
    let truncated = scratch("truncated.mesh");
    fs::write(&truncated, "MeshVersionFormatted 2\nDimension\n2\nVertices\n5\n0 0").unwrap();
    assert!(bridge.load_mesh(h, &truncated).is_err());

    assert!(matches!(bridge.save_sol(h, &absent), Err(BridgeError::SolUndeclared)));
    bridge.free(h).unwrap();
    for p in [garbled, skewed, dangling, truncated] {
        let _ = fs::remove_file(p);
    }
}

#[test]
fn sol_counts_from_files_are_validated_not_trusted() {
    let mut bridge = PlanarBridge::new();
    let h = bridge.init().unwrap();

    // A negative entity count is a parse error, never an allocation request.
    let negative = scratch("negative.sol");
    fs::write(
        &negative,
        "MeshVersionFormatted 2\nDimension\n2\nSolAtVertices\n-1\n1 1\nEnd\n",
    )
    .unwrap();
    assert!(matches!(
        bridge.load_sol(h, &negative),
        Err(BridgeError::MalformedFile { .. })
    ));

    // An absurdly large claimed count fails by error, either at the fallible
    // reserve or at end of input, without ever committing the storage.
    let oversized = scratch("oversized.sol");
    fs::write(
        &oversized,
        "MeshVersionFormatted 2\nDimension\n2\nSolAtVertices\n2000000000\n1 1\n0.5\nEnd\n",
    )
    .unwrap();
    assert!(bridge.load_sol(h, &oversized).is_err());

    // Neither failure attached a field.
    assert!(matches!(bridge.sol_size(h), Err(BridgeError::SolUndeclared)));
    bridge.free(h).unwrap();
    for p in [negative, oversized] {
        let _ = fs::remove_file(p);
    }
}
