//! The flat `extern "C"` surface: sentinel conventions, out-parameters, and
//! exactly-once buffer release through the process-wide planar binding.

use mesh_bridge::capi::planar::*;
use mesh_bridge::capi::volumetric::*;
use mesh_bridge::capi;
use serial_test::serial;
use std::ffi::CString;
use std::ptr;

/// Build the two-triangle unit square behind a fresh planar handle.
fn square_handle() -> i32 {
    let h = bridge2d_init();
    assert!(h >= 0);
    let counts = [4i32, 2, 0, 0];
    let coords = [0.0f64, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
    let tris = [1i32, 2, 3, 1, 3, 4];
    unsafe {
        assert_eq!(bridge2d_set_mesh_size(h, counts.as_ptr(), 4), 1);
        assert_eq!(bridge2d_set_vertices(h, coords.as_ptr(), 8, ptr::null()), 1);
        assert_eq!(bridge2d_set_elements(h, 2, tris.as_ptr(), 6, ptr::null()), 1);
    }
    h
}

#[test]
#[serial]
fn square_scenario_end_to_end() {
    let baseline = capi::live_buffer_count();
    let h = square_handle();

    let mut counts = [0i32; 4];
    unsafe {
        assert_eq!(bridge2d_get_mesh_size(h, counts.as_mut_ptr(), 4), 1);
    }
    assert_eq!(counts, [4, 2, 0, 0]);

    let mut n = -1i32;
    let verts = unsafe { bridge2d_get_vertices(h, &mut n) };
    assert!(!verts.is_null());
    assert_eq!(n, 4);
    let values = unsafe { std::slice::from_raw_parts(verts, 8) };
    assert_eq!(values, &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);

    let mut elem_count = 0i32;
    let tris = unsafe { bridge2d_get_elements(h, 2, &mut elem_count) };
    assert!(!tris.is_null());
    assert_eq!(elem_count, 2);
    let connectivity = unsafe { std::slice::from_raw_parts(tris, 6) };
    assert_eq!(connectivity, &[1, 2, 3, 1, 3, 4]);

    let q = bridge2d_quality(h, 1);
    assert!(q > 0.0 && q <= 1.0);
    let mut qn = 0i32;
    let qualities = unsafe { bridge2d_bulk_quality(h, &mut qn) };
    assert!(!qualities.is_null());
    assert_eq!(qn, 2);

    assert_eq!(capi::live_buffer_count(), baseline + 3);
    unsafe {
        assert_eq!(bridge2d_free_array(verts.cast()), 1);
        assert_eq!(bridge2d_free_array(tris.cast()), 1);
        assert_eq!(bridge2d_free_array(qualities.cast()), 1);
        // Exactly once: a second release of the same pointer is refused.
        assert_eq!(bridge2d_free_array(verts.cast()), 0);
    }
    assert_eq!(capi::live_buffer_count(), baseline);

    assert_eq!(bridge2d_free(h), 1);
    // Everything downstream of a freed handle fails by sentinel, not panic.
    assert_eq!(bridge2d_free(h), 0);
    assert_eq!(bridge2d_quality(h, 1), 0.0);
    assert_eq!(bridge2d_remesh(h), -1);
    unsafe {
        assert!(bridge2d_get_vertices(h, &mut n).is_null());
        assert_eq!(n, 0);
    }
}

#[test]
#[serial]
fn solution_field_surface_round_trips() {
    let h = square_handle();
    // Kind codes follow the native convention: 1 scalar, 3 tensor.
    assert_eq!(bridge2d_set_sol_size(h, 4, 1), 1);
    let values = [0.5f64, 0.25, 0.125, 0.0625];
    unsafe {
        assert_eq!(bridge2d_set_scalar_field(h, values.as_ptr(), 4), 1);
    }

    let mut entities = 0i32;
    let mut kind = 0i32;
    unsafe {
        assert_eq!(bridge2d_get_sol_size(h, &mut entities, &mut kind), 1);
    }
    assert_eq!((entities, kind), (4, 1));

    let mut n = 0i32;
    let field = unsafe { bridge2d_get_scalar_field(h, &mut n) };
    assert!(!field.is_null());
    assert_eq!(n, 4);
    assert_eq!(unsafe { std::slice::from_raw_parts(field, 4) }, &values);
    unsafe {
        assert_eq!(bridge2d_free_array(field.cast()), 1);
    }

    // Tensor access against a scalar declaration fails by null.
    let mismatched = unsafe { bridge2d_get_tensor_field(h, &mut n) };
    assert!(mismatched.is_null());
    assert_eq!(n, 0);
    // Unknown kind code is rejected outright.
    assert_eq!(bridge2d_set_sol_size(h, 4, 2), 0);

    assert_eq!(bridge2d_free(h), 1);
}

#[test]
#[serial]
fn invalid_handles_and_null_buffers_fail_by_sentinel() {
    let counts = [4i32, 2, 0, 0];
    for bad in [-1, 5000, (1 << 12) + 3] {
        unsafe {
            assert_eq!(bridge2d_set_mesh_size(bad, counts.as_ptr(), 4), 0);
            assert!(bridge2d_get_vertices(bad, ptr::null_mut()).is_null());
        }
        assert_eq!(bridge2d_quality(bad, 1), 0.0);
        assert_eq!(bridge2d_free(bad), 0);
    }

    let h = bridge2d_init();
    unsafe {
        // Null data pointer with a nonzero length is a caller error.
        assert_eq!(bridge2d_set_mesh_size(h, ptr::null(), 4), 0);
        assert_eq!(bridge2d_set_vertices(h, ptr::null(), 8, ptr::null()), 0);
        // Negative lengths never alias a huge usize.
        assert_eq!(bridge2d_set_mesh_size(h, counts.as_ptr(), -4), 0);
        // A null out-count is tolerated on the bulk gets.
        assert!(bridge2d_get_vertices(h, ptr::null_mut()).is_null());
    }
    // Null and foreign pointers are refused by the registry.
    unsafe {
        assert_eq!(bridge2d_free_array(ptr::null_mut()), 0);
        let local = 7i32;
        assert_eq!(bridge2d_free_array((&raw const local).cast_mut().cast()), 0);
    }
    assert_eq!(bridge2d_free(h), 1);
}

#[test]
#[serial]
fn table_exhaustion_returns_the_no_handle_sentinel() {
    let max = bridge3d_get_max_handles();
    assert!(max > 0);
    let mut handles = Vec::new();
    while bridge3d_get_available_handles() > 0 {
        let h = bridge3d_init();
        assert!(h >= 0);
        handles.push(h);
    }
    assert_eq!(bridge3d_init(), -1);
    assert_eq!(bridge3d_get_available_handles(), 0);
    for h in handles {
        assert_eq!(bridge3d_free(h), 1);
    }
    assert_eq!(bridge3d_get_available_handles(), max);
}

#[test]
#[serial]
fn remesh_codes_cross_the_boundary() {
    // Freshly created, no size declared: the kernel's own code comes back.
    let h = bridge2d_init();
    assert_eq!(bridge2d_remesh(h), 1);

    let counts = [5i32, 4, 0, 4];
    let coords = [0.0f64, 0.0, 2.0, 0.0, 2.0, 2.0, 0.0, 2.0, 0.5, 0.5];
    let tris = [1i32, 2, 5, 2, 3, 5, 3, 4, 5, 4, 1, 5];
    let edges = [1i32, 2, 2, 3, 3, 4, 4, 1];
    unsafe {
        assert_eq!(bridge2d_set_mesh_size(h, counts.as_ptr(), 4), 1);
        assert_eq!(bridge2d_set_vertices(h, coords.as_ptr(), 10, ptr::null()), 1);
        assert_eq!(bridge2d_set_elements(h, 2, tris.as_ptr(), 12, ptr::null()), 1);
        assert_eq!(bridge2d_set_elements(h, 1, edges.as_ptr(), 8, ptr::null()), 1);
    }
    assert_eq!(bridge2d_set_int_parameter(h, 4, 1), 1);
    assert_eq!(bridge2d_set_double_parameter(h, 9, 0.01), 1);
    assert_eq!(bridge2d_remesh(h), 0);

    let mut n = 0i32;
    let verts = unsafe { bridge2d_get_vertices(h, &mut n) };
    assert_eq!(n, 5);
    let values = unsafe { std::slice::from_raw_parts(verts, 10) };
    assert!((values[8] - 1.0).abs() < 1e-9 && (values[9] - 1.0).abs() < 1e-9);
    unsafe {
        assert_eq!(bridge2d_free_array(verts.cast()), 1);
    }
    assert_eq!(bridge2d_free(h), 1);
}

#[test]
#[serial]
fn mesh_files_round_trip_across_handles() {
    let path = std::env::temp_dir().join(format!(
        "mesh_bridge_capi_{}_square.mesh",
        std::process::id()
    ));
    let c_path = CString::new(path.to_str().unwrap()).unwrap();

    let h = square_handle();
    unsafe {
        assert_eq!(bridge2d_save_mesh(h, c_path.as_ptr()), 1);
    }
    assert_eq!(bridge2d_free(h), 1);

    let reloaded = bridge2d_init();
    unsafe {
        assert_eq!(bridge2d_load_mesh(reloaded, c_path.as_ptr()), 1);
    }
    let mut counts = [0i32; 4];
    unsafe {
        assert_eq!(bridge2d_get_mesh_size(reloaded, counts.as_mut_ptr(), 4), 1);
    }
    assert_eq!(counts, [4, 2, 0, 0]);

    // Missing files fail by sentinel.
    let absent = CString::new("/nonexistent/mesh_bridge.mesh").unwrap();
    unsafe {
        assert_eq!(bridge2d_load_mesh(reloaded, absent.as_ptr()), 0);
        assert_eq!(bridge2d_load_mesh(reloaded, ptr::null()), 0);
    }
    assert_eq!(bridge2d_free(reloaded), 1);
    let _ = std::fs::remove_file(path);
}

#[test]
#[serial]
fn variant_surfaces_are_independent() {
    let planar = bridge2d_init();
    let volumetric = bridge3d_init();
    // Fresh tables issue the same packed values; the surfaces must not alias.
    let counts2d = [3i32, 1, 0, 0];
    let counts3d = [4i32, 1, 0, 0, 0, 0];
    unsafe {
        assert_eq!(bridge2d_set_mesh_size(planar, counts2d.as_ptr(), 4), 1);
        assert_eq!(bridge3d_set_mesh_size(volumetric, counts3d.as_ptr(), 6), 1);
        let mut out = [0i32; 6];
        assert_eq!(bridge2d_get_mesh_size(planar, out.as_mut_ptr(), 6), 1);
        assert_eq!(&out[..4], &[3, 1, 0, 0]);
        assert_eq!(bridge3d_get_mesh_size(volumetric, out.as_mut_ptr(), 6), 1);
        assert_eq!(out, [4, 1, 0, 0, 0, 0]);
    }
    assert_eq!(bridge2d_free(planar), 1);
    assert_eq!(bridge3d_free(volumetric), 1);
}
