//! Flat, sentinel-convention C boundary.
//!
//! Foreign callers that cannot hold a Rust context reach the bridge through
//! these `extern "C"` functions: fixed positional argument lists of primitive
//! scalars and flat buffers, 1-based indices, and uniform failure sentinels
//! (`1|0` for predicates and setters, `-1` for "no handle", null plus a zero
//! out-count for bulk gets, `0.0` for quality). No panic crosses the
//! boundary; every entry point validates its handle first and fails without
//! touching state.
//!
//! One process-wide [`Bridge`](crate::bridge::Bridge) per variant lives
//! behind a lazily initialized mutex, serializing reentrant callers. The
//! whole surface is generated once by [`boundary_api!`] and instantiated per
//! variant — the binding below each prefix is the only per-variant code.
//!
//! # Buffer ownership
//! Every pointer returned by a bulk get is freshly allocated, recorded in a
//! process-wide registry, and owned by the caller from the moment it is
//! returned. It must be passed to the variant's `free_array` exactly once;
//! a release of a pointer the registry does not know (double release,
//! foreign pointer) is refused, logged, and returns 0.

use crate::bridge::Bridge;
use crate::kernel::KernelIndex;
use crate::kernel::reference::ReferenceKernel;
use crate::variant::{Planar, Surface, Volumetric};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::ffi::{CStr, c_char, c_void};
use std::path::PathBuf;

/// Length and element type of one live boundary buffer.
enum LiveBuffer {
    F64(usize),
    Index(usize),
}

/// Registry of buffers currently owned by the foreign caller, keyed by
/// address. Shared across variants; a buffer may be released through any
/// variant's `free_array`.
static LIVE_BUFFERS: Lazy<Mutex<HashMap<usize, LiveBuffer>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Number of live (unreleased) boundary buffers, for leak checks in tests.
pub fn live_buffer_count() -> usize {
    LIVE_BUFFERS.lock().len()
}

fn publish_f64(values: Vec<f64>) -> *mut f64 {
    debug_assert!(!values.is_empty(), "zero-count gets return null, not an empty buffer");
    let boxed = values.into_boxed_slice();
    let len = boxed.len();
    let ptr = Box::into_raw(boxed) as *mut f64;
    LIVE_BUFFERS.lock().insert(ptr as usize, LiveBuffer::F64(len));
    ptr
}

fn publish_index(values: Vec<KernelIndex>) -> *mut KernelIndex {
    debug_assert!(!values.is_empty(), "zero-count gets return null, not an empty buffer");
    let boxed = values.into_boxed_slice();
    let len = boxed.len();
    let ptr = Box::into_raw(boxed) as *mut KernelIndex;
    LIVE_BUFFERS.lock().insert(ptr as usize, LiveBuffer::Index(len));
    ptr
}

/// Release a boundary buffer exactly once. Returns 1 if this call released
/// it, 0 for null, unknown, or already released pointers.
unsafe fn release_buffer(ptr: *mut c_void) -> i32 {
    if ptr.is_null() {
        return 0;
    }
    match LIVE_BUFFERS.lock().remove(&(ptr as usize)) {
        Some(LiveBuffer::F64(len)) => {
            unsafe {
                drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr as *mut f64, len)));
            }
            1
        }
        Some(LiveBuffer::Index(len)) => {
            unsafe {
                drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    ptr as *mut KernelIndex,
                    len,
                )));
            }
            1
        }
        None => {
            log::warn!("refusing to release unknown or already released buffer {ptr:?}");
            0
        }
    }
}

/// Write through an out-parameter, tolerating null.
unsafe fn write_out<T>(out: *mut T, value: T) {
    if !out.is_null() {
        unsafe { *out = value };
    }
}

/// Borrow a caller buffer. `len == 0` is an empty slice; a null pointer with
/// a nonzero length is a caller error and yields `None`.
unsafe fn slice_from<'a, T>(ptr: *const T, len: i32) -> Option<&'a [T]> {
    if len < 0 {
        return None;
    }
    if len == 0 {
        return Some(&[]);
    }
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { std::slice::from_raw_parts(ptr, len as usize) })
}

/// Borrow an optional parallel reference-tag buffer of `len` entries;
/// null means "default tag 0".
unsafe fn refs_from<'a>(ptr: *const KernelIndex, len: usize) -> Option<&'a [KernelIndex]> {
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { std::slice::from_raw_parts(ptr, len) })
    }
}

unsafe fn path_from(ptr: *const c_char) -> Option<PathBuf> {
    if ptr.is_null() {
        return None;
    }
    let raw = unsafe { CStr::from_ptr(ptr) };
    raw.to_str().ok().map(PathBuf::from)
}

/// Generate one variant's complete boundary surface over a process-wide
/// bridge. Function names are spelled out by the caller because `no_mangle`
/// symbols cannot be synthesized; the bodies exist once, here.
macro_rules! boundary_api {
    (
        kernel: $kernel:ty,
        init: $init:ident,
        free: $free:ident,
        available_handles: $available:ident,
        max_handles: $max:ident,
        set_mesh_size: $set_size:ident,
        get_mesh_size: $get_size:ident,
        set_vertex: $set_vertex:ident,
        set_vertices: $set_vertices:ident,
        get_vertices: $get_vertices:ident,
        set_element: $set_element:ident,
        set_elements: $set_elements:ident,
        get_elements: $get_elements:ident,
        set_sol_size: $set_sol_size:ident,
        get_sol_size: $get_sol_size:ident,
        set_scalar_field: $set_scalar:ident,
        get_scalar_field: $get_scalar:ident,
        set_tensor_field: $set_tensor:ident,
        get_tensor_field: $get_tensor:ident,
        set_int_parameter: $set_ipar:ident,
        set_double_parameter: $set_dpar:ident,
        remesh: $remesh:ident,
        quality: $quality:ident,
        bulk_quality: $bulk_quality:ident,
        load_mesh: $load_mesh:ident,
        save_mesh: $save_mesh:ident,
        load_sol: $load_sol:ident,
        save_sol: $save_sol:ident,
        free_array: $free_array:ident,
    ) => {
        static BRIDGE: $crate::capi::BoundaryState<$kernel> =
            once_cell::sync::Lazy::new(|| {
                parking_lot::Mutex::new($crate::bridge::Bridge::new())
            });

        /// Create a mesh/field instance. Returns a handle (≥ 0) or -1 when
        /// the table is exhausted or construction fails.
        #[unsafe(no_mangle)]
        pub extern "C" fn $init() -> i32 {
            match BRIDGE.lock().init() {
                Ok(handle) => handle.raw(),
                Err(err) => {
                    log::debug!("init refused: {err}");
                    -1
                }
            }
        }

        /// Destroy the instance behind `handle`. Returns 1 on success, 0 on
        /// an invalid or stale handle.
        #[unsafe(no_mangle)]
        pub extern "C" fn $free(handle: i32) -> i32 {
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return 0;
            };
            BRIDGE.lock().free(handle).is_ok() as i32
        }

        /// Free handle slots remaining.
        #[unsafe(no_mangle)]
        pub extern "C" fn $available() -> i32 {
            BRIDGE.lock().available_handles() as i32
        }

        /// Hard ceiling on concurrent instances.
        #[unsafe(no_mangle)]
        pub extern "C" fn $max() -> i32 {
            BRIDGE.lock().max_handles() as i32
        }

        /// Declare entity counts: vertex count first, then one count per
        /// element kind in this variant's declaration order.
        ///
        /// # Safety
        /// `counts` must point to `len` readable `i32` values.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $set_size(handle: i32, counts: *const i32, len: i32) -> i32 {
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return 0;
            };
            let Some(counts) = (unsafe { $crate::capi::slice_from(counts, len) }) else {
                return 0;
            };
            BRIDGE.lock().set_mesh_size(handle, counts).is_ok() as i32
        }

        /// Read back the declared counts into a caller-allocated buffer of at
        /// least the variant's count arity.
        ///
        /// # Safety
        /// `out_counts` must point to `len` writable `i32` values.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $get_size(handle: i32, out_counts: *mut i32, len: i32) -> i32 {
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return 0;
            };
            let Ok(counts) = BRIDGE.lock().mesh_size(handle) else {
                return 0;
            };
            let counts = counts.as_slice();
            if out_counts.is_null() || (len as usize) < counts.len() || len < 0 {
                return 0;
            }
            unsafe {
                std::ptr::copy_nonoverlapping(counts.as_ptr(), out_counts, counts.len());
            }
            1
        }

        /// Set one vertex at 1-based `pos`; `coords` carries this variant's
        /// coordinate stride.
        ///
        /// # Safety
        /// `coords` must point to `coords_len` readable `f64` values.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $set_vertex(
            handle: i32,
            coords: *const f64,
            coords_len: i32,
            vertex_ref: i32,
            pos: i32,
        ) -> i32 {
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return 0;
            };
            let Some(coords) = (unsafe { $crate::capi::slice_from(coords, coords_len) }) else {
                return 0;
            };
            BRIDGE.lock().set_vertex(handle, coords, vertex_ref, pos).is_ok() as i32
        }

        /// Bulk vertex set from a strided flat buffer; `refs` may be null for
        /// default tag 0, otherwise it parallels the declared vertex count.
        ///
        /// # Safety
        /// `coords` must point to `coords_len` readable `f64` values; `refs`,
        /// when non-null, to one `i32` per declared vertex.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $set_vertices(
            handle: i32,
            coords: *const f64,
            coords_len: i32,
            refs: *const i32,
        ) -> i32 {
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return 0;
            };
            let mut bridge = BRIDGE.lock();
            let Ok(counts) = bridge.mesh_size(handle) else {
                return 0;
            };
            let Some(coords) = (unsafe { $crate::capi::slice_from(coords, coords_len) }) else {
                return 0;
            };
            let refs = unsafe { $crate::capi::refs_from(refs, counts.vertices() as usize) };
            bridge.set_vertices(handle, coords, refs).is_ok() as i32
        }

        /// Bulk vertex get. Returns a freshly allocated coordinate buffer
        /// (caller releases via the matching free) and writes the vertex
        /// count; null and count 0 on failure or an empty mesh.
        ///
        /// # Safety
        /// `out_count`, when non-null, must be writable.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $get_vertices(handle: i32, out_count: *mut i32) -> *mut f64 {
            unsafe { $crate::capi::write_out(out_count, 0) };
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return std::ptr::null_mut();
            };
            match BRIDGE.lock().vertices(handle) {
                Ok(Some(data)) => {
                    unsafe { $crate::capi::write_out(out_count, data.count) };
                    $crate::capi::publish_f64(data.values)
                }
                Ok(None) | Err(_) => std::ptr::null_mut(),
            }
        }

        /// Set one element of the kind given by its boundary code, at
        /// 1-based `pos`.
        ///
        /// # Safety
        /// `nodes` must point to `nodes_len` readable `i32` values.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $set_element(
            handle: i32,
            kind: i32,
            nodes: *const i32,
            nodes_len: i32,
            element_ref: i32,
            pos: i32,
        ) -> i32 {
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return 0;
            };
            let Some(kind) = $crate::variant::EntityKind::from_code(kind) else {
                return 0;
            };
            let Some(nodes) = (unsafe { $crate::capi::slice_from(nodes, nodes_len) }) else {
                return 0;
            };
            BRIDGE
                .lock()
                .set_element(handle, kind, nodes, element_ref, pos)
                .is_ok() as i32
        }

        /// Bulk element set from a strided flat connectivity buffer; `refs`
        /// may be null for default tag 0.
        ///
        /// # Safety
        /// `connectivity` must point to `connectivity_len` readable `i32`
        /// values; `refs`, when non-null, to one `i32` per declared element
        /// of `kind`.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $set_elements(
            handle: i32,
            kind: i32,
            connectivity: *const i32,
            connectivity_len: i32,
            refs: *const i32,
        ) -> i32 {
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return 0;
            };
            let Some(kind) = $crate::variant::EntityKind::from_code(kind) else {
                return 0;
            };
            let mut bridge = BRIDGE.lock();
            let Ok(counts) = bridge.mesh_size(handle) else {
                return 0;
            };
            let Some(connectivity) =
                (unsafe { $crate::capi::slice_from(connectivity, connectivity_len) })
            else {
                return 0;
            };
            let declared = counts
                .element(<$kernel as $crate::kernel::RemeshKernel>::variant(), kind)
                .unwrap_or(0) as usize;
            let refs = unsafe { $crate::capi::refs_from(refs, declared) };
            bridge.set_elements(handle, kind, connectivity, refs).is_ok() as i32
        }

        /// Bulk element get for one kind. Returns a freshly allocated
        /// connectivity buffer and writes the element count; null and 0 on
        /// failure or when the kind has no entities.
        ///
        /// # Safety
        /// `out_count`, when non-null, must be writable.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $get_elements(
            handle: i32,
            kind: i32,
            out_count: *mut i32,
        ) -> *mut i32 {
            unsafe { $crate::capi::write_out(out_count, 0) };
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return std::ptr::null_mut();
            };
            let Some(kind) = $crate::variant::EntityKind::from_code(kind) else {
                return std::ptr::null_mut();
            };
            match BRIDGE.lock().elements(handle, kind) {
                Ok(Some(data)) => {
                    unsafe { $crate::capi::write_out(out_count, data.count) };
                    $crate::capi::publish_index(data.values)
                }
                Ok(None) | Err(_) => std::ptr::null_mut(),
            }
        }

        /// Declare the solution field: entity count and kind code (1 scalar,
        /// 3 tensor).
        #[unsafe(no_mangle)]
        pub extern "C" fn $set_sol_size(handle: i32, entities: i32, sol_kind: i32) -> i32 {
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return 0;
            };
            let Some(kind) = $crate::kernel::SolKind::from_code(sol_kind) else {
                return 0;
            };
            BRIDGE.lock().set_sol_size(handle, kind, entities).is_ok() as i32
        }

        /// Read back the solution declaration.
        ///
        /// # Safety
        /// Out-parameters, when non-null, must be writable.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $get_sol_size(
            handle: i32,
            out_entities: *mut i32,
            out_kind: *mut i32,
        ) -> i32 {
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return 0;
            };
            match BRIDGE.lock().sol_size(handle) {
                Ok((kind, entities)) => {
                    unsafe {
                        $crate::capi::write_out(out_entities, entities);
                        $crate::capi::write_out(out_kind, kind.code());
                    }
                    1
                }
                Err(_) => 0,
            }
        }

        /// Bulk scalar field set; one value per declared entity.
        ///
        /// # Safety
        /// `values` must point to `len` readable `f64` values.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $set_scalar(handle: i32, values: *const f64, len: i32) -> i32 {
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return 0;
            };
            let Some(values) = (unsafe { $crate::capi::slice_from(values, len) }) else {
                return 0;
            };
            BRIDGE.lock().set_scalar_field(handle, values).is_ok() as i32
        }

        /// Bulk scalar field get; writes the entity count.
        ///
        /// # Safety
        /// `out_count`, when non-null, must be writable.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $get_scalar(handle: i32, out_count: *mut i32) -> *mut f64 {
            unsafe { $crate::capi::write_out(out_count, 0) };
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return std::ptr::null_mut();
            };
            match BRIDGE.lock().scalar_field(handle) {
                Ok(Some(data)) => {
                    unsafe { $crate::capi::write_out(out_count, data.count) };
                    $crate::capi::publish_f64(data.values)
                }
                Ok(None) | Err(_) => std::ptr::null_mut(),
            }
        }

        /// Bulk tensor field set; this variant's tensor stride per entity.
        ///
        /// # Safety
        /// `values` must point to `len` readable `f64` values.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $set_tensor(handle: i32, values: *const f64, len: i32) -> i32 {
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return 0;
            };
            let Some(values) = (unsafe { $crate::capi::slice_from(values, len) }) else {
                return 0;
            };
            BRIDGE.lock().set_tensor_field(handle, values).is_ok() as i32
        }

        /// Bulk tensor field get; writes the entity count (values are
        /// `count × tensor stride`).
        ///
        /// # Safety
        /// `out_count`, when non-null, must be writable.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $get_tensor(handle: i32, out_count: *mut i32) -> *mut f64 {
            unsafe { $crate::capi::write_out(out_count, 0) };
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return std::ptr::null_mut();
            };
            match BRIDGE.lock().tensor_field(handle) {
                Ok(Some(data)) => {
                    unsafe { $crate::capi::write_out(out_count, data.count) };
                    $crate::capi::publish_f64(data.values)
                }
                Ok(None) | Err(_) => std::ptr::null_mut(),
            }
        }

        /// Integer parameter passthrough; the id space is kernel-defined.
        #[unsafe(no_mangle)]
        pub extern "C" fn $set_ipar(handle: i32, id: i32, value: i32) -> i32 {
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return 0;
            };
            BRIDGE.lock().set_int_parameter(handle, id, value).is_ok() as i32
        }

        /// Double parameter passthrough.
        #[unsafe(no_mangle)]
        pub extern "C" fn $set_dpar(handle: i32, id: i32, value: f64) -> i32 {
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return 0;
            };
            BRIDGE.lock().set_double_parameter(handle, id, value).is_ok() as i32
        }

        /// Run the remeshing algorithm. Returns 0 on success, the kernel's
        /// nonzero code on kernel failure, -1 on an invalid handle.
        #[unsafe(no_mangle)]
        pub extern "C" fn $remesh(handle: i32) -> i32 {
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return -1;
            };
            match BRIDGE.lock().remesh(handle) {
                Ok(()) => 0,
                Err($crate::error::BridgeError::RemeshFailed { code }) => code,
                Err(_) => -1,
            }
        }

        /// Quality of the quality-element at 1-based `index`; 0.0 on any
        /// invalid input.
        #[unsafe(no_mangle)]
        pub extern "C" fn $quality(handle: i32, index: i32) -> f64 {
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return 0.0;
            };
            BRIDGE.lock().quality(handle, index)
        }

        /// Qualities of every quality-element; same allocate/return/release
        /// convention as the other bulk gets.
        ///
        /// # Safety
        /// `out_count`, when non-null, must be writable.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $bulk_quality(handle: i32, out_count: *mut i32) -> *mut f64 {
            unsafe { $crate::capi::write_out(out_count, 0) };
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return std::ptr::null_mut();
            };
            match BRIDGE.lock().qualities(handle) {
                Ok(Some(data)) => {
                    unsafe { $crate::capi::write_out(out_count, data.count) };
                    $crate::capi::publish_f64(data.values)
                }
                Ok(None) | Err(_) => std::ptr::null_mut(),
            }
        }

        /// Load a mesh file, delegated verbatim to the kernel.
        ///
        /// # Safety
        /// `path` must be a valid NUL-terminated string.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $load_mesh(handle: i32, path: *const std::ffi::c_char) -> i32 {
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return 0;
            };
            let Some(path) = (unsafe { $crate::capi::path_from(path) }) else {
                return 0;
            };
            BRIDGE.lock().load_mesh(handle, &path).is_ok() as i32
        }

        /// Save the mesh, delegated verbatim to the kernel.
        ///
        /// # Safety
        /// `path` must be a valid NUL-terminated string.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $save_mesh(handle: i32, path: *const std::ffi::c_char) -> i32 {
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return 0;
            };
            let Some(path) = (unsafe { $crate::capi::path_from(path) }) else {
                return 0;
            };
            BRIDGE.lock().save_mesh(handle, &path).is_ok() as i32
        }

        /// Load a solution file, delegated verbatim to the kernel.
        ///
        /// # Safety
        /// `path` must be a valid NUL-terminated string.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $load_sol(handle: i32, path: *const std::ffi::c_char) -> i32 {
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return 0;
            };
            let Some(path) = (unsafe { $crate::capi::path_from(path) }) else {
                return 0;
            };
            BRIDGE.lock().load_sol(handle, &path).is_ok() as i32
        }

        /// Save the solution, delegated verbatim to the kernel.
        ///
        /// # Safety
        /// `path` must be a valid NUL-terminated string.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $save_sol(handle: i32, path: *const std::ffi::c_char) -> i32 {
            let Some(handle) = $crate::handle::Handle::from_raw(handle) else {
                return 0;
            };
            let Some(path) = (unsafe { $crate::capi::path_from(path) }) else {
                return 0;
            };
            BRIDGE.lock().save_sol(handle, &path).is_ok() as i32
        }

        /// Release a buffer returned by one of this surface's bulk gets.
        /// Exactly-once: returns 1 if this call released it, 0 for null,
        /// unknown, or already released pointers.
        ///
        /// # Safety
        /// `ptr` must be null or a pointer previously returned by a bulk get
        /// of this library that has not been released yet.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $free_array(ptr: *mut std::ffi::c_void) -> i32 {
            unsafe { $crate::capi::release_buffer(ptr) }
        }
    };
}

/// Lazily initialized process-wide bridge, one per variant module.
pub type BoundaryState<K> = Lazy<Mutex<Bridge<K>>>;

/// Planar (2-D) boundary over the reference kernel.
pub mod planar {
    use super::*;

    boundary_api! {
        kernel: ReferenceKernel<Planar>,
        init: bridge2d_init,
        free: bridge2d_free,
        available_handles: bridge2d_get_available_handles,
        max_handles: bridge2d_get_max_handles,
        set_mesh_size: bridge2d_set_mesh_size,
        get_mesh_size: bridge2d_get_mesh_size,
        set_vertex: bridge2d_set_vertex,
        set_vertices: bridge2d_set_vertices,
        get_vertices: bridge2d_get_vertices,
        set_element: bridge2d_set_element,
        set_elements: bridge2d_set_elements,
        get_elements: bridge2d_get_elements,
        set_sol_size: bridge2d_set_sol_size,
        get_sol_size: bridge2d_get_sol_size,
        set_scalar_field: bridge2d_set_scalar_field,
        get_scalar_field: bridge2d_get_scalar_field,
        set_tensor_field: bridge2d_set_tensor_field,
        get_tensor_field: bridge2d_get_tensor_field,
        set_int_parameter: bridge2d_set_int_parameter,
        set_double_parameter: bridge2d_set_double_parameter,
        remesh: bridge2d_remesh,
        quality: bridge2d_quality,
        bulk_quality: bridge2d_bulk_quality,
        load_mesh: bridge2d_load_mesh,
        save_mesh: bridge2d_save_mesh,
        load_sol: bridge2d_load_sol,
        save_sol: bridge2d_save_sol,
        free_array: bridge2d_free_array,
    }
}

/// Volumetric (3-D) boundary over the reference kernel.
pub mod volumetric {
    use super::*;

    boundary_api! {
        kernel: ReferenceKernel<Volumetric>,
        init: bridge3d_init,
        free: bridge3d_free,
        available_handles: bridge3d_get_available_handles,
        max_handles: bridge3d_get_max_handles,
        set_mesh_size: bridge3d_set_mesh_size,
        get_mesh_size: bridge3d_get_mesh_size,
        set_vertex: bridge3d_set_vertex,
        set_vertices: bridge3d_set_vertices,
        get_vertices: bridge3d_get_vertices,
        set_element: bridge3d_set_element,
        set_elements: bridge3d_set_elements,
        get_elements: bridge3d_get_elements,
        set_sol_size: bridge3d_set_sol_size,
        get_sol_size: bridge3d_get_sol_size,
        set_scalar_field: bridge3d_set_scalar_field,
        get_scalar_field: bridge3d_get_scalar_field,
        set_tensor_field: bridge3d_set_tensor_field,
        get_tensor_field: bridge3d_get_tensor_field,
        set_int_parameter: bridge3d_set_int_parameter,
        set_double_parameter: bridge3d_set_double_parameter,
        remesh: bridge3d_remesh,
        quality: bridge3d_quality,
        bulk_quality: bridge3d_bulk_quality,
        load_mesh: bridge3d_load_mesh,
        save_mesh: bridge3d_save_mesh,
        load_sol: bridge3d_load_sol,
        save_sol: bridge3d_save_sol,
        free_array: bridge3d_free_array,
    }
}

/// Surface boundary over the reference kernel.
pub mod surface {
    use super::*;

    boundary_api! {
        kernel: ReferenceKernel<Surface>,
        init: bridges_init,
        free: bridges_free,
        available_handles: bridges_get_available_handles,
        max_handles: bridges_get_max_handles,
        set_mesh_size: bridges_set_mesh_size,
        get_mesh_size: bridges_get_mesh_size,
        set_vertex: bridges_set_vertex,
        set_vertices: bridges_set_vertices,
        get_vertices: bridges_get_vertices,
        set_element: bridges_set_element,
        set_elements: bridges_set_elements,
        get_elements: bridges_get_elements,
        set_sol_size: bridges_set_sol_size,
        get_sol_size: bridges_get_sol_size,
        set_scalar_field: bridges_set_scalar_field,
        get_scalar_field: bridges_get_scalar_field,
        set_tensor_field: bridges_set_tensor_field,
        get_tensor_field: bridges_get_tensor_field,
        set_int_parameter: bridges_set_int_parameter,
        set_double_parameter: bridges_set_double_parameter,
        remesh: bridges_remesh,
        quality: bridges_quality,
        bulk_quality: bridges_bulk_quality,
        load_mesh: bridges_load_mesh,
        save_mesh: bridges_save_mesh,
        load_sol: bridges_load_sol,
        save_sol: bridges_save_sol,
        free_array: bridges_free_array,
    }
}
