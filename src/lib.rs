//! # mesh-bridge
//!
//! mesh-bridge is a handle-indirection and bulk-marshalling layer that
//! exposes an opaque mesh/solution pair to foreign callers whose invocation
//! convention only supports fixed positional argument lists of primitive
//! scalars and flat buffers. It provides a fixed-capacity handle table with
//! explicit lifecycle control, a marshalling discipline between the kernel's
//! non-contiguous internal storage and flat boundary arrays, and a strict
//! ownership-transfer convention for every buffer that crosses the boundary.
//!
//! ## Features
//! - Generational handles: a freed handle value can never alias a newer
//!   instance bound into the same slot
//! - One generic boundary pattern parameterized by entity-kind descriptors;
//!   the planar, volumetric, and surface instantiations are declarative
//!   tables, not copies
//! - All-or-nothing multi-buffer allocation with automatic rollback on the
//!   bulk get path
//! - An injectable [`Bridge`](bridge::Bridge) context for embedders, plus a
//!   process-wide `extern "C"` surface per variant for callers that cannot
//!   hold a context
//! - An in-memory reference kernel implementing the full
//!   [`RemeshKernel`](kernel::RemeshKernel) contract for tests and defaults
//!
//! ## Boundary model
//! Strictly synchronous and single-caller per handle: every operation
//! completes before returning, nothing is retried, and no panic crosses the
//! boundary — failures surface as `Result` in the safe API and as sentinel
//! values (`0`, `-1`, null, `0.0`) at the `extern "C"` rim. All entity
//! indices at the boundary are 1-based, matching the native kernel
//! convention.
//!
//! ## Usage
//! ```rust
//! use mesh_bridge::prelude::*;
//!
//! # fn main() -> Result<(), mesh_bridge::error::BridgeError> {
//! let mut bridge: Bridge<ReferenceKernel<Planar>> = Bridge::new();
//! let h = bridge.init()?;
//! bridge.set_mesh_size(h, &[4, 2, 0, 0])?;
//! bridge.set_vertices(h, &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0], None)?;
//! bridge.set_elements(h, EntityKind::Triangle, &[1, 2, 3, 1, 3, 4], None)?;
//! assert!(bridge.quality(h, 1) > 0.0);
//! let verts = bridge.vertices(h)?.expect("four vertices declared");
//! assert_eq!(verts.count, 4);
//! bridge.free(h)?;
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod capi;
pub mod error;
pub mod handle;
pub mod kernel;
pub mod marshal;
pub mod variant;

/// A convenient prelude to import the most-used traits and types.
pub mod prelude {
    pub use crate::bridge::Bridge;
    pub use crate::error::BridgeError;
    pub use crate::handle::{Handle, HandleTable};
    pub use crate::kernel::reference::ReferenceKernel;
    pub use crate::kernel::{KernelIndex, MeshCounts, RemeshKernel, SolKind};
    pub use crate::marshal::BulkData;
    pub use crate::variant::{
        EntityKind, Planar, SideChannel, Surface, VariantDescriptor, VariantKind, Volumetric,
    };
}
