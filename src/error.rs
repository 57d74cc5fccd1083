//! `BridgeError`: unified error type for the mesh-bridge public APIs.
//!
//! Every fallible operation in this crate reports through this enum; nothing
//! in non-test code panics across the boundary. The `capi` layer maps each
//! variant onto the flat boundary's sentinel values (`0`, `-1`, null, `0.0`),
//! so embedders driving the safe [`Bridge`](crate::bridge::Bridge) API get the
//! full taxonomy while foreign callers get uniform failure codes.

use crate::kernel::{KernelIndex, SolKind};
use crate::variant::EntityKind;
use thiserror::Error;

/// Unified error type for mesh-bridge operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// Handle is out of range, inactive, or stale (generation mismatch).
    /// All three are rejected uniformly: the handle is not usable.
    #[error("invalid or stale mesh handle {0}")]
    InvalidHandle(i32),
    /// No free slot remains in the handle table.
    #[error("handle table exhausted (capacity {capacity})")]
    TableExhausted { capacity: usize },
    /// Requested table capacity exceeds the packable slot range.
    #[error("handle table capacity {requested} exceeds addressable maximum {max}")]
    CapacityTooLarge { requested: usize, max: usize },
    /// The kernel's construction protocol failed; no slot was consumed.
    #[error("kernel construction failed: {0}")]
    ConstructionFailed(String),
    /// A flat-buffer allocation failed during marshalling. All buffers
    /// allocated earlier in the same call have been released.
    #[error("flat buffer allocation of {elements} elements failed")]
    AllocationFailed { elements: usize },
    /// A caller-supplied flat buffer has the wrong length for the declared
    /// entity count and stride.
    #[error("flat buffer length {found} does not match expected {expected}")]
    SizeMismatch { expected: usize, found: usize },
    /// The entity kind is not part of this mesh variant's descriptor set.
    #[error("entity kind {0:?} is not part of this mesh variant")]
    UnsupportedEntity(EntityKind),
    /// A 1-based entity position lies outside the declared count.
    #[error("entity position {pos} outside declared range 1..={count}")]
    PositionOutOfRange { pos: KernelIndex, count: KernelIndex },
    /// Connectivity references a vertex outside the declared vertex range.
    #[error("connectivity references vertex {node} outside 1..={vertices}")]
    NodeOutOfRange { node: KernelIndex, vertices: KernelIndex },
    /// The attached field holds a different solution kind than requested.
    #[error("solution field is {found:?}, expected {expected:?}")]
    SolKindMismatch { expected: SolKind, found: SolKind },
    /// Field data was set or queried before `set_sol_size` declared it.
    #[error("solution size has not been declared")]
    SolUndeclared,
    /// The remeshing kernel reported a nonzero completion code.
    #[error("remeshing kernel failed with code {code}")]
    RemeshFailed { code: i32 },
    /// Any other kernel-reported failure, passed through uninterpreted.
    #[error("kernel operation failed: {0}")]
    Kernel(String),
    /// An I/O passthrough (load/save) failed.
    #[error("i/o failure on `{path}`: {message}")]
    Io { path: String, message: String },
    /// A mesh or solution file could not be parsed by the kernel.
    #[error("malformed file `{path}`: {message}")]
    MalformedFile { path: String, message: String },
}
