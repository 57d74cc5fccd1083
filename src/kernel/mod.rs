//! The external remeshing kernel, specified at the interface.
//!
//! The bridge treats the mesh-processing kernel — element quality, the
//! remeshing algorithm itself, file parsing, the native construction
//! protocol — as an opaque collaborator behind [`RemeshKernel`]. One trait
//! value is one *instance*: the jointly owned {mesh, field} pair, created
//! whole by [`RemeshKernel::create`] and destroyed whole by `Drop`.
//!
//! Strides and side channels are declared by the instance's
//! [`VariantDescriptor`]; the bridge sizes every flat buffer from it and the
//! kernel is trusted to do the strided decoding on bulk sets. All entity
//! positions and connectivity values are 1-based, matching the native
//! convention; the bridge never renumbers.

use crate::error::BridgeError;
use crate::variant::{EntityKind, VariantDescriptor};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod reference;

/// Index type crossing the flat boundary. The boundary casts between this
/// and C `int`, so it must stay 32-bit.
pub type KernelIndex = i32;

static_assertions::assert_eq_size!(KernelIndex, i32, u32);

/// Kind of the per-vertex solution field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolKind {
    /// One value per vertex.
    Scalar,
    /// Symmetric-matrix tensor: 3 components per vertex in planar meshes,
    /// 6 in volumetric and surface meshes.
    Tensor,
}

impl SolKind {
    /// Components per vertex under `descriptor`.
    pub fn components(self, descriptor: &VariantDescriptor) -> usize {
        match self {
            SolKind::Scalar => 1,
            SolKind::Tensor => descriptor.tensor_components,
        }
    }

    /// Integer code at the flat boundary (native convention: 1 scalar,
    /// 3 tensor).
    pub const fn code(self) -> i32 {
        match self {
            SolKind::Scalar => 1,
            SolKind::Tensor => 3,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(SolKind::Scalar),
            3 => Some(SolKind::Tensor),
            _ => None,
        }
    }
}

/// Declared entity counts: the vertex count followed by one count per element
/// kind, in the variant descriptor's declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshCounts(Vec<KernelIndex>);

impl MeshCounts {
    /// Build from a flat count vector, validated against the descriptor's
    /// arity and non-negativity.
    pub fn from_slice(
        descriptor: &VariantDescriptor,
        counts: &[KernelIndex],
    ) -> Result<Self, BridgeError> {
        if counts.len() != descriptor.count_arity() {
            return Err(BridgeError::SizeMismatch {
                expected: descriptor.count_arity(),
                found: counts.len(),
            });
        }
        if counts.iter().any(|&c| c < 0) {
            return Err(BridgeError::Kernel("negative entity count".into()));
        }
        Ok(MeshCounts(counts.to_vec()))
    }

    /// Declared vertex count.
    pub fn vertices(&self) -> KernelIndex {
        self.0.first().copied().unwrap_or(0)
    }

    /// Declared count for one element kind, `None` if the variant lacks it.
    pub fn element(
        &self,
        descriptor: &VariantDescriptor,
        kind: EntityKind,
    ) -> Option<KernelIndex> {
        let idx = descriptor.element_index(kind)?;
        self.0.get(1 + idx).copied()
    }

    /// The flat count vector, vertex count first.
    pub fn as_slice(&self) -> &[KernelIndex] {
        &self.0
    }
}

/// The external kernel interface: one value is one live mesh/field pair.
///
/// # Contract
/// - `create` runs the native construction protocol and applies the library's
///   documented default configuration; the pair is destroyed by `Drop`.
/// - Bulk setters receive the caller's flat buffers verbatim (fixed stride
///   per entity, optional parallel reference tags where absence means tag 0)
///   and do their own strided decoding and validation.
/// - Bulk getters fill the data buffer plus one side buffer per channel the
///   descriptor declares for that entity kind, in declaration order. Buffers
///   are pre-sized by the bridge from the current counts.
/// - Failures are reported, not panicked; the bridge propagates them as the
///   operation's failure value.
pub trait RemeshKernel: Sized {
    /// Run the construction protocol and return a fresh instance with
    /// default parameters.
    fn create() -> Result<Self, BridgeError>;

    /// The entity-kind descriptor set of this kernel's variant.
    fn variant() -> &'static VariantDescriptor;

    /// Descriptor of this instance; identical to [`variant`](Self::variant).
    fn descriptor(&self) -> &'static VariantDescriptor {
        Self::variant()
    }

    /// Declare entity counts and allocate native storage for them.
    fn set_mesh_size(&mut self, counts: &MeshCounts) -> Result<(), BridgeError>;
    /// Current declared counts.
    fn mesh_counts(&self) -> Result<MeshCounts, BridgeError>;

    /// Set one vertex at 1-based `pos`; `coords` has `vertex_dim` entries.
    fn set_vertex(
        &mut self,
        coords: &[f64],
        vertex_ref: KernelIndex,
        pos: KernelIndex,
    ) -> Result<(), BridgeError>;
    /// Bulk vertex set from a strided flat buffer.
    fn set_vertices(
        &mut self,
        coords: &[f64],
        refs: Option<&[KernelIndex]>,
    ) -> Result<(), BridgeError>;
    /// Bulk vertex get: fill `coords` and the declared vertex side buffers.
    fn get_vertices(
        &self,
        coords: &mut [f64],
        sides: &mut [Vec<KernelIndex>],
    ) -> Result<(), BridgeError>;

    /// Set one element of `kind` at 1-based `pos`; `nodes` has the kind's
    /// node count.
    fn set_element(
        &mut self,
        kind: EntityKind,
        nodes: &[KernelIndex],
        element_ref: KernelIndex,
        pos: KernelIndex,
    ) -> Result<(), BridgeError>;
    /// Bulk element set from a strided flat connectivity buffer.
    fn set_elements(
        &mut self,
        kind: EntityKind,
        connectivity: &[KernelIndex],
        refs: Option<&[KernelIndex]>,
    ) -> Result<(), BridgeError>;
    /// Bulk element get: fill `connectivity` and the kind's side buffers.
    fn get_elements(
        &self,
        kind: EntityKind,
        connectivity: &mut [KernelIndex],
        sides: &mut [Vec<KernelIndex>],
    ) -> Result<(), BridgeError>;

    /// Declare the solution field's kind and entity count, allocating
    /// storage.
    fn set_sol_size(&mut self, kind: SolKind, entities: KernelIndex) -> Result<(), BridgeError>;
    /// Current solution declaration.
    fn sol_size(&self) -> Result<(SolKind, KernelIndex), BridgeError>;
    /// Bulk scalar field set; one value per declared entity.
    fn set_scalar_field(&mut self, values: &[f64]) -> Result<(), BridgeError>;
    /// Bulk scalar field get into a pre-sized buffer.
    fn get_scalar_field(&self, values: &mut [f64]) -> Result<(), BridgeError>;
    /// Bulk tensor field set; `tensor_components` values per entity.
    fn set_tensor_field(&mut self, values: &[f64]) -> Result<(), BridgeError>;
    /// Bulk tensor field get into a pre-sized buffer.
    fn get_tensor_field(&self, values: &mut [f64]) -> Result<(), BridgeError>;

    /// Integer parameter passthrough; the id space is kernel-defined and
    /// uninterpreted here.
    fn set_int_parameter(&mut self, id: i32, value: KernelIndex) -> Result<(), BridgeError>;
    /// Double parameter passthrough.
    fn set_double_parameter(&mut self, id: i32, value: f64) -> Result<(), BridgeError>;

    /// Quality of the quality-element at 1-based `index`, in [0, 1];
    /// 0.0 for any invalid input.
    fn element_quality(&self, index: KernelIndex) -> f64;

    /// Run the remeshing algorithm in place. A kernel-defined failure is
    /// reported as [`BridgeError::RemeshFailed`] carrying the native code.
    fn remesh(&mut self) -> Result<(), BridgeError>;

    /// Load a mesh file, replacing this instance's mesh.
    fn load_mesh(&mut self, path: &Path) -> Result<(), BridgeError>;
    /// Save the mesh to a file.
    fn save_mesh(&self, path: &Path) -> Result<(), BridgeError>;
    /// Load a solution file, replacing the attached field.
    fn load_sol(&mut self, path: &Path) -> Result<(), BridgeError>;
    /// Save the attached field to a file.
    fn save_sol(&self, path: &Path) -> Result<(), BridgeError>;
}
