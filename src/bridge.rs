//! `Bridge`: the handle-indirected boundary context.
//!
//! A `Bridge<K>` owns one [`HandleTable`] of kernel instances and implements
//! every boundary operation over it: lifecycle, size declaration, single and
//! bulk entity access, field access, parameters, quality queries, remeshing,
//! and I/O passthrough. It is an explicit, embedder-owned resource — build as
//! many independent bridges as you need (one per worker, one per test) rather
//! than sharing ambient process state; the `capi` layer wraps one bridge per
//! variant in a lazily initialized global for foreign callers that cannot
//! hold a context.
//!
//! Every operation validates the handle first and fails without touching any
//! state on a bad one. Bulk gets follow the marshalling discipline in
//! [`marshal`](crate::marshal): all required buffers are allocated
//! all-or-nothing, the kernel fills them in one call, and only the data
//! buffer is promoted to the caller — `Ok(None)` means "no data", which is
//! not an error.

use crate::error::BridgeError;
use crate::handle::{Handle, HandleTable};
use crate::kernel::{KernelIndex, MeshCounts, RemeshKernel, SolKind};
use crate::marshal::{self, BulkData};
use crate::variant::EntityKind;
use std::path::Path;

/// Handle-indirected access to a set of kernel instances.
pub struct Bridge<K: RemeshKernel> {
    table: HandleTable<K>,
}

impl<K: RemeshKernel> Default for Bridge<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: RemeshKernel> Bridge<K> {
    /// Bridge with the default capacity of 64 concurrent instances.
    pub fn new() -> Self {
        Bridge { table: HandleTable::new() }
    }

    /// Bridge with an explicit hard capacity.
    pub fn with_capacity(capacity: usize) -> Result<Self, BridgeError> {
        Ok(Bridge { table: HandleTable::with_capacity(capacity)? })
    }

    // --- lifecycle -------------------------------------------------------

    /// Create a fresh instance: reserve a slot, run the kernel construction
    /// protocol, bind. A failed construction returns the reserved slot to
    /// the free pool, so exhaustion accounting stays exact.
    pub fn init(&mut self) -> Result<Handle, BridgeError> {
        let reservation = self.table.reserve()?;
        let kernel = K::create()?;
        let handle = reservation.bind(kernel);
        log::debug!("bound kernel instance to handle {handle}");
        Ok(handle)
    }

    /// Destroy the instance behind `handle`. The mesh/field pair drops as a
    /// whole; the slot generation advances so the handle value goes stale.
    pub fn free(&mut self, handle: Handle) -> Result<(), BridgeError> {
        let kernel = self.table.release(handle)?;
        drop(kernel);
        log::debug!("released handle {handle}");
        Ok(())
    }

    /// Whether `handle` refers to a live instance.
    pub fn is_valid(&self, handle: Handle) -> bool {
        self.table.is_valid(handle)
    }

    /// Free slots remaining.
    pub fn available_handles(&self) -> usize {
        self.table.available()
    }

    /// Live instances.
    pub fn active_handles(&self) -> usize {
        self.table.active()
    }

    /// Hard ceiling on concurrent instances.
    pub fn max_handles(&self) -> usize {
        self.table.capacity()
    }

    // --- size declaration ------------------------------------------------

    /// Declare entity counts (vertex count first, then one count per element
    /// kind in descriptor order) and allocate kernel storage.
    pub fn set_mesh_size(
        &mut self,
        handle: Handle,
        counts: &[KernelIndex],
    ) -> Result<(), BridgeError> {
        let kernel = self.table.get_mut(handle)?;
        let counts = MeshCounts::from_slice(kernel.descriptor(), counts)?;
        kernel.set_mesh_size(&counts)
    }

    /// Current declared counts.
    pub fn mesh_size(&self, handle: Handle) -> Result<MeshCounts, BridgeError> {
        self.table.get(handle)?.mesh_counts()
    }

    // --- single-entity accessors ----------------------------------------

    /// Set one vertex at 1-based `pos`.
    pub fn set_vertex(
        &mut self,
        handle: Handle,
        coords: &[f64],
        vertex_ref: KernelIndex,
        pos: KernelIndex,
    ) -> Result<(), BridgeError> {
        self.table.get_mut(handle)?.set_vertex(coords, vertex_ref, pos)
    }

    /// Set one element of `kind` at 1-based `pos`. Connectivity ranges are
    /// forwarded untouched; validation is the kernel's business.
    pub fn set_element(
        &mut self,
        handle: Handle,
        kind: EntityKind,
        nodes: &[KernelIndex],
        element_ref: KernelIndex,
        pos: KernelIndex,
    ) -> Result<(), BridgeError> {
        self.table.get_mut(handle)?.set_element(kind, nodes, element_ref, pos)
    }

    // --- bulk marshalling ------------------------------------------------

    /// Bulk vertex set: the flat coordinate buffer and optional parallel
    /// reference tags are forwarded to the kernel's strided decoder; absent
    /// tags mean tag 0.
    pub fn set_vertices(
        &mut self,
        handle: Handle,
        coords: &[f64],
        refs: Option<&[KernelIndex]>,
    ) -> Result<(), BridgeError> {
        self.table.get_mut(handle)?.set_vertices(coords, refs)
    }

    /// Bulk vertex get: a freshly allocated `vertex_dim × count` coordinate
    /// buffer, or `None` when no vertices are declared.
    pub fn vertices(&self, handle: Handle) -> Result<Option<BulkData<f64>>, BridgeError> {
        let kernel = self.table.get(handle)?;
        let descriptor = kernel.descriptor();
        let count = kernel.mesh_counts()?.vertices();
        if count == 0 {
            return Ok(None);
        }
        let entities = count as usize;
        let mut coords = marshal::try_buffer::<f64>(entities * descriptor.vertex_dim)?;
        let mut sides = marshal::try_side_buffers(descriptor.vertex_side_channels, entities)?;
        kernel.get_vertices(&mut coords, &mut sides)?;
        Ok(Some(BulkData { values: coords, count }))
    }

    /// Bulk element set for one entity kind.
    pub fn set_elements(
        &mut self,
        handle: Handle,
        kind: EntityKind,
        connectivity: &[KernelIndex],
        refs: Option<&[KernelIndex]>,
    ) -> Result<(), BridgeError> {
        self.table.get_mut(handle)?.set_elements(kind, connectivity, refs)
    }

    /// Bulk element get: a freshly allocated `stride × count` connectivity
    /// buffer, or `None` when the kind has no entities.
    pub fn elements(
        &self,
        handle: Handle,
        kind: EntityKind,
    ) -> Result<Option<BulkData<KernelIndex>>, BridgeError> {
        let kernel = self.table.get(handle)?;
        let descriptor = kernel.descriptor();
        let element = descriptor
            .element(kind)
            .ok_or(BridgeError::UnsupportedEntity(kind))?;
        let count = kernel
            .mesh_counts()?
            .element(descriptor, kind)
            .unwrap_or(0);
        if count == 0 {
            return Ok(None);
        }
        let entities = count as usize;
        let mut connectivity = marshal::try_buffer::<KernelIndex>(entities * element.stride())?;
        let mut sides = marshal::try_side_buffers(element.side_channels, entities)?;
        kernel.get_elements(kind, &mut connectivity, &mut sides)?;
        Ok(Some(BulkData { values: connectivity, count }))
    }

    // --- solution field --------------------------------------------------

    /// Declare the field's kind and entity count.
    pub fn set_sol_size(
        &mut self,
        handle: Handle,
        kind: SolKind,
        entities: KernelIndex,
    ) -> Result<(), BridgeError> {
        self.table.get_mut(handle)?.set_sol_size(kind, entities)
    }

    /// Current field declaration.
    pub fn sol_size(&self, handle: Handle) -> Result<(SolKind, KernelIndex), BridgeError> {
        self.table.get(handle)?.sol_size()
    }

    /// Bulk scalar field set; one value per declared entity.
    pub fn set_scalar_field(&mut self, handle: Handle, values: &[f64]) -> Result<(), BridgeError> {
        self.table.get_mut(handle)?.set_scalar_field(values)
    }

    /// Bulk scalar field get, `None` when the declared count is zero.
    pub fn scalar_field(&self, handle: Handle) -> Result<Option<BulkData<f64>>, BridgeError> {
        self.field(handle, SolKind::Scalar)
    }

    /// Bulk tensor field set; `tensor_components` values per entity in
    /// symmetric-matrix order.
    pub fn set_tensor_field(&mut self, handle: Handle, values: &[f64]) -> Result<(), BridgeError> {
        self.table.get_mut(handle)?.set_tensor_field(values)
    }

    /// Bulk tensor field get; `count` is entities, not values.
    pub fn tensor_field(&self, handle: Handle) -> Result<Option<BulkData<f64>>, BridgeError> {
        self.field(handle, SolKind::Tensor)
    }

    fn field(
        &self,
        handle: Handle,
        kind: SolKind,
    ) -> Result<Option<BulkData<f64>>, BridgeError> {
        let kernel = self.table.get(handle)?;
        let (declared, entities) = kernel.sol_size()?;
        if declared != kind {
            return Err(BridgeError::SolKindMismatch { expected: kind, found: declared });
        }
        if entities == 0 {
            return Ok(None);
        }
        let components = kind.components(kernel.descriptor());
        let mut values = marshal::try_buffer::<f64>(entities as usize * components)?;
        match kind {
            SolKind::Scalar => kernel.get_scalar_field(&mut values)?,
            SolKind::Tensor => kernel.get_tensor_field(&mut values)?,
        }
        Ok(Some(BulkData { values, count: entities }))
    }

    // --- parameters ------------------------------------------------------

    /// Integer parameter passthrough; the id space is kernel-defined.
    pub fn set_int_parameter(
        &mut self,
        handle: Handle,
        id: i32,
        value: KernelIndex,
    ) -> Result<(), BridgeError> {
        self.table.get_mut(handle)?.set_int_parameter(id, value)
    }

    /// Double parameter passthrough.
    pub fn set_double_parameter(
        &mut self,
        handle: Handle,
        id: i32,
        value: f64,
    ) -> Result<(), BridgeError> {
        self.table.get_mut(handle)?.set_double_parameter(id, value)
    }

    // --- quality ---------------------------------------------------------

    /// Quality of the quality-element at 1-based `index`, in [0, 1];
    /// 0.0 for an invalid handle or index.
    pub fn quality(&self, handle: Handle, index: KernelIndex) -> f64 {
        match self.table.get(handle) {
            Ok(kernel) => kernel.element_quality(index),
            Err(_) => 0.0,
        }
    }

    /// Qualities of every quality-element, one freshly allocated buffer;
    /// `None` when the mesh has none.
    pub fn qualities(&self, handle: Handle) -> Result<Option<BulkData<f64>>, BridgeError> {
        let kernel = self.table.get(handle)?;
        let descriptor = kernel.descriptor();
        let count = kernel
            .mesh_counts()?
            .element(descriptor, descriptor.quality_element)
            .unwrap_or(0);
        if count == 0 {
            return Ok(None);
        }
        let mut values = marshal::try_buffer::<f64>(count as usize)?;
        for (i, out) in values.iter_mut().enumerate() {
            *out = kernel.element_quality(i as KernelIndex + 1);
        }
        Ok(Some(BulkData { values, count }))
    }

    // --- execution and I/O passthrough -----------------------------------

    /// Run the remeshing algorithm on the instance, in place.
    pub fn remesh(&mut self, handle: Handle) -> Result<(), BridgeError> {
        self.table.get_mut(handle)?.remesh()
    }

    /// Load a mesh file into the instance, delegated verbatim.
    pub fn load_mesh(&mut self, handle: Handle, path: &Path) -> Result<(), BridgeError> {
        self.table.get_mut(handle)?.load_mesh(path)
    }

    /// Save the instance's mesh, delegated verbatim.
    pub fn save_mesh(&self, handle: Handle, path: &Path) -> Result<(), BridgeError> {
        self.table.get(handle)?.save_mesh(path)
    }

    /// Load a solution file into the instance's field.
    pub fn load_sol(&mut self, handle: Handle, path: &Path) -> Result<(), BridgeError> {
        self.table.get_mut(handle)?.load_sol(path)
    }

    /// Save the instance's field.
    pub fn save_sol(&self, handle: Handle, path: &Path) -> Result<(), BridgeError> {
        self.table.get(handle)?.save_sol(path)
    }
}
