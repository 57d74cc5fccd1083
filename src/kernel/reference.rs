//! In-memory reference kernel.
//!
//! A complete [`RemeshKernel`] implementation generic over the three mesh
//! variants, backing the default boundary bindings and the test suite.
//! Storage is deliberately non-contiguous — per-entity structs, not flat
//! arrays — so the bridge's marshalling between internal layout and flat
//! boundary buffers is exercised for real.
//!
//! The remeshing pass is a single Laplacian smoothing sweep: modest, but
//! enough to give the quality and lifecycle plumbing an algorithm with real
//! preconditions. File I/O uses a Medit-flavoured whitespace-separated text
//! format.

use super::{KernelIndex, MeshCounts, RemeshKernel, SolKind};
use crate::error::BridgeError;
use crate::variant::{EntityKind, SideChannel, VariantDescriptor, VariantKind};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::Path;
use std::str::SplitWhitespace;

/// Largest node arity across all element kinds (prisms).
const MAX_NODES: usize = 6;

#[derive(Clone, Copy, Default)]
struct StoredVertex {
    coords: [f64; 3],
    tag: KernelIndex,
    corner: bool,
    required: bool,
}

#[derive(Clone, Copy, Default)]
struct StoredElement {
    nodes: [KernelIndex; MAX_NODES],
    tag: KernelIndex,
    required: bool,
    ridge: bool,
}

#[derive(Clone)]
struct SolField {
    kind: SolKind,
    entities: KernelIndex,
    values: Vec<f64>,
}

/// Reference mesh/field pair for variant `V`.
pub struct ReferenceKernel<V: VariantKind> {
    vertices: Vec<StoredVertex>,
    /// One bucket per element kind, parallel to `DESCRIPTOR.elements`.
    elements: Vec<Vec<StoredElement>>,
    sol: Option<SolField>,
    int_params: HashMap<i32, KernelIndex>,
    double_params: HashMap<i32, f64>,
    _variant: PhantomData<V>,
}

impl<V: VariantKind> ReferenceKernel<V> {
    fn dim(&self) -> usize {
        V::DESCRIPTOR.vertex_dim
    }

    fn bucket(&self, kind: EntityKind) -> Result<usize, BridgeError> {
        V::DESCRIPTOR
            .element_index(kind)
            .ok_or(BridgeError::UnsupportedEntity(kind))
    }

    fn check_len(expected: usize, found: usize) -> Result<(), BridgeError> {
        if expected != found {
            return Err(BridgeError::SizeMismatch { expected, found });
        }
        Ok(())
    }

    fn check_nodes(&self, nodes: &[KernelIndex]) -> Result<(), BridgeError> {
        let vertices = self.vertices.len() as KernelIndex;
        for &node in nodes {
            if node < 1 || node > vertices {
                return Err(BridgeError::NodeOutOfRange { node, vertices });
            }
        }
        Ok(())
    }

    fn vertex_at(&self, node: KernelIndex) -> Option<&StoredVertex> {
        if node < 1 {
            return None;
        }
        self.vertices.get(node as usize - 1)
    }

    fn sol_mut(&mut self, expected: SolKind) -> Result<&mut SolField, BridgeError> {
        let sol = self.sol.as_mut().ok_or(BridgeError::SolUndeclared)?;
        if sol.kind != expected {
            return Err(BridgeError::SolKindMismatch { expected, found: sol.kind });
        }
        Ok(sol)
    }

    fn sol_ref(&self, expected: SolKind) -> Result<&SolField, BridgeError> {
        let sol = self.sol.as_ref().ok_or(BridgeError::SolUndeclared)?;
        if sol.kind != expected {
            return Err(BridgeError::SolKindMismatch { expected, found: sol.kind });
        }
        Ok(sol)
    }

    fn fill_element_sides(
        channels: &[SideChannel],
        elements: &[StoredElement],
        sides: &mut [Vec<KernelIndex>],
    ) -> Result<(), BridgeError> {
        Self::check_len(channels.len(), sides.len())?;
        for (channel, buffer) in channels.iter().zip(sides.iter_mut()) {
            Self::check_len(elements.len(), buffer.len())?;
            for (element, out) in elements.iter().zip(buffer.iter_mut()) {
                *out = match channel {
                    SideChannel::Refs => element.tag,
                    SideChannel::Required => element.required as KernelIndex,
                    SideChannel::Ridges => element.ridge as KernelIndex,
                    SideChannel::Corners => 0,
                };
            }
        }
        Ok(())
    }

    /// Quality of one stored element of the variant's quality kind.
    fn stored_quality(&self, element: &StoredElement) -> f64 {
        let kind = V::DESCRIPTOR.quality_element;
        let arity = kind.node_count();
        let mut points = [[0.0f64; 3]; MAX_NODES];
        for (slot, &node) in points.iter_mut().zip(element.nodes.iter()).take(arity) {
            match self.vertex_at(node) {
                Some(vertex) => *slot = vertex.coords,
                None => return 0.0,
            }
        }
        let quality = match kind {
            EntityKind::Triangle if self.dim() == 2 => {
                triangle_quality_2d(points[0], points[1], points[2])
            }
            EntityKind::Triangle => triangle_quality_3d(points[0], points[1], points[2]),
            EntityKind::Tetrahedron => {
                tetrahedron_quality(points[0], points[1], points[2], points[3])
            }
            _ => 0.0,
        };
        if quality.is_finite() { quality.clamp(0.0, 1.0) } else { 0.0 }
    }
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn norm_sq(a: [f64; 3]) -> f64 {
    dot(a, a)
}

/// Normalized triangle quality `4√3·A / Σl²`: 1 for the equilateral
/// triangle, 0 for degenerate or inverted input. Planar form uses the
/// signed area.
fn triangle_quality_2d(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> f64 {
    let area = 0.5 * ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]));
    let edge_sum = norm_sq(sub(b, a)) + norm_sq(sub(c, b)) + norm_sq(sub(a, c));
    if edge_sum <= 0.0 || area <= 0.0 {
        return 0.0;
    }
    4.0 * 3.0_f64.sqrt() * area / edge_sum
}

/// Surface triangles have no intrinsic orientation here; use the unsigned
/// area from the cross product.
fn triangle_quality_3d(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> f64 {
    let area = 0.5 * norm_sq(cross(sub(b, a), sub(c, a))).sqrt();
    let edge_sum = norm_sq(sub(b, a)) + norm_sq(sub(c, b)) + norm_sq(sub(a, c));
    if edge_sum <= 0.0 || area <= 0.0 {
        return 0.0;
    }
    4.0 * 3.0_f64.sqrt() * area / edge_sum
}

/// Normalized tetrahedron quality `72√3·V / (Σl²)^{3/2}`: 1 for the regular
/// tetrahedron, 0 for degenerate or inverted input.
fn tetrahedron_quality(a: [f64; 3], b: [f64; 3], c: [f64; 3], d: [f64; 3]) -> f64 {
    let volume = dot(sub(b, a), cross(sub(c, a), sub(d, a))) / 6.0;
    let edge_sum = norm_sq(sub(b, a))
        + norm_sq(sub(c, a))
        + norm_sq(sub(d, a))
        + norm_sq(sub(c, b))
        + norm_sq(sub(d, b))
        + norm_sq(sub(d, c));
    if edge_sum <= 0.0 || volume <= 0.0 {
        return 0.0;
    }
    72.0 * 3.0_f64.sqrt() * volume / edge_sum.powf(1.5)
}

impl<V: VariantKind> RemeshKernel for ReferenceKernel<V> {
    fn create() -> Result<Self, BridgeError> {
        log::debug!("constructing {} reference kernel", V::DESCRIPTOR.name);
        Ok(ReferenceKernel {
            vertices: Vec::new(),
            elements: vec![Vec::new(); V::DESCRIPTOR.elements.len()],
            sol: None,
            int_params: HashMap::new(),
            double_params: HashMap::new(),
            _variant: PhantomData,
        })
    }

    fn variant() -> &'static VariantDescriptor {
        V::DESCRIPTOR
    }

    fn set_mesh_size(&mut self, counts: &MeshCounts) -> Result<(), BridgeError> {
        // Re-declaration resets entity content; the attached field keeps its
        // own declaration.
        self.vertices = vec![StoredVertex::default(); counts.vertices() as usize];
        for (bucket, element) in self.elements.iter_mut().zip(V::DESCRIPTOR.elements) {
            let count = counts
                .element(V::DESCRIPTOR, element.kind)
                .unwrap_or(0) as usize;
            *bucket = vec![StoredElement::default(); count];
        }
        Ok(())
    }

    fn mesh_counts(&self) -> Result<MeshCounts, BridgeError> {
        let mut counts = Vec::with_capacity(V::DESCRIPTOR.count_arity());
        counts.push(self.vertices.len() as KernelIndex);
        counts.extend(self.elements.iter().map(|b| b.len() as KernelIndex));
        MeshCounts::from_slice(V::DESCRIPTOR, &counts)
    }

    fn set_vertex(
        &mut self,
        coords: &[f64],
        vertex_ref: KernelIndex,
        pos: KernelIndex,
    ) -> Result<(), BridgeError> {
        let dim = self.dim();
        Self::check_len(dim, coords.len())?;
        let count = self.vertices.len() as KernelIndex;
        if pos < 1 || pos > count {
            return Err(BridgeError::PositionOutOfRange { pos, count });
        }
        let vertex = &mut self.vertices[pos as usize - 1];
        vertex.coords[..dim].copy_from_slice(coords);
        vertex.tag = vertex_ref;
        Ok(())
    }

    fn set_vertices(
        &mut self,
        coords: &[f64],
        refs: Option<&[KernelIndex]>,
    ) -> Result<(), BridgeError> {
        let dim = self.dim();
        Self::check_len(self.vertices.len() * dim, coords.len())?;
        if let Some(refs) = refs {
            Self::check_len(self.vertices.len(), refs.len())?;
        }
        for (i, (vertex, chunk)) in self
            .vertices
            .iter_mut()
            .zip(coords.chunks_exact(dim))
            .enumerate()
        {
            vertex.coords[..dim].copy_from_slice(chunk);
            vertex.tag = refs.map_or(0, |r| r[i]);
        }
        Ok(())
    }

    fn get_vertices(
        &self,
        coords: &mut [f64],
        sides: &mut [Vec<KernelIndex>],
    ) -> Result<(), BridgeError> {
        let dim = self.dim();
        Self::check_len(self.vertices.len() * dim, coords.len())?;
        for (vertex, chunk) in self.vertices.iter().zip(coords.chunks_exact_mut(dim)) {
            chunk.copy_from_slice(&vertex.coords[..dim]);
        }
        let channels = V::DESCRIPTOR.vertex_side_channels;
        Self::check_len(channels.len(), sides.len())?;
        for (channel, buffer) in channels.iter().zip(sides.iter_mut()) {
            Self::check_len(self.vertices.len(), buffer.len())?;
            for (vertex, out) in self.vertices.iter().zip(buffer.iter_mut()) {
                *out = match channel {
                    SideChannel::Refs => vertex.tag,
                    SideChannel::Corners => vertex.corner as KernelIndex,
                    SideChannel::Required => vertex.required as KernelIndex,
                    SideChannel::Ridges => 0,
                };
            }
        }
        Ok(())
    }

    fn set_element(
        &mut self,
        kind: EntityKind,
        nodes: &[KernelIndex],
        element_ref: KernelIndex,
        pos: KernelIndex,
    ) -> Result<(), BridgeError> {
        let bucket = self.bucket(kind)?;
        Self::check_len(kind.node_count(), nodes.len())?;
        self.check_nodes(nodes)?;
        let count = self.elements[bucket].len() as KernelIndex;
        if pos < 1 || pos > count {
            return Err(BridgeError::PositionOutOfRange { pos, count });
        }
        let element = &mut self.elements[bucket][pos as usize - 1];
        element.nodes[..nodes.len()].copy_from_slice(nodes);
        element.tag = element_ref;
        Ok(())
    }

    fn set_elements(
        &mut self,
        kind: EntityKind,
        connectivity: &[KernelIndex],
        refs: Option<&[KernelIndex]>,
    ) -> Result<(), BridgeError> {
        let bucket = self.bucket(kind)?;
        let stride = kind.node_count();
        let count = self.elements[bucket].len();
        Self::check_len(count * stride, connectivity.len())?;
        if let Some(refs) = refs {
            Self::check_len(count, refs.len())?;
        }
        self.check_nodes(connectivity)?;
        for (i, chunk) in connectivity.chunks_exact(stride).enumerate() {
            let element = &mut self.elements[bucket][i];
            element.nodes[..stride].copy_from_slice(chunk);
            element.tag = refs.map_or(0, |r| r[i]);
        }
        Ok(())
    }

    fn get_elements(
        &self,
        kind: EntityKind,
        connectivity: &mut [KernelIndex],
        sides: &mut [Vec<KernelIndex>],
    ) -> Result<(), BridgeError> {
        let bucket = self.bucket(kind)?;
        let stride = kind.node_count();
        let elements = &self.elements[bucket];
        Self::check_len(elements.len() * stride, connectivity.len())?;
        for (element, chunk) in elements.iter().zip(connectivity.chunks_exact_mut(stride)) {
            chunk.copy_from_slice(&element.nodes[..stride]);
        }
        let channels = V::DESCRIPTOR
            .element(kind)
            .ok_or(BridgeError::UnsupportedEntity(kind))?
            .side_channels;
        Self::fill_element_sides(channels, elements, sides)
    }

    fn set_sol_size(&mut self, kind: SolKind, entities: KernelIndex) -> Result<(), BridgeError> {
        if entities < 0 {
            return Err(BridgeError::Kernel("negative solution size".into()));
        }
        let components = kind.components(V::DESCRIPTOR);
        self.sol = Some(SolField {
            kind,
            entities,
            values: crate::marshal::try_buffer(entities as usize * components)?,
        });
        Ok(())
    }

    fn sol_size(&self) -> Result<(SolKind, KernelIndex), BridgeError> {
        let sol = self.sol.as_ref().ok_or(BridgeError::SolUndeclared)?;
        Ok((sol.kind, sol.entities))
    }

    fn set_scalar_field(&mut self, values: &[f64]) -> Result<(), BridgeError> {
        let sol = self.sol_mut(SolKind::Scalar)?;
        Self::check_len(sol.values.len(), values.len())?;
        sol.values.copy_from_slice(values);
        Ok(())
    }

    fn get_scalar_field(&self, values: &mut [f64]) -> Result<(), BridgeError> {
        let sol = self.sol_ref(SolKind::Scalar)?;
        Self::check_len(sol.values.len(), values.len())?;
        values.copy_from_slice(&sol.values);
        Ok(())
    }

    fn set_tensor_field(&mut self, values: &[f64]) -> Result<(), BridgeError> {
        let sol = self.sol_mut(SolKind::Tensor)?;
        Self::check_len(sol.values.len(), values.len())?;
        sol.values.copy_from_slice(values);
        Ok(())
    }

    fn get_tensor_field(&self, values: &mut [f64]) -> Result<(), BridgeError> {
        let sol = self.sol_ref(SolKind::Tensor)?;
        Self::check_len(sol.values.len(), values.len())?;
        values.copy_from_slice(&sol.values);
        Ok(())
    }

    fn set_int_parameter(&mut self, id: i32, value: KernelIndex) -> Result<(), BridgeError> {
        self.int_params.insert(id, value);
        Ok(())
    }

    fn set_double_parameter(&mut self, id: i32, value: f64) -> Result<(), BridgeError> {
        self.double_params.insert(id, value);
        Ok(())
    }

    fn element_quality(&self, index: KernelIndex) -> f64 {
        let Ok(bucket) = self.bucket(V::DESCRIPTOR.quality_element) else {
            return 0.0;
        };
        if index < 1 {
            return 0.0;
        }
        match self.elements[bucket].get(index as usize - 1) {
            Some(element) => self.stored_quality(element),
            None => 0.0,
        }
    }

    fn remesh(&mut self) -> Result<(), BridgeError> {
        if self.vertices.is_empty() {
            return Err(BridgeError::RemeshFailed { code: 1 });
        }
        let quality_bucket = self.bucket(V::DESCRIPTOR.quality_element)?;
        let arity = V::DESCRIPTOR.quality_element.node_count();
        let vertex_count = self.vertices.len();

        // Vertices pinned in place: required, corners, and anything an edge
        // element references (the discrete boundary).
        let mut fixed = vec![false; vertex_count];
        for (flag, vertex) in fixed.iter_mut().zip(&self.vertices) {
            *flag = vertex.required || vertex.corner;
        }
        if let Ok(edge_bucket) = self.bucket(EntityKind::Edge) {
            for element in &self.elements[edge_bucket] {
                for &node in &element.nodes[..EntityKind::Edge.node_count()] {
                    if node >= 1 {
                        fixed[node as usize - 1] = true;
                    }
                }
            }
        }

        // Vertex adjacency and incidence over the quality elements.
        let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); vertex_count];
        let mut incident: Vec<Vec<usize>> = vec![Vec::new(); vertex_count];
        for (e, element) in self.elements[quality_bucket].iter().enumerate() {
            let nodes = &element.nodes[..arity];
            // Declared-but-unset elements still hold node 0; skip them.
            if nodes.iter().any(|&n| n < 1) {
                continue;
            }
            for &node in nodes {
                let v = node as usize - 1;
                incident[v].push(e);
                for &other in nodes {
                    let w = other as usize - 1;
                    if w != v && !neighbors[v].contains(&w) {
                        neighbors[v].push(w);
                    }
                }
            }
        }

        let mut moved = 0usize;
        for v in 0..vertex_count {
            if fixed[v] || neighbors[v].is_empty() {
                continue;
            }
            let dim = self.dim();
            let mut centroid = [0.0f64; 3];
            for &w in &neighbors[v] {
                for (c, x) in centroid.iter_mut().zip(self.vertices[w].coords) {
                    *c += x;
                }
            }
            let inv = 1.0 / neighbors[v].len() as f64;
            centroid.iter_mut().for_each(|c| *c *= inv);
            centroid[dim..].iter_mut().for_each(|c| *c = 0.0);

            let previous = self.vertices[v].coords;
            self.vertices[v].coords = centroid;
            let degenerated = incident[v]
                .iter()
                .any(|&e| self.stored_quality(&self.elements[quality_bucket][e]) <= 0.0);
            if degenerated {
                self.vertices[v].coords = previous;
            } else {
                moved += 1;
            }
        }
        log::debug!(
            "{} remesh pass moved {moved} of {vertex_count} vertices",
            V::DESCRIPTOR.name
        );
        Ok(())
    }

    fn load_mesh(&mut self, path: &Path) -> Result<(), BridgeError> {
        io::load_mesh(self, path)
    }

    fn save_mesh(&self, path: &Path) -> Result<(), BridgeError> {
        io::save_mesh(self, path)
    }

    fn load_sol(&mut self, path: &Path) -> Result<(), BridgeError> {
        io::load_sol(self, path)
    }

    fn save_sol(&self, path: &Path) -> Result<(), BridgeError> {
        io::save_sol(self, path)
    }
}

/// Medit-flavoured text I/O for the reference kernel.
mod io {
    use super::*;
    use std::fmt::Write as _;
    use std::fs;

    fn keyword(kind: EntityKind) -> &'static str {
        match kind {
            EntityKind::Vertex => "Vertices",
            EntityKind::Edge => "Edges",
            EntityKind::Triangle => "Triangles",
            EntityKind::Quadrilateral => "Quadrilaterals",
            EntityKind::Tetrahedron => "Tetrahedra",
            EntityKind::Prism => "Prisms",
        }
    }

    fn kind_for_keyword(word: &str) -> Option<EntityKind> {
        match word {
            "Edges" => Some(EntityKind::Edge),
            "Triangles" => Some(EntityKind::Triangle),
            "Quadrilaterals" => Some(EntityKind::Quadrilateral),
            "Tetrahedra" => Some(EntityKind::Tetrahedron),
            "Prisms" => Some(EntityKind::Prism),
            _ => None,
        }
    }

    fn io_error(path: &Path, err: std::io::Error) -> BridgeError {
        BridgeError::Io { path: path.display().to_string(), message: err.to_string() }
    }

    fn malformed(path: &Path, message: impl Into<String>) -> BridgeError {
        BridgeError::MalformedFile {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    struct Tokens<'a> {
        iter: SplitWhitespace<'a>,
        path: &'a Path,
    }

    impl<'a> Tokens<'a> {
        fn next(&mut self) -> Result<&'a str, BridgeError> {
            self.iter
                .next()
                .ok_or_else(|| malformed(self.path, "unexpected end of file"))
        }

        fn next_index(&mut self) -> Result<KernelIndex, BridgeError> {
            let token = self.next()?;
            token
                .parse()
                .map_err(|_| malformed(self.path, format!("expected integer, found `{token}`")))
        }

        fn next_f64(&mut self) -> Result<f64, BridgeError> {
            let token = self.next()?;
            token
                .parse()
                .map_err(|_| malformed(self.path, format!("expected number, found `{token}`")))
        }
    }

    pub(super) fn save_mesh<V: VariantKind>(
        kernel: &ReferenceKernel<V>,
        path: &Path,
    ) -> Result<(), BridgeError> {
        let dim = kernel.dim();
        let mut out = String::new();
        let _ = writeln!(out, "MeshVersionFormatted 2");
        let _ = writeln!(out, "Dimension\n{dim}");
        let _ = writeln!(out, "Vertices\n{}", kernel.vertices.len());
        for vertex in &kernel.vertices {
            for coord in &vertex.coords[..dim] {
                let _ = write!(out, "{coord} ");
            }
            let _ = writeln!(out, "{}", vertex.tag);
        }
        for (descriptor, bucket) in V::DESCRIPTOR.elements.iter().zip(&kernel.elements) {
            if bucket.is_empty() {
                continue;
            }
            let _ = writeln!(out, "{}\n{}", keyword(descriptor.kind), bucket.len());
            for element in bucket {
                for node in &element.nodes[..descriptor.stride()] {
                    let _ = write!(out, "{node} ");
                }
                let _ = writeln!(out, "{}", element.tag);
            }
        }
        let _ = writeln!(out, "End");
        fs::write(path, out).map_err(|e| io_error(path, e))
    }

    pub(super) fn load_mesh<V: VariantKind>(
        kernel: &mut ReferenceKernel<V>,
        path: &Path,
    ) -> Result<(), BridgeError> {
        let text = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        let mut tokens = Tokens { iter: text.split_whitespace(), path };

        let mut vertices = Vec::new();
        let mut buckets = vec![Vec::new(); V::DESCRIPTOR.elements.len()];
        loop {
            let word = tokens.next()?;
            match word {
                "MeshVersionFormatted" => {
                    tokens.next()?;
                }
                "Dimension" => {
                    let dim = tokens.next_index()?;
                    if dim as usize != kernel.dim() {
                        return Err(malformed(
                            path,
                            format!("dimension {dim} does not match this variant"),
                        ));
                    }
                }
                "Vertices" => {
                    let count = tokens.next_index()?;
                    let dim = kernel.dim();
                    for _ in 0..count {
                        let mut vertex = StoredVertex::default();
                        for coord in vertex.coords.iter_mut().take(dim) {
                            *coord = tokens.next_f64()?;
                        }
                        vertex.tag = tokens.next_index()?;
                        vertices.push(vertex);
                    }
                }
                "End" => break,
                other => {
                    let kind = kind_for_keyword(other)
                        .ok_or_else(|| malformed(path, format!("unknown keyword `{other}`")))?;
                    let bucket = kernel.bucket(kind)?;
                    let stride = kind.node_count();
                    let count = tokens.next_index()?;
                    for _ in 0..count {
                        let mut element = StoredElement::default();
                        for node in element.nodes.iter_mut().take(stride) {
                            *node = tokens.next_index()?;
                        }
                        element.tag = tokens.next_index()?;
                        buckets[bucket].push(element);
                    }
                }
            }
        }

        let vertex_count = vertices.len() as KernelIndex;
        for (descriptor, bucket) in V::DESCRIPTOR.elements.iter().zip(&buckets) {
            for element in bucket {
                for &node in &element.nodes[..descriptor.stride()] {
                    if node < 1 || node > vertex_count {
                        return Err(malformed(
                            path,
                            format!("connectivity references vertex {node} of {vertex_count}"),
                        ));
                    }
                }
            }
        }
        kernel.vertices = vertices;
        kernel.elements = buckets;
        Ok(())
    }

    pub(super) fn save_sol<V: VariantKind>(
        kernel: &ReferenceKernel<V>,
        path: &Path,
    ) -> Result<(), BridgeError> {
        let sol = kernel.sol.as_ref().ok_or(BridgeError::SolUndeclared)?;
        let components = sol.kind.components(V::DESCRIPTOR);
        let mut out = String::new();
        let _ = writeln!(out, "MeshVersionFormatted 2");
        let _ = writeln!(out, "Dimension\n{}", kernel.dim());
        let _ = writeln!(out, "SolAtVertices\n{}", sol.entities);
        let _ = writeln!(out, "1 {}", sol.kind.code());
        for chunk in sol.values.chunks_exact(components) {
            let line: Vec<String> = chunk.iter().map(|v| v.to_string()).collect();
            let _ = writeln!(out, "{}", line.join(" "));
        }
        let _ = writeln!(out, "End");
        fs::write(path, out).map_err(|e| io_error(path, e))
    }

    pub(super) fn load_sol<V: VariantKind>(
        kernel: &mut ReferenceKernel<V>,
        path: &Path,
    ) -> Result<(), BridgeError> {
        let text = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        let mut tokens = Tokens { iter: text.split_whitespace(), path };
        loop {
            let word = tokens.next()?;
            match word {
                "MeshVersionFormatted" => {
                    tokens.next()?;
                }
                "Dimension" => {
                    let dim = tokens.next_index()?;
                    if dim as usize != kernel.dim() {
                        return Err(malformed(
                            path,
                            format!("dimension {dim} does not match this variant"),
                        ));
                    }
                }
                "SolAtVertices" => {
                    let entities = tokens.next_index()?;
                    if entities < 0 {
                        return Err(malformed(path, format!("negative entity count {entities}")));
                    }
                    let types = tokens.next_index()?;
                    if types != 1 {
                        return Err(malformed(path, "exactly one solution type is supported"));
                    }
                    let code = tokens.next_index()?;
                    let kind = SolKind::from_code(code)
                        .ok_or_else(|| malformed(path, format!("unknown solution type {code}")))?;
                    let components = kind.components(V::DESCRIPTOR);
                    // The count is file-supplied; reserve fallibly so an
                    // absurd claim fails before any value is read.
                    let total = entities as usize * components;
                    let mut values = Vec::new();
                    values
                        .try_reserve_exact(total)
                        .map_err(|_| BridgeError::AllocationFailed { elements: total })?;
                    for _ in 0..total {
                        values.push(tokens.next_f64()?);
                    }
                    kernel.sol = Some(SolField { kind, entities, values });
                }
                "End" => break,
                other => return Err(malformed(path, format!("unknown keyword `{other}`"))),
            }
        }
        Ok(())
    }
}
