//! Entity-kind descriptors for the three mesh variants.
//!
//! The boundary layer is written once, generically; everything that differs
//! between the planar, volumetric, and surface instantiations is captured in
//! a [`VariantDescriptor`]: which element kinds exist, how many nodes each
//! carries, which side channels the kernel's bulk-get primitive fills, and
//! the strides of vertex coordinates and tensor fields. A variant is then a
//! declarative table, not a hand-written copy of the marshalling logic.

use serde::{Deserialize, Serialize};

/// Classes of mesh entity a kernel may store.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Vertex,
    Edge,
    Triangle,
    Quadrilateral,
    Tetrahedron,
    Prism,
}

impl EntityKind {
    /// Number of vertex references one element of this kind carries.
    /// Zero for `Vertex`, which has coordinates instead of connectivity.
    pub const fn node_count(self) -> usize {
        match self {
            EntityKind::Vertex => 0,
            EntityKind::Edge => 2,
            EntityKind::Triangle => 3,
            EntityKind::Quadrilateral => 4,
            EntityKind::Tetrahedron => 4,
            EntityKind::Prism => 6,
        }
    }

    /// Integer code used at the flat boundary. Stable; do not renumber.
    pub const fn code(self) -> i32 {
        match self {
            EntityKind::Vertex => 0,
            EntityKind::Edge => 1,
            EntityKind::Triangle => 2,
            EntityKind::Quadrilateral => 3,
            EntityKind::Tetrahedron => 4,
            EntityKind::Prism => 5,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(EntityKind::Vertex),
            1 => Some(EntityKind::Edge),
            2 => Some(EntityKind::Triangle),
            3 => Some(EntityKind::Quadrilateral),
            4 => Some(EntityKind::Tetrahedron),
            5 => Some(EntityKind::Prism),
            _ => None,
        }
    }
}

/// Per-entity metadata channels the kernel's bulk-get primitive requires as
/// parallel output buffers, even when the boundary only returns the data
/// buffer itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SideChannel {
    /// Reference tag per entity.
    Refs,
    /// Corner flag (vertices only).
    Corners,
    /// Required flag.
    Required,
    /// Ridge flag (edges only).
    Ridges,
}

/// One element kind of a variant: its identity, node arity, and the side
/// channels its bulk get fills.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementDescriptor {
    pub kind: EntityKind,
    pub side_channels: &'static [SideChannel],
}

impl ElementDescriptor {
    /// Values per element in the flat connectivity buffer.
    pub const fn stride(&self) -> usize {
        self.kind.node_count()
    }
}

/// Complete description of one dimensional instantiation.
///
/// `elements` is ordered; the order defines the layout of the size
/// declaration vector (vertex count first, then one count per element kind in
/// this order) and must not change once published.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantDescriptor {
    pub name: &'static str,
    /// Coordinates per vertex: 2 (planar) or 3 (volumetric, surface).
    pub vertex_dim: usize,
    /// Components per vertex of a tensor field: 3 (planar) or 6 (otherwise),
    /// in symmetric-matrix component order.
    pub tensor_components: usize,
    /// Side channels filled by the vertex bulk get.
    pub vertex_side_channels: &'static [SideChannel],
    /// Element kinds of this variant, in size-declaration order.
    pub elements: &'static [ElementDescriptor],
    /// The element kind the quality query applies to.
    pub quality_element: EntityKind,
}

impl VariantDescriptor {
    /// Length of the size-declaration vector: vertices plus one count per
    /// element kind.
    pub const fn count_arity(&self) -> usize {
        1 + self.elements.len()
    }

    /// Descriptor of `kind`, if this variant has it.
    pub fn element(&self, kind: EntityKind) -> Option<&ElementDescriptor> {
        self.elements.iter().find(|e| e.kind == kind)
    }

    /// Position of `kind` in the size-declaration vector (after the vertex
    /// count), if this variant has it.
    pub fn element_index(&self, kind: EntityKind) -> Option<usize> {
        self.elements.iter().position(|e| e.kind == kind)
    }
}

/// Planar meshes: 2-D vertices with triangles, quadrilaterals, and edges.
pub static PLANAR: VariantDescriptor = VariantDescriptor {
    name: "planar",
    vertex_dim: 2,
    tensor_components: 3,
    vertex_side_channels: &[SideChannel::Refs, SideChannel::Corners, SideChannel::Required],
    elements: &[
        ElementDescriptor {
            kind: EntityKind::Triangle,
            side_channels: &[SideChannel::Refs, SideChannel::Required],
        },
        ElementDescriptor {
            kind: EntityKind::Quadrilateral,
            side_channels: &[SideChannel::Refs, SideChannel::Required],
        },
        ElementDescriptor {
            kind: EntityKind::Edge,
            side_channels: &[SideChannel::Refs, SideChannel::Ridges, SideChannel::Required],
        },
    ],
    quality_element: EntityKind::Triangle,
};

/// Volumetric meshes: 3-D vertices with tetrahedra, prisms, triangles,
/// quadrilaterals, and edges.
pub static VOLUMETRIC: VariantDescriptor = VariantDescriptor {
    name: "volumetric",
    vertex_dim: 3,
    tensor_components: 6,
    vertex_side_channels: &[SideChannel::Refs, SideChannel::Corners, SideChannel::Required],
    elements: &[
        ElementDescriptor {
            kind: EntityKind::Tetrahedron,
            side_channels: &[SideChannel::Refs, SideChannel::Required],
        },
        ElementDescriptor {
            kind: EntityKind::Prism,
            side_channels: &[SideChannel::Refs, SideChannel::Required],
        },
        ElementDescriptor {
            kind: EntityKind::Triangle,
            side_channels: &[SideChannel::Refs, SideChannel::Required],
        },
        ElementDescriptor {
            kind: EntityKind::Quadrilateral,
            side_channels: &[SideChannel::Refs, SideChannel::Required],
        },
        ElementDescriptor {
            kind: EntityKind::Edge,
            side_channels: &[SideChannel::Refs, SideChannel::Ridges, SideChannel::Required],
        },
    ],
    quality_element: EntityKind::Tetrahedron,
};

/// Surface meshes: 3-D vertices with triangles and edges.
pub static SURFACE: VariantDescriptor = VariantDescriptor {
    name: "surface",
    vertex_dim: 3,
    tensor_components: 6,
    vertex_side_channels: &[SideChannel::Refs, SideChannel::Corners, SideChannel::Required],
    elements: &[
        ElementDescriptor {
            kind: EntityKind::Triangle,
            side_channels: &[SideChannel::Refs, SideChannel::Required],
        },
        ElementDescriptor {
            kind: EntityKind::Edge,
            side_channels: &[SideChannel::Refs, SideChannel::Ridges, SideChannel::Required],
        },
    ],
    quality_element: EntityKind::Triangle,
};

/// Marker trait tying a zero-sized variant type to its descriptor, so kernels
/// can be generic over the instantiation at the type level.
pub trait VariantKind: 'static {
    const DESCRIPTOR: &'static VariantDescriptor;
}

/// Planar (2-D) instantiation marker.
pub struct Planar;
/// Volumetric (3-D) instantiation marker.
pub struct Volumetric;
/// Surface instantiation marker.
pub struct Surface;

impl VariantKind for Planar {
    const DESCRIPTOR: &'static VariantDescriptor = &PLANAR;
}
impl VariantKind for Volumetric {
    const DESCRIPTOR: &'static VariantDescriptor = &VOLUMETRIC;
}
impl VariantKind for Surface {
    const DESCRIPTOR: &'static VariantDescriptor = &SURFACE;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptors_are_internally_consistent() {
        for desc in [&PLANAR, &VOLUMETRIC, &SURFACE] {
            assert!(desc.vertex_dim == 2 || desc.vertex_dim == 3);
            assert_eq!(desc.tensor_components, if desc.vertex_dim == 2 { 3 } else { 6 });
            assert!(desc.element(desc.quality_element).is_some());
            for elem in desc.elements {
                assert!(elem.stride() >= 2, "element kinds carry at least two nodes");
                assert!(!elem.side_channels.contains(&SideChannel::Corners));
            }
        }
    }

    #[test]
    fn count_vector_layout_matches_reference_ordering() {
        assert_eq!(PLANAR.count_arity(), 4);
        assert_eq!(VOLUMETRIC.count_arity(), 6);
        assert_eq!(SURFACE.count_arity(), 3);
        assert_eq!(VOLUMETRIC.element_index(EntityKind::Tetrahedron), Some(0));
        assert_eq!(VOLUMETRIC.element_index(EntityKind::Edge), Some(4));
        assert_eq!(PLANAR.element_index(EntityKind::Tetrahedron), None);
    }

    #[test]
    fn entity_codes_round_trip() {
        for kind in [
            EntityKind::Vertex,
            EntityKind::Edge,
            EntityKind::Triangle,
            EntityKind::Quadrilateral,
            EntityKind::Tetrahedron,
            EntityKind::Prism,
        ] {
            assert_eq!(EntityKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(EntityKind::from_code(99), None);
    }
}
