//! Mesh component

use std::sync::Arc;

use crate::ecs::Component;
use crate::graphics::types::{IndexType, PrimitiveTopology};
use crate::graphics::VertexArray;
use crate::render::Material;

/// One indexed sub-draw of a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Primitive {
    /// Primitive assembly mode
    pub topology: PrimitiveTopology,
    /// First index to draw, counted in index elements
    pub first: u32,
    /// Number of indices to draw
    pub count: u32,
    /// Element type of the index buffer
    pub index_type: IndexType,
    /// Number of instances, at least 1
    pub instance_count: u32,
}

impl Default for Primitive {
    fn default() -> Self {
        Self {
            topology: PrimitiveTopology::Triangles,
            first: 0,
            count: 0,
            index_type: IndexType::UnsignedInt,
            instance_count: 1,
        }
    }
}

/// Mesh component
///
/// Primitive `i` is always drawn with material `i`; both lists only grow together
/// through [`MeshComponent::push_primitive`].
///
/// All primitives draw from the one vertex array, which holds a single index buffer and
/// one set of vertex bindings. Primitives must therefore share those buffers and differ
/// only in their index range; models whose primitives read separate buffer ranges
/// draw every primitive with the last one's data.
#[derive(Debug, Clone, Default)]
pub struct MeshComponent {
    /// Vertex array holding every primitive's vertex and index buffers
    pub vertex_array: Option<Arc<VertexArray>>,
    primitives: Vec<Primitive>,
    materials: Vec<Arc<Material>>,
    /// Whether the vertex data carries normals
    pub has_normals: bool,
    /// Whether the vertex data carries tangents
    pub has_tangents: bool,
}

impl Component for MeshComponent {}

impl MeshComponent {
    /// Create a mesh drawing from `vertex_array`
    pub fn new(vertex_array: Arc<VertexArray>) -> Self {
        Self {
            vertex_array: Some(vertex_array),
            ..Default::default()
        }
    }

    /// Append a primitive together with the material it is drawn with
    pub fn push_primitive(&mut self, primitive: Primitive, material: Arc<Material>) {
        self.primitives.push(primitive);
        self.materials.push(material);
    }

    /// Primitives in draw order
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Materials, index aligned with [`primitives`](Self::primitives)
    pub fn materials(&self) -> &[Arc<Material>] {
        &self.materials
    }

    /// `(primitive, material)` pairs in draw order
    pub fn draws(&self) -> impl Iterator<Item = (&Primitive, &Arc<Material>)> {
        self.primitives.iter().zip(self.materials.iter())
    }
}
