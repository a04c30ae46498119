//! Vertex array objects

use std::collections::BTreeMap;
use std::sync::Arc;

use super::buffer::Buffer;
use super::context::GraphicsContext;
use super::device::GpuHandle;
use super::object::GpuObject;
use super::types::{AttributeFormat, ObjectKind};

/// Vertex array object
///
/// Keeps the buffers bound to it alive for as long as it exists.
#[derive(Debug)]
pub struct VertexArray {
    object: GpuObject,
    vertex_buffers: BTreeMap<u32, Arc<Buffer>>,
    index_buffer: Option<Arc<Buffer>>,
    attributes: BTreeMap<u32, (u32, AttributeFormat)>,
}

impl VertexArray {
    /// Create an empty vertex array
    pub fn create(context: &mut GraphicsContext) -> Self {
        let handle = context.device().create_vertex_array();
        Self {
            object: GpuObject::new(context, ObjectKind::VertexArray, handle),
            vertex_buffers: BTreeMap::new(),
            index_buffer: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Source vertex binding `index` from `buffer`
    pub fn bind_vertex_buffer(&mut self, context: &mut GraphicsContext, index: u32, buffer: Arc<Buffer>, offset: usize, stride: usize) {
        context
            .device()
            .vertex_array_vertex_buffer(self.handle(), index, buffer.handle(), offset, stride);
        self.vertex_buffers.insert(index, buffer);
    }

    /// Use `buffer` as the element buffer
    pub fn bind_index_buffer(&mut self, context: &mut GraphicsContext, buffer: Arc<Buffer>) {
        context.device().vertex_array_index_buffer(self.handle(), buffer.handle());
        self.index_buffer = Some(buffer);
    }

    /// Enable attribute `location`, reading `format` from vertex binding `binding`
    pub fn set_vertex_attribute(
        &mut self,
        context: &mut GraphicsContext,
        location: u32,
        binding: u32,
        format: AttributeFormat,
        relative_offset: u32,
    ) {
        context
            .device()
            .vertex_array_attribute(self.handle(), location, binding, format, relative_offset);
        self.attributes.insert(location, (binding, format));
    }

    /// Backend name
    pub fn handle(&self) -> GpuHandle {
        self.object.handle()
    }

    /// Buffer bound to vertex binding `index`
    pub fn vertex_buffer(&self, index: u32) -> Option<&Arc<Buffer>> {
        self.vertex_buffers.get(&index)
    }

    /// Bound element buffer
    pub fn index_buffer(&self) -> Option<&Arc<Buffer>> {
        self.index_buffer.as_ref()
    }

    /// Whether attribute `location` is enabled
    pub fn has_attribute(&self, location: u32) -> bool {
        self.attributes.contains_key(&location)
    }

    /// Whether the vertex array has not been released
    pub fn is_created(&self) -> bool {
        self.object.is_created()
    }

    /// Release the backend object
    pub fn release(&self) {
        self.object.release();
    }
}
