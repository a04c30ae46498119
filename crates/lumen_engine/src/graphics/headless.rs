//! Headless recording device
//!
//! Implements [`GraphicsDevice`] without a GPU. Object names come from a slot map of
//! live objects and every call is appended to a log. The log is shared through a
//! [`DeviceRecorder`], so it stays observable after the device has been boxed and
//! handed to the engine.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use slotmap::{DefaultKey, Key, KeyData, SlotMap};

use super::device::{GpuHandle, GraphicsDevice, SamplerParameters};
use super::types::{
    AttributeFormat, BlendFactor, BufferAccess, BufferTarget, ClearFlags, CompareOperation,
    ComponentType, Format, FramebufferAttachment, IndexType, ObjectKind, PolygonFace, PolygonMode,
    PrimitiveTopology, ShaderStage, UniformValue,
};

/// One recorded device call
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum DeviceCall {
    CreateObject { kind: ObjectKind, handle: GpuHandle },
    DeleteObject { kind: ObjectKind, handle: GpuHandle },
    BufferSubData { buffer: GpuHandle, offset: usize, len: usize },
    VertexBuffer { vertex_array: GpuHandle, index: u32, buffer: GpuHandle, offset: usize, stride: usize },
    IndexBuffer { vertex_array: GpuHandle, buffer: GpuHandle },
    VertexAttribute { vertex_array: GpuHandle, location: u32, binding: u32, format: AttributeFormat, relative_offset: u32 },
    TextureStorage { texture: GpuHandle, levels: u32, internal_format: Format, width: u32, height: u32 },
    TextureSubImage { texture: GpuHandle, level: u32, layer: u32, width: u32, height: u32, pixel_format: Format, component_type: ComponentType },
    GenerateMipmaps { texture: GpuHandle },
    FramebufferTexture { framebuffer: GpuHandle, attachment: FramebufferAttachment, texture: GpuHandle },
    SetViewport { x: u32, y: u32, width: u32, height: u32 },
    SetDepthTest(bool),
    SetDepthFunc(CompareOperation),
    SetPolygonMode { face: PolygonFace, mode: PolygonMode },
    SetFaceCulling(bool),
    SetCullFace(PolygonFace),
    SetBlending(bool),
    SetBlendFactors { source: BlendFactor, destination: BlendFactor },
    BindVertexArray(Option<GpuHandle>),
    BindShaderProgram(Option<GpuHandle>),
    BindUniformBuffer { index: u32, buffer: GpuHandle, offset: usize, size: usize },
    BindTexture { unit: u32, texture: Option<GpuHandle> },
    BindFramebuffer(Option<GpuHandle>),
    SetUniform { location: u32, value: UniformValue },
    Clear { flags: ClearFlags },
    DrawElements { topology: PrimitiveTopology, first: u32, count: u32, index_type: IndexType, instance_count: u32 },
    DrawArrays { topology: PrimitiveTopology, first: u32, count: u32, instance_count: u32 },
}

impl DeviceCall {
    /// Whether this call is a draw
    pub fn is_draw(&self) -> bool {
        matches!(self, Self::DrawElements { .. } | Self::DrawArrays { .. })
    }
}

#[derive(Default)]
struct Recording {
    objects: SlotMap<DefaultKey, ObjectKind>,
    calls: Vec<DeviceCall>,
}

/// Shared view on a headless device's call log and live objects
#[derive(Clone, Default)]
pub struct DeviceRecorder {
    inner: Arc<Mutex<Recording>>,
}

impl DeviceRecorder {
    fn lock(&self) -> MutexGuard<'_, Recording> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of every call recorded so far
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.lock().calls.clone()
    }

    /// Drain the call log
    pub fn take_calls(&self) -> Vec<DeviceCall> {
        std::mem::take(&mut self.lock().calls)
    }

    /// Number of recorded calls matching `predicate`
    pub fn count_calls(&self, predicate: impl Fn(&DeviceCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|call| predicate(call)).count()
    }

    /// Number of objects created and not yet deleted
    pub fn live_objects(&self) -> usize {
        self.lock().objects.len()
    }

    /// Number of live objects of one kind
    pub fn live_objects_of(&self, kind: ObjectKind) -> usize {
        self.lock().objects.values().filter(|&&k| k == kind).count()
    }

    /// Whether `handle` names a live object
    pub fn is_live(&self, handle: GpuHandle) -> bool {
        self.lock().objects.contains_key(DefaultKey::from(KeyData::from_ffi(handle.raw())))
    }
}

/// Graphics device that records instead of rendering
#[derive(Default)]
pub struct HeadlessDevice {
    recorder: DeviceRecorder,
}

impl HeadlessDevice {
    /// Create a device with an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle on the call log
    pub fn recorder(&self) -> DeviceRecorder {
        self.recorder.clone()
    }

    fn record(&mut self, call: DeviceCall) {
        log::trace!("{call:?}");
        self.recorder.lock().calls.push(call);
    }

    fn allocate(&mut self, kind: ObjectKind) -> GpuHandle {
        let handle = GpuHandle(self.recorder.lock().objects.insert(kind).data().as_ffi());
        self.record(DeviceCall::CreateObject { kind, handle });
        handle
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn create_buffer(&mut self, target: BufferTarget, access: BufferAccess, size: usize, data: Option<&[u8]>) -> GpuHandle {
        if let Some(data) = data {
            assert!(data.len() <= size, "initial data of {} bytes exceeds buffer size {size}", data.len());
        }
        log::trace!("buffer {target:?} {access:?} {size} bytes");
        self.allocate(ObjectKind::Buffer)
    }

    fn buffer_sub_data(&mut self, buffer: GpuHandle, offset: usize, data: &[u8]) {
        self.record(DeviceCall::BufferSubData { buffer, offset, len: data.len() });
    }

    fn create_vertex_array(&mut self) -> GpuHandle {
        self.allocate(ObjectKind::VertexArray)
    }

    fn vertex_array_vertex_buffer(&mut self, vertex_array: GpuHandle, index: u32, buffer: GpuHandle, offset: usize, stride: usize) {
        self.record(DeviceCall::VertexBuffer { vertex_array, index, buffer, offset, stride });
    }

    fn vertex_array_index_buffer(&mut self, vertex_array: GpuHandle, buffer: GpuHandle) {
        self.record(DeviceCall::IndexBuffer { vertex_array, buffer });
    }

    fn vertex_array_attribute(&mut self, vertex_array: GpuHandle, location: u32, binding: u32, format: AttributeFormat, relative_offset: u32) {
        self.record(DeviceCall::VertexAttribute { vertex_array, location, binding, format, relative_offset });
    }

    fn create_texture(&mut self, cubemap: bool, sampler: SamplerParameters) -> GpuHandle {
        log::trace!("texture cubemap={cubemap} {sampler:?}");
        self.allocate(ObjectKind::Texture)
    }

    fn texture_storage(&mut self, texture: GpuHandle, levels: u32, internal_format: Format, width: u32, height: u32) {
        self.record(DeviceCall::TextureStorage { texture, levels, internal_format, width, height });
    }

    fn texture_sub_image(
        &mut self,
        texture: GpuHandle,
        level: u32,
        layer: u32,
        width: u32,
        height: u32,
        pixel_format: Format,
        component_type: ComponentType,
        _data: &[u8],
    ) {
        self.record(DeviceCall::TextureSubImage { texture, level, layer, width, height, pixel_format, component_type });
    }

    fn generate_mipmaps(&mut self, texture: GpuHandle) {
        self.record(DeviceCall::GenerateMipmaps { texture });
    }

    fn create_shader(&mut self, stage: ShaderStage, source: &str) -> GpuHandle {
        log::trace!("{stage:?} shader, {} bytes of source", source.len());
        self.allocate(ObjectKind::Shader)
    }

    fn create_shader_program(&mut self, shaders: &[GpuHandle]) -> GpuHandle {
        log::trace!("linking {} shader stages", shaders.len());
        self.allocate(ObjectKind::ShaderProgram)
    }

    fn create_framebuffer(&mut self) -> GpuHandle {
        self.allocate(ObjectKind::Framebuffer)
    }

    fn framebuffer_texture(&mut self, framebuffer: GpuHandle, attachment: FramebufferAttachment, texture: GpuHandle) {
        self.record(DeviceCall::FramebufferTexture { framebuffer, attachment, texture });
    }

    fn delete_object(&mut self, kind: ObjectKind, handle: GpuHandle) {
        let removed = self
            .recorder
            .lock()
            .objects
            .remove(DefaultKey::from(KeyData::from_ffi(handle.raw())));
        assert_eq!(removed, Some(kind), "deleting {kind:?} {handle:?} which is not a live object of that kind");
        self.record(DeviceCall::DeleteObject { kind, handle });
    }

    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.record(DeviceCall::SetViewport { x, y, width, height });
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.record(DeviceCall::SetDepthTest(enabled));
    }

    fn set_depth_func(&mut self, operation: CompareOperation) {
        self.record(DeviceCall::SetDepthFunc(operation));
    }

    fn set_polygon_mode(&mut self, face: PolygonFace, mode: PolygonMode) {
        self.record(DeviceCall::SetPolygonMode { face, mode });
    }

    fn set_face_culling(&mut self, enabled: bool) {
        self.record(DeviceCall::SetFaceCulling(enabled));
    }

    fn set_cull_face(&mut self, face: PolygonFace) {
        self.record(DeviceCall::SetCullFace(face));
    }

    fn set_blending(&mut self, enabled: bool) {
        self.record(DeviceCall::SetBlending(enabled));
    }

    fn set_blend_factors(&mut self, source: BlendFactor, destination: BlendFactor) {
        self.record(DeviceCall::SetBlendFactors { source, destination });
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<GpuHandle>) {
        self.record(DeviceCall::BindVertexArray(vertex_array));
    }

    fn bind_shader_program(&mut self, program: Option<GpuHandle>) {
        self.record(DeviceCall::BindShaderProgram(program));
    }

    fn bind_uniform_buffer(&mut self, index: u32, buffer: GpuHandle, offset: usize, size: usize) {
        self.record(DeviceCall::BindUniformBuffer { index, buffer, offset, size });
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<GpuHandle>) {
        self.record(DeviceCall::BindTexture { unit, texture });
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<GpuHandle>) {
        self.record(DeviceCall::BindFramebuffer(framebuffer));
    }

    fn set_uniform(&mut self, location: u32, value: UniformValue) {
        self.record(DeviceCall::SetUniform { location, value });
    }

    fn clear(&mut self, flags: ClearFlags, _color: [f32; 4], _depth: f32) {
        self.record(DeviceCall::Clear { flags });
    }

    fn draw_elements(&mut self, topology: PrimitiveTopology, first: u32, count: u32, index_type: IndexType, instance_count: u32) {
        self.record(DeviceCall::DrawElements { topology, first, count, index_type, instance_count });
    }

    fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32, instance_count: u32) {
        self.record(DeviceCall::DrawArrays { topology, first, count, instance_count });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objects_are_tracked_until_deleted() {
        let mut device = HeadlessDevice::new();
        let recorder = device.recorder();

        let buffer = device.create_buffer(BufferTarget::Vertex, BufferAccess::empty(), 64, None);
        let vertex_array = device.create_vertex_array();
        assert_ne!(buffer, vertex_array);
        assert_eq!(recorder.live_objects(), 2);
        assert!(recorder.is_live(buffer));

        device.delete_object(ObjectKind::Buffer, buffer);
        assert_eq!(recorder.live_objects(), 1);
        assert!(!recorder.is_live(buffer));
        assert_eq!(recorder.live_objects_of(ObjectKind::VertexArray), 1);
    }

    #[test]
    fn test_names_are_not_reused() {
        let mut device = HeadlessDevice::new();
        let first = device.create_vertex_array();
        device.delete_object(ObjectKind::VertexArray, first);
        let second = device.create_vertex_array();
        assert_ne!(first, second);
    }

    #[test]
    #[should_panic(expected = "not a live object")]
    fn test_double_delete_panics() {
        let mut device = HeadlessDevice::new();
        let texture = device.create_framebuffer();
        device.delete_object(ObjectKind::Framebuffer, texture);
        device.delete_object(ObjectKind::Framebuffer, texture);
    }

    #[test]
    fn test_call_log_can_be_drained() {
        let mut device = HeadlessDevice::new();
        let recorder = device.recorder();
        device.set_viewport(0, 0, 4, 4);
        device.draw_arrays(PrimitiveTopology::Triangles, 0, 3, 1);

        assert_eq!(recorder.count_calls(DeviceCall::is_draw), 1);
        assert_eq!(recorder.take_calls().len(), 2);
        assert!(recorder.calls().is_empty());
    }
}
