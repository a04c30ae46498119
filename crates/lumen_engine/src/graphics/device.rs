//! # Graphics Device Abstraction
//!
//! The boundary between the engine and an immediate-mode graphics API with
//! object-binding semantics. Objects are created, mutated through their name, bound
//! into global slots and deleted; draws read whatever is currently bound.
//!
//! ## Design Goals
//!
//! - **API Agnostic**: Resource objects and the command buffer only see this trait
//! - **Stateful**: The device owns the real bound state; [`GraphicsState`] mirrors it
//! - **Infallible calls**: Like the APIs it models, a call either takes effect or is a
//!   programming error
//!
//! [`GraphicsState`]: super::GraphicsState

use super::types::{
    AttributeFormat, BlendFactor, BufferAccess, BufferTarget, ClearFlags, CompareOperation,
    ComponentType, Format, FramebufferAttachment, IndexType, ObjectKind, PolygonFace, PolygonMode,
    PrimitiveTopology, ShaderStage, TextureParameter, UniformValue,
};

/// Name of a backend object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GpuHandle(pub u64);

impl GpuHandle {
    /// Raw value of the name
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Sampling parameters applied to a texture at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerParameters {
    /// Minification filter
    pub min_filter: TextureParameter,
    /// Magnification filter
    pub mag_filter: TextureParameter,
    /// Wrap mode along s
    pub wrap_s: TextureParameter,
    /// Wrap mode along t
    pub wrap_t: TextureParameter,
}

/// # Graphics Device Trait
///
/// Every backend (a real GL context, the headless recorder) implements this.
/// Object names returned by the `create_*` functions stay valid until passed to
/// [`delete_object`](GraphicsDevice::delete_object).
pub trait GraphicsDevice {
    /// Create a buffer with immutable storage of `size` bytes, optionally initialised
    fn create_buffer(&mut self, target: BufferTarget, access: BufferAccess, size: usize, data: Option<&[u8]>) -> GpuHandle;

    /// Overwrite part of a buffer created with [`BufferAccess::DYNAMIC_STORAGE`]
    fn buffer_sub_data(&mut self, buffer: GpuHandle, offset: usize, data: &[u8]);

    /// Create an empty vertex array
    fn create_vertex_array(&mut self) -> GpuHandle;

    /// Attach `buffer` to vertex binding `index`
    fn vertex_array_vertex_buffer(&mut self, vertex_array: GpuHandle, index: u32, buffer: GpuHandle, offset: usize, stride: usize);

    /// Attach the element buffer
    fn vertex_array_index_buffer(&mut self, vertex_array: GpuHandle, buffer: GpuHandle);

    /// Enable attribute `location` and source it from vertex binding `binding`
    fn vertex_array_attribute(&mut self, vertex_array: GpuHandle, location: u32, binding: u32, format: AttributeFormat, relative_offset: u32);

    /// Create a 2D or cubemap texture with the given sampling parameters
    fn create_texture(&mut self, cubemap: bool, sampler: SamplerParameters) -> GpuHandle;

    /// Allocate immutable storage for all mip levels
    fn texture_storage(&mut self, texture: GpuHandle, levels: u32, internal_format: Format, width: u32, height: u32);

    /// Upload pixels into one level and layer (layer is the cubemap face, 0 for 2D)
    fn texture_sub_image(
        &mut self,
        texture: GpuHandle,
        level: u32,
        layer: u32,
        width: u32,
        height: u32,
        pixel_format: Format,
        component_type: ComponentType,
        data: &[u8],
    );

    /// Fill levels 1.. from level 0
    fn generate_mipmaps(&mut self, texture: GpuHandle);

    /// Compile a shader stage
    fn create_shader(&mut self, stage: ShaderStage, source: &str) -> GpuHandle;

    /// Link shader stages into a program
    fn create_shader_program(&mut self, shaders: &[GpuHandle]) -> GpuHandle;

    /// Create an empty framebuffer
    fn create_framebuffer(&mut self) -> GpuHandle;

    /// Attach a texture to a framebuffer attachment point
    fn framebuffer_texture(&mut self, framebuffer: GpuHandle, attachment: FramebufferAttachment, texture: GpuHandle);

    /// Delete any object
    fn delete_object(&mut self, kind: ObjectKind, handle: GpuHandle);

    /// Set the viewport rectangle
    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32);

    /// Enable or disable depth testing
    fn set_depth_test(&mut self, enabled: bool);

    /// Set the depth comparison
    fn set_depth_func(&mut self, operation: CompareOperation);

    /// Set the rasterization mode for `face`
    fn set_polygon_mode(&mut self, face: PolygonFace, mode: PolygonMode);

    /// Enable or disable face culling
    fn set_face_culling(&mut self, enabled: bool);

    /// Select the culled face
    fn set_cull_face(&mut self, face: PolygonFace);

    /// Enable or disable blending
    fn set_blending(&mut self, enabled: bool);

    /// Set the blend equation factors
    fn set_blend_factors(&mut self, source: BlendFactor, destination: BlendFactor);

    /// Bind a vertex array, `None` unbinds
    fn bind_vertex_array(&mut self, vertex_array: Option<GpuHandle>);

    /// Bind a shader program, `None` unbinds
    fn bind_shader_program(&mut self, program: Option<GpuHandle>);

    /// Bind a range of `buffer` to uniform block binding `index`
    fn bind_uniform_buffer(&mut self, index: u32, buffer: GpuHandle, offset: usize, size: usize);

    /// Bind a texture to texture unit `unit`, `None` unbinds
    fn bind_texture(&mut self, unit: u32, texture: Option<GpuHandle>);

    /// Bind a framebuffer, `None` selects the default framebuffer
    fn bind_framebuffer(&mut self, framebuffer: Option<GpuHandle>);

    /// Set a non-buffered uniform of the bound program
    fn set_uniform(&mut self, location: u32, value: UniformValue);

    /// Clear the bound framebuffer
    fn clear(&mut self, flags: ClearFlags, color: [f32; 4], depth: f32);

    /// Indexed, instanced draw; `first` counts index elements
    fn draw_elements(&mut self, topology: PrimitiveTopology, first: u32, count: u32, index_type: IndexType, instance_count: u32);

    /// Non-indexed, instanced draw
    fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32, instance_count: u32);
}
