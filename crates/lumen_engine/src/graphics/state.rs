//! Graphics state cache
//!
//! Mirrors what the render system last issued to the device. Every setter compares the
//! requested value with the cached one and returns `true` only when it differs, in
//! which case the cache is updated and the caller must issue the real call. Nothing
//! here touches the device.
//!
//! The cache goes stale if anything outside the command buffer changes device state;
//! [`GraphicsState::invalidate`] forgets everything after such a change. A deleted
//! object name may be handed out again by the device, so deleted names are dropped
//! with [`GraphicsState::forget`].

use super::device::GpuHandle;
use super::types::{BlendFactor, CompareOperation, PolygonFace, PolygonMode};

/// Number of texture units tracked by the cache
pub const MAX_TEXTURE_BINDINGS: usize = 16;

/// Number of uniform block bindings tracked by the cache
pub const MAX_UNIFORM_BUFFER_BINDINGS: usize = 16;

/// Viewport rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Left edge
    pub x: u32,
    /// Bottom edge
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UniformBinding {
    buffer: GpuHandle,
    offset: usize,
    size: usize,
}

/// Cached device state; `None` means unknown, so the next request always goes through
#[derive(Debug, Clone, Default)]
pub struct GraphicsState {
    viewport: Option<Viewport>,
    depth_test: Option<bool>,
    depth_func: Option<CompareOperation>,
    polygon_mode: Option<(PolygonFace, PolygonMode)>,
    face_culling: Option<bool>,
    cull_face: Option<PolygonFace>,
    blending: Option<bool>,
    blend_factors: Option<(BlendFactor, BlendFactor)>,
    vertex_array: Option<Option<GpuHandle>>,
    shader_program: Option<Option<GpuHandle>>,
    framebuffer: Option<Option<GpuHandle>>,
    uniform_buffers: [Option<UniformBinding>; MAX_UNIFORM_BUFFER_BINDINGS],
    textures: [Option<Option<GpuHandle>>; MAX_TEXTURE_BINDINGS],
}

fn replace<T: PartialEq>(slot: &mut Option<T>, value: T) -> bool {
    if slot.as_ref() == Some(&value) {
        false
    } else {
        *slot = Some(value);
        true
    }
}

impl GraphicsState {
    /// Create a cache with every value unknown
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every cached value
    pub fn invalidate(&mut self) {
        *self = Self::default();
    }

    /// Mark every binding of `handle` as unknown
    ///
    /// Returns whether any binding held it.
    pub fn forget(&mut self, handle: GpuHandle) -> bool {
        let mut forgotten = false;
        for slot in [&mut self.vertex_array, &mut self.shader_program, &mut self.framebuffer]
            .into_iter()
            .chain(self.textures.iter_mut())
        {
            if *slot == Some(Some(handle)) {
                *slot = None;
                forgotten = true;
            }
        }
        for slot in &mut self.uniform_buffers {
            if slot.is_some_and(|binding| binding.buffer == handle) {
                *slot = None;
                forgotten = true;
            }
        }
        forgotten
    }

    /// Cached viewport
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Cached texture of `binding`; `None` when unknown
    pub fn texture(&self, binding: u32) -> Option<Option<GpuHandle>> {
        self.textures.get(binding as usize).copied().flatten()
    }

    /// Set the viewport; returns whether it changed
    pub fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) -> bool {
        replace(&mut self.viewport, Viewport { x, y, width, height })
    }

    /// Enable or disable depth testing; returns whether it changed
    pub fn set_depth_test(&mut self, enabled: bool) -> bool {
        replace(&mut self.depth_test, enabled)
    }

    /// Set the depth comparison; returns whether it changed
    pub fn set_depth_func(&mut self, operation: CompareOperation) -> bool {
        replace(&mut self.depth_func, operation)
    }

    /// Set the polygon mode of `face`; returns whether it changed
    pub fn set_polygon_mode(&mut self, face: PolygonFace, mode: PolygonMode) -> bool {
        replace(&mut self.polygon_mode, (face, mode))
    }

    /// Enable or disable face culling; returns whether it changed
    pub fn set_face_culling(&mut self, enabled: bool) -> bool {
        replace(&mut self.face_culling, enabled)
    }

    /// Select the culled face; returns whether it changed
    pub fn set_cull_face(&mut self, face: PolygonFace) -> bool {
        replace(&mut self.cull_face, face)
    }

    /// Enable or disable blending; returns whether it changed
    pub fn set_blending(&mut self, enabled: bool) -> bool {
        replace(&mut self.blending, enabled)
    }

    /// Set the blend factors; returns whether they changed
    pub fn set_blend_factors(&mut self, source: BlendFactor, destination: BlendFactor) -> bool {
        replace(&mut self.blend_factors, (source, destination))
    }

    /// Bind a vertex array; returns whether the binding changed
    pub fn bind_vertex_array(&mut self, vertex_array: Option<GpuHandle>) -> bool {
        replace(&mut self.vertex_array, vertex_array)
    }

    /// Bind a shader program; returns whether the binding changed
    pub fn bind_shader_program(&mut self, program: Option<GpuHandle>) -> bool {
        replace(&mut self.shader_program, program)
    }

    /// Bind a framebuffer; returns whether the binding changed
    pub fn bind_framebuffer(&mut self, framebuffer: Option<GpuHandle>) -> bool {
        replace(&mut self.framebuffer, framebuffer)
    }

    /// Bind a buffer range to uniform block `index`; returns whether the binding changed
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`MAX_UNIFORM_BUFFER_BINDINGS`].
    pub fn bind_uniform_buffer(&mut self, index: u32, buffer: GpuHandle, offset: usize, size: usize) -> bool {
        let slot = self
            .uniform_buffers
            .get_mut(index as usize)
            .unwrap_or_else(|| panic!("uniform buffer binding {index} exceeds {MAX_UNIFORM_BUFFER_BINDINGS}"));
        replace(slot, UniformBinding { buffer, offset, size })
    }

    /// Bind a texture to `binding`; returns whether the binding changed
    ///
    /// # Panics
    ///
    /// Panics if `binding` is not below [`MAX_TEXTURE_BINDINGS`].
    pub fn bind_texture(&mut self, binding: u32, texture: Option<GpuHandle>) -> bool {
        let slot = self
            .textures
            .get_mut(binding as usize)
            .unwrap_or_else(|| panic!("texture binding {binding} exceeds {MAX_TEXTURE_BINDINGS}"));
        replace(slot, texture)
    }

    /// Non-buffered uniforms are reset by every draw, so they are always issued
    pub fn bind_single_uniform(&mut self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_value_reports_no_change() {
        let mut state = GraphicsState::new();
        assert!(state.set_viewport(0, 0, 800, 600));
        assert!(!state.set_viewport(0, 0, 800, 600));
        assert!(state.set_viewport(0, 0, 1024, 600));

        assert!(state.set_depth_test(true));
        assert!(!state.set_depth_test(true));
        assert!(state.set_depth_test(false));
    }

    #[test]
    fn test_unbinding_counts_as_a_change() {
        let mut state = GraphicsState::new();
        assert!(state.bind_vertex_array(Some(GpuHandle(7))));
        assert!(state.bind_vertex_array(None));
        assert!(!state.bind_vertex_array(None));
    }

    #[test]
    fn test_slots_are_independent() {
        let mut state = GraphicsState::new();
        assert!(state.bind_texture(0, Some(GpuHandle(1))));
        assert!(state.bind_texture(1, Some(GpuHandle(1))));
        assert!(!state.bind_texture(0, Some(GpuHandle(1))));

        assert!(state.bind_uniform_buffer(2, GpuHandle(3), 0, 64));
        assert!(state.bind_uniform_buffer(2, GpuHandle(3), 256, 64));
        assert!(!state.bind_uniform_buffer(2, GpuHandle(3), 256, 64));
    }

    #[test]
    fn test_invalidate_forgets_everything() {
        let mut state = GraphicsState::new();
        state.bind_shader_program(Some(GpuHandle(4)));
        state.set_blend_factors(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
        state.invalidate();

        assert!(state.bind_shader_program(Some(GpuHandle(4))));
        assert!(state.set_blend_factors(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha));
        assert!(state.viewport().is_none());
    }

    #[test]
    fn test_forgotten_name_binds_again() {
        let mut state = GraphicsState::new();
        state.bind_texture(0, Some(GpuHandle(9)));
        state.bind_texture(3, Some(GpuHandle(2)));
        state.bind_vertex_array(Some(GpuHandle(9)));
        state.bind_uniform_buffer(1, GpuHandle(9), 0, 64);

        assert!(state.forget(GpuHandle(9)));
        assert!(!state.forget(GpuHandle(9)));

        // The device may reuse the name for a new object
        assert_eq!(state.texture(0), None);
        assert!(state.bind_texture(0, Some(GpuHandle(9))));
        assert!(state.bind_vertex_array(Some(GpuHandle(9))));
        assert!(state.bind_uniform_buffer(1, GpuHandle(9), 0, 64));
        assert_eq!(state.texture(3), Some(Some(GpuHandle(2))));
        assert!(!state.bind_texture(3, Some(GpuHandle(2))));
    }

    #[test]
    fn test_single_uniforms_always_go_through() {
        let mut state = GraphicsState::new();
        assert!(state.bind_single_uniform());
        assert!(state.bind_single_uniform());
    }

    #[test]
    #[should_panic(expected = "texture binding 16")]
    fn test_texture_binding_out_of_range_panics() {
        GraphicsState::new().bind_texture(16, None);
    }
}
