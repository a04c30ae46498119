//! # Graphics Layer
//!
//! Everything between the render system and the backend API:
//!
//! - [`GraphicsDevice`]: the immediate-mode backend boundary
//! - [`HeadlessDevice`]: a recording backend for tests and GPU-less runs
//! - [`GraphicsContext`]: device ownership plus deferred deletion of released objects
//! - Resource objects: [`Buffer`], [`VertexArray`], [`Texture`], [`Shader`],
//!   [`ShaderProgram`], [`Framebuffer`], shared through `Arc`
//! - [`GraphicsState`]: cache of the last issued state
//! - [`CommandBuffer`]: recorded operations replayed through the cache

pub mod types;
pub mod device;
pub mod headless;
pub mod context;
pub mod object;
pub mod buffer;
pub mod vertex_array;
pub mod texture;
pub mod shader;
pub mod framebuffer;
pub mod state;
pub mod command_buffer;

pub use device::{GpuHandle, GraphicsDevice, SamplerParameters};
pub use headless::{DeviceCall, DeviceRecorder, HeadlessDevice};
pub use context::GraphicsContext;
pub use object::GpuObject;
pub use buffer::{Buffer, BufferConfiguration};
pub use vertex_array::VertexArray;
pub use texture::{calculate_mip_count, Texture, TextureConfiguration};
pub use shader::{Shader, ShaderConfiguration, ShaderProgram};
pub use framebuffer::{Framebuffer, FramebufferConfiguration, MAX_COLOR_ATTACHMENTS};
pub use state::{GraphicsState, Viewport, MAX_TEXTURE_BINDINGS};
pub use command_buffer::{Command, CommandBuffer, ExecutionStats};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::types::{BufferAccess, BufferTarget, ObjectKind, ShaderStage};
    use super::*;

    #[test]
    fn test_release_retires_name_until_collected() {
        let device = HeadlessDevice::new();
        let recorder = device.recorder();
        let mut context = GraphicsContext::new(Box::new(device));

        let buffer = Buffer::create(&mut context, BufferConfiguration { size: 16, ..Default::default() }, None);
        buffer.release();
        assert!(!buffer.is_created());
        assert_eq!(recorder.live_objects(), 1);

        assert_eq!(context.collect_garbage(), 1);
        assert_eq!(recorder.live_objects(), 0);

        // Dropping a released object does not retire it again
        drop(buffer);
        assert_eq!(context.collect_garbage(), 0);
    }

    #[test]
    #[should_panic(expected = "released twice")]
    fn test_double_release_panics() {
        let mut context = GraphicsContext::new(Box::new(HeadlessDevice::new()));
        let vertex_array = VertexArray::create(&mut context);
        vertex_array.release();
        vertex_array.release();
    }

    #[test]
    #[should_panic(expected = "used after release")]
    fn test_handle_after_release_panics() {
        let mut context = GraphicsContext::new(Box::new(HeadlessDevice::new()));
        let texture = Texture::create(&mut context, TextureConfiguration::default());
        texture.release();
        let _ = texture.handle();
    }

    #[test]
    fn test_shared_resource_lives_as_long_as_the_longest_holder() {
        let device = HeadlessDevice::new();
        let recorder = device.recorder();
        let mut context = GraphicsContext::new(Box::new(device));

        let buffer = Arc::new(Buffer::create(
            &mut context,
            BufferConfiguration { target: BufferTarget::Index, access: BufferAccess::empty(), size: 12 },
            Some(&[0; 12]),
        ));
        let mut vertex_array = VertexArray::create(&mut context);
        vertex_array.bind_index_buffer(&mut context, Arc::clone(&buffer));

        drop(buffer);
        context.collect_garbage();
        assert_eq!(recorder.live_objects_of(ObjectKind::Buffer), 1);

        drop(vertex_array);
        assert_eq!(context.collect_garbage(), 2);
        assert_eq!(recorder.live_objects(), 0);
    }

    #[test]
    #[should_panic(expected = "dynamic storage")]
    fn test_static_buffer_rejects_updates() {
        let mut context = GraphicsContext::new(Box::new(HeadlessDevice::new()));
        let buffer = Buffer::create(&mut context, BufferConfiguration { size: 4, ..Default::default() }, None);
        buffer.set_data(&mut context, 0, &[1, 2, 3, 4]);
    }

    #[test]
    fn test_program_links_stages() {
        let device = HeadlessDevice::new();
        let recorder = device.recorder();
        let mut context = GraphicsContext::new(Box::new(device));

        let vertex = Shader::create(&mut context, &ShaderConfiguration { stage: ShaderStage::Vertex, source: "void main() {}".into() });
        let fragment = Shader::create(&mut context, &ShaderConfiguration { stage: ShaderStage::Fragment, source: "void main() {}".into() });
        let program = ShaderProgram::graphics_pipeline(&mut context, &vertex, None, &fragment);

        assert!(!program.is_compute());
        assert_eq!(recorder.live_objects_of(ObjectKind::ShaderProgram), 1);
        assert_eq!(recorder.live_objects_of(ObjectKind::Shader), 2);
    }

    #[test]
    #[should_panic(expected = "fragment slot")]
    fn test_program_rejects_misplaced_stage() {
        let mut context = GraphicsContext::new(Box::new(HeadlessDevice::new()));
        let vertex = Shader::create(&mut context, &ShaderConfiguration { stage: ShaderStage::Vertex, source: "void main() {}".into() });
        let _ = ShaderProgram::graphics_pipeline(&mut context, &vertex, None, &vertex);
    }
}
