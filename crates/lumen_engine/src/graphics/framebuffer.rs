//! Framebuffer objects

use std::sync::Arc;

use super::context::GraphicsContext;
use super::device::GpuHandle;
use super::object::GpuObject;
use super::texture::{Texture, TextureConfiguration};
use super::types::{ComponentType, Format, FramebufferAttachment, ObjectKind, TextureParameter};

/// Maximum number of color attachments
pub const MAX_COLOR_ATTACHMENTS: usize = 4;

/// Creation options of a [`Framebuffer`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FramebufferConfiguration {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Storage format of each color attachment, in attachment order
    pub color_attachments: Vec<Format>,
    /// Storage format of the depth attachment
    pub depth_attachment: Option<Format>,
}

/// Framebuffer with texture attachments it owns
#[derive(Debug)]
pub struct Framebuffer {
    object: GpuObject,
    configuration: FramebufferConfiguration,
    attachments: Vec<(FramebufferAttachment, Arc<Texture>)>,
}

impl Framebuffer {
    /// Create the framebuffer and its attachment textures
    ///
    /// # Panics
    ///
    /// Panics on more than [`MAX_COLOR_ATTACHMENTS`] color attachments, a color
    /// attachment with a depth format, or a zero size.
    pub fn create(context: &mut GraphicsContext, configuration: FramebufferConfiguration) -> Self {
        assert!(
            configuration.color_attachments.len() <= MAX_COLOR_ATTACHMENTS,
            "{} color attachments requested, at most {MAX_COLOR_ATTACHMENTS} are supported",
            configuration.color_attachments.len()
        );
        assert!(
            configuration.color_attachments.iter().all(|format| !format.is_depth()),
            "color attachments need color formats"
        );

        let handle = context.device().create_framebuffer();
        let mut framebuffer = Self {
            object: GpuObject::new(context, ObjectKind::Framebuffer, handle),
            configuration,
            attachments: Vec::new(),
        };
        framebuffer.create_attachments(context);
        framebuffer
    }

    /// Recreate every attachment with the new size
    pub fn resize(&mut self, context: &mut GraphicsContext, width: u32, height: u32) {
        if (width, height) == (self.configuration.width, self.configuration.height) {
            return;
        }
        self.configuration.width = width;
        self.configuration.height = height;
        self.create_attachments(context);
    }

    fn create_attachments(&mut self, context: &mut GraphicsContext) {
        let (width, height) = (self.configuration.width, self.configuration.height);
        assert!(width > 0 && height > 0, "framebuffer size {width}x{height} is invalid");

        let texture_configuration = TextureConfiguration {
            min_filter: TextureParameter::FilterNearest,
            mag_filter: TextureParameter::FilterNearest,
            wrap_s: TextureParameter::WrapClampToEdge,
            wrap_t: TextureParameter::WrapClampToEdge,
            is_standard_color_space: false,
            mip_levels: 1,
            is_cubemap: false,
        };

        let colors = self
            .configuration
            .color_attachments
            .iter()
            .enumerate()
            .map(|(index, &format)| (FramebufferAttachment::Color(index as u8), format, Format::Rgba, ComponentType::Float));
        let depth = self
            .configuration
            .depth_attachment
            .map(|format| (FramebufferAttachment::Depth, format, format, ComponentType::Float));
        let layout: Vec<_> = colors.chain(depth).collect();

        // Old attachment textures retire when the last holder drops them
        self.attachments.clear();
        let handle = self.handle();
        for (attachment, internal_format, pixel_format, component_type) in layout {
            let mut texture = Texture::create(context, texture_configuration);
            texture.set_data(context, internal_format, width, height, pixel_format, component_type, None);
            context.device().framebuffer_texture(handle, attachment, texture.handle());
            self.attachments.push((attachment, Arc::new(texture)));
        }
    }

    /// Texture attached at `attachment`
    pub fn attachment(&self, attachment: FramebufferAttachment) -> Option<&Arc<Texture>> {
        self.attachments
            .iter()
            .find(|(kind, _)| *kind == attachment)
            .map(|(_, texture)| texture)
    }

    /// Backend name
    pub fn handle(&self) -> GpuHandle {
        self.object.handle()
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.configuration.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.configuration.height
    }

    /// Whether the framebuffer has not been released
    pub fn is_created(&self) -> bool {
        self.object.is_created()
    }

    /// Release the framebuffer; attachments follow when their last holder drops them
    pub fn release(&self) {
        self.object.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::headless::HeadlessDevice;

    fn gbuffer_configuration() -> FramebufferConfiguration {
        FramebufferConfiguration {
            width: 8,
            height: 4,
            color_attachments: vec![Format::Rgba8, Format::Rgba16F],
            depth_attachment: Some(Format::DepthComponent24),
        }
    }

    #[test]
    fn test_attachments_are_created() {
        let device = HeadlessDevice::new();
        let recorder = device.recorder();
        let mut context = GraphicsContext::new(Box::new(device));

        let framebuffer = Framebuffer::create(&mut context, gbuffer_configuration());

        assert!(framebuffer.attachment(FramebufferAttachment::Color(1)).is_some());
        assert!(framebuffer.attachment(FramebufferAttachment::Color(2)).is_none());
        assert_eq!(framebuffer.attachment(FramebufferAttachment::Depth).map(|t| t.width()), Some(8));
        assert_eq!(recorder.live_objects_of(ObjectKind::Texture), 3);
    }

    #[test]
    fn test_resize_recreates_attachments() {
        let device = HeadlessDevice::new();
        let recorder = device.recorder();
        let mut context = GraphicsContext::new(Box::new(device));

        let mut framebuffer = Framebuffer::create(&mut context, gbuffer_configuration());
        let before = framebuffer.attachment(FramebufferAttachment::Color(0)).map(|t| t.handle());

        framebuffer.resize(&mut context, 16, 16);
        assert_eq!(context.collect_garbage(), 3);

        let after = framebuffer.attachment(FramebufferAttachment::Color(0));
        assert_ne!(after.map(|t| t.handle()), before);
        assert_eq!(after.map(|t| (t.width(), t.height())), Some((16, 16)));
        assert_eq!(recorder.live_objects_of(ObjectKind::Texture), 3);
    }

    #[test]
    #[should_panic(expected = "at most")]
    fn test_too_many_color_attachments_panics() {
        let mut context = GraphicsContext::new(Box::new(HeadlessDevice::new()));
        let configuration = FramebufferConfiguration {
            width: 1,
            height: 1,
            color_attachments: vec![Format::Rgba8; 5],
            depth_attachment: None,
        };
        let _ = Framebuffer::create(&mut context, configuration);
    }
}
