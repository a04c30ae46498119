//! Texture objects

use super::context::GraphicsContext;
use super::device::{GpuHandle, SamplerParameters};
use super::object::GpuObject;
use super::types::{ComponentType, Format, ObjectKind, TextureParameter};

/// Number of mip levels of a full chain for a `width` x `height` image
pub fn calculate_mip_count(width: u32, height: u32) -> u32 {
    1 + width.max(height).max(1).ilog2()
}

/// Creation options of a [`Texture`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureConfiguration {
    /// Minification filter
    pub min_filter: TextureParameter,
    /// Magnification filter
    pub mag_filter: TextureParameter,
    /// Wrap mode along s
    pub wrap_s: TextureParameter,
    /// Wrap mode along t
    pub wrap_t: TextureParameter,
    /// Whether color data is sRGB encoded
    pub is_standard_color_space: bool,
    /// Number of mip levels to allocate; more than one generates mipmaps
    pub mip_levels: u32,
    /// Six-faced cubemap instead of a 2D texture
    pub is_cubemap: bool,
}

impl Default for TextureConfiguration {
    fn default() -> Self {
        Self {
            min_filter: TextureParameter::FilterLinear,
            mag_filter: TextureParameter::FilterLinear,
            wrap_s: TextureParameter::WrapRepeat,
            wrap_t: TextureParameter::WrapRepeat,
            is_standard_color_space: true,
            mip_levels: 1,
            is_cubemap: false,
        }
    }
}

/// Texture object
#[derive(Debug)]
pub struct Texture {
    object: GpuObject,
    configuration: TextureConfiguration,
    width: u32,
    height: u32,
    internal_format: Option<Format>,
    pixel_format: Option<Format>,
    component_type: Option<ComponentType>,
}

impl Texture {
    /// Create a texture without storage
    pub fn create(context: &mut GraphicsContext, configuration: TextureConfiguration) -> Self {
        let sampler = SamplerParameters {
            min_filter: configuration.min_filter,
            mag_filter: configuration.mag_filter,
            wrap_s: configuration.wrap_s,
            wrap_t: configuration.wrap_t,
        };
        let handle = context.device().create_texture(configuration.is_cubemap, sampler);
        Self {
            object: GpuObject::new(context, ObjectKind::Texture, handle),
            configuration,
            width: 0,
            height: 0,
            internal_format: None,
            pixel_format: None,
            component_type: None,
        }
    }

    /// Allocate storage and upload level 0
    ///
    /// Cubemaps receive `data` on all six faces. Mipmaps are generated when more than
    /// one level is configured. `None` only allocates.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn set_data(
        &mut self,
        context: &mut GraphicsContext,
        internal_format: Format,
        width: u32,
        height: u32,
        pixel_format: Format,
        component_type: ComponentType,
        data: Option<&[u8]>,
    ) {
        assert!(width > 0 && height > 0, "texture size {width}x{height} is invalid");
        let handle = self.handle();
        let levels = self.configuration.mip_levels.max(1);

        self.width = width;
        self.height = height;
        self.internal_format = Some(internal_format);
        self.pixel_format = Some(pixel_format);
        self.component_type = Some(component_type);

        let device = context.device();
        device.texture_storage(handle, levels, internal_format, width, height);
        if let Some(data) = data {
            let layers = if self.configuration.is_cubemap { 6 } else { 1 };
            for layer in 0..layers {
                device.texture_sub_image(handle, 0, layer, width, height, pixel_format, component_type, data);
            }
        }
        if levels > 1 {
            device.generate_mipmaps(handle);
        }
    }

    /// Backend name
    pub fn handle(&self) -> GpuHandle {
        self.object.handle()
    }

    /// Creation options
    pub fn configuration(&self) -> &TextureConfiguration {
        &self.configuration
    }

    /// Width of level 0, 0 before [`set_data`](Self::set_data)
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of level 0, 0 before [`set_data`](Self::set_data)
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Storage format
    pub fn internal_format(&self) -> Option<Format> {
        self.internal_format
    }

    /// Pixel transfer format of the last upload
    pub fn pixel_format(&self) -> Option<Format> {
        self.pixel_format
    }

    /// Component type of the last upload
    pub fn component_type(&self) -> Option<ComponentType> {
        self.component_type
    }

    /// Number of allocated mip levels
    pub fn mip_levels(&self) -> u32 {
        self.configuration.mip_levels.max(1)
    }

    /// Whether this is a cubemap
    pub fn is_cubemap(&self) -> bool {
        self.configuration.is_cubemap
    }

    /// Whether the texture has not been released
    pub fn is_created(&self) -> bool {
        self.object.is_created()
    }

    /// Release the backend object
    pub fn release(&self) {
        self.object.release();
    }
}
