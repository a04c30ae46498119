//! Backend-neutral enumerations used by resources, the state cache and commands

use bitflags::bitflags;

/// Primitive assembly mode of a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Isolated points
    Points,
    /// Isolated lines
    Lines,
    /// Closed line loop
    LineLoop,
    /// Connected line strip
    LineStrip,
    /// Isolated triangles
    #[default]
    Triangles,
    /// Triangle strip
    TriangleStrip,
    /// Triangle fan
    TriangleFan,
}

impl PrimitiveTopology {
    /// Map a glTF primitive mode to a topology
    pub fn from_gltf_mode(mode: u32) -> Option<Self> {
        Some(match mode {
            0 => Self::Points,
            1 => Self::Lines,
            2 => Self::LineLoop,
            3 => Self::LineStrip,
            4 => Self::Triangles,
            5 => Self::TriangleStrip,
            6 => Self::TriangleFan,
            _ => return None,
        })
    }
}

/// Element type of an index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexType {
    /// 8 bit indices
    UnsignedByte,
    /// 16 bit indices
    UnsignedShort,
    /// 32 bit indices
    #[default]
    UnsignedInt,
}

impl IndexType {
    /// Size of one index in bytes
    pub const fn size(self) -> u32 {
        match self {
            Self::UnsignedByte => 1,
            Self::UnsignedShort => 2,
            Self::UnsignedInt => 4,
        }
    }
}

/// Scalar type of vertex attributes and pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// `i8`
    Byte,
    /// `u8`
    UnsignedByte,
    /// `i16`
    Short,
    /// `u16`
    UnsignedShort,
    /// `i32`
    Int,
    /// `u32`
    UnsignedInt,
    /// `f32`
    Float,
}

impl ComponentType {
    /// Map a glTF accessor component type
    pub fn from_gltf(component_type: u32) -> Option<Self> {
        Some(match component_type {
            5120 => Self::Byte,
            5121 => Self::UnsignedByte,
            5122 => Self::Short,
            5123 => Self::UnsignedShort,
            5125 => Self::UnsignedInt,
            5126 => Self::Float,
            _ => return None,
        })
    }

    /// Size of one component in bytes
    pub const fn size(self) -> u32 {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort => 2,
            Self::Int | Self::UnsignedInt | Self::Float => 4,
        }
    }

    /// Index type with the same width, if one exists
    pub const fn as_index_type(self) -> Option<IndexType> {
        match self {
            Self::UnsignedByte => Some(IndexType::UnsignedByte),
            Self::UnsignedShort => Some(IndexType::UnsignedShort),
            Self::UnsignedInt => Some(IndexType::UnsignedInt),
            _ => None,
        }
    }
}

/// Texture storage and pixel transfer formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// One channel pixel data
    Red,
    /// Two channel pixel data
    Rg,
    /// Three channel pixel data
    Rgb,
    /// Four channel pixel data
    Rgba,
    /// 8 bit normalized RGB storage
    Rgb8,
    /// 8 bit normalized RGBA storage
    Rgba8,
    /// sRGB encoded RGB storage
    Srgb8,
    /// sRGB encoded RGBA storage
    Srgb8Alpha8,
    /// Half float RGB storage
    Rgb16F,
    /// Half float RGBA storage
    Rgba16F,
    /// Float RGB storage
    Rgb32F,
    /// Float RGBA storage
    Rgba32F,
    /// 24 bit depth storage
    DepthComponent24,
    /// 32 bit float depth storage
    DepthComponent32F,
}

impl Format {
    /// Whether this is a depth storage format
    pub const fn is_depth(self) -> bool {
        matches!(self, Self::DepthComponent24 | Self::DepthComponent32F)
    }
}

/// Texture filtering and wrapping parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureParameter {
    /// Nearest texel
    FilterNearest,
    /// Linear interpolation
    FilterLinear,
    /// Nearest texel of the nearest mip level
    FilterNearestMipmapNearest,
    /// Linear interpolation in the nearest mip level
    FilterLinearMipmapNearest,
    /// Nearest texel, blended between mip levels
    FilterNearestMipmapLinear,
    /// Trilinear filtering
    FilterLinearMipmapLinear,
    /// Repeat the texture
    WrapRepeat,
    /// Mirror on every repeat
    WrapMirroredRepeat,
    /// Clamp coordinates to the edge texels
    WrapClampToEdge,
    /// Clamp coordinates to the border color
    WrapClampToBorder,
}

impl TextureParameter {
    /// Map a glTF sampler filter
    pub fn from_gltf_filter(filter: u32) -> Option<Self> {
        Some(match filter {
            9728 => Self::FilterNearest,
            9729 => Self::FilterLinear,
            9984 => Self::FilterNearestMipmapNearest,
            9985 => Self::FilterLinearMipmapNearest,
            9986 => Self::FilterNearestMipmapLinear,
            9987 => Self::FilterLinearMipmapLinear,
            _ => return None,
        })
    }

    /// Map a glTF sampler wrap mode
    pub fn from_gltf_wrap(wrap: u32) -> Option<Self> {
        Some(match wrap {
            10497 => Self::WrapRepeat,
            33648 => Self::WrapMirroredRepeat,
            33071 => Self::WrapClampToEdge,
            _ => return None,
        })
    }
}

/// Depth comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareOperation {
    /// Never passes
    Never,
    /// Passes if less
    #[default]
    Less,
    /// Passes if equal
    Equal,
    /// Passes if less or equal
    LessEqual,
    /// Passes if greater
    Greater,
    /// Passes if not equal
    NotEqual,
    /// Passes if greater or equal
    GreaterEqual,
    /// Always passes
    Always,
}

/// Polygon faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonFace {
    /// Front facing polygons
    Front,
    /// Back facing polygons
    #[default]
    Back,
    /// Both faces
    FrontAndBack,
}

/// Polygon rasterization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonMode {
    /// Vertices only
    Point,
    /// Edges only
    Line,
    /// Filled polygons
    #[default]
    Fill,
}

/// Blend factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// 0
    Zero,
    /// 1
    One,
    /// Source color
    SrcColor,
    /// 1 - source color
    OneMinusSrcColor,
    /// Source alpha
    SrcAlpha,
    /// 1 - source alpha
    OneMinusSrcAlpha,
    /// Destination alpha
    DstAlpha,
    /// 1 - destination alpha
    OneMinusDstAlpha,
}

/// What a buffer is bound as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferTarget {
    /// Vertex attribute data
    #[default]
    Vertex,
    /// Index data
    Index,
    /// Uniform blocks
    Uniform,
    /// Shader storage
    ShaderStorage,
    /// Texture source data
    Texture,
}

impl BufferTarget {
    /// Map a glTF buffer view target; 0 means no target
    pub fn from_gltf_target(target: u32) -> Option<Self> {
        match target {
            34962 => Some(Self::Vertex),
            34963 => Some(Self::Index),
            _ => None,
        }
    }
}

bitflags! {
    /// Access rights requested for buffer storage
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferAccess: u32 {
        /// Contents may be updated after creation
        const DYNAMIC_STORAGE = 1 << 0;
        /// Storage may be mapped for reading
        const MAP_READ = 1 << 1;
        /// Storage may be mapped for writing
        const MAP_WRITE = 1 << 2;
    }
}

impl Default for BufferAccess {
    fn default() -> Self {
        Self::empty()
    }
}

bitflags! {
    /// Framebuffer aspects to clear
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        /// Color attachments
        const COLOR = 1 << 0;
        /// Depth attachment
        const DEPTH = 1 << 1;
        /// Stencil attachment
        const STENCIL = 1 << 2;
    }
}

/// Shader stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex stage
    Vertex,
    /// Geometry stage
    Geometry,
    /// Fragment stage
    Fragment,
    /// Compute stage
    Compute,
}

/// Framebuffer attachment points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferAttachment {
    /// Color attachment 0 to 3
    Color(u8),
    /// Depth attachment
    Depth,
}

/// Layout of one vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeFormat {
    /// Scalar type
    pub component_type: ComponentType,
    /// Number of components, 1 to 4
    pub components: u32,
    /// Whether integer data is normalized to `[0, 1]` / `[-1, 1]`
    pub normalized: bool,
}

impl AttributeFormat {
    /// Float vector attribute with `components` components
    pub const fn float(components: u32) -> Self {
        Self {
            component_type: ComponentType::Float,
            components,
            normalized: false,
        }
    }
}

/// Value of a non-buffered uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// `int`
    Int(i32),
    /// `float`
    Float(f32),
    /// `vec3`
    Vec3([f32; 3]),
    /// `vec4`
    Vec4([f32; 4]),
    /// `mat4`, column major
    Mat4([f32; 16]),
}

/// Kinds of backend objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Buffer object
    Buffer,
    /// Vertex array object
    VertexArray,
    /// Texture object
    Texture,
    /// Shader object
    Shader,
    /// Linked shader program
    ShaderProgram,
    /// Framebuffer object
    Framebuffer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gltf_mappings() {
        assert_eq!(PrimitiveTopology::from_gltf_mode(4), Some(PrimitiveTopology::Triangles));
        assert_eq!(PrimitiveTopology::from_gltf_mode(9), None);
        assert_eq!(ComponentType::from_gltf(5123).and_then(ComponentType::as_index_type), Some(IndexType::UnsignedShort));
        assert_eq!(ComponentType::from_gltf(5126).and_then(ComponentType::as_index_type), None);
        assert_eq!(BufferTarget::from_gltf_target(34963), Some(BufferTarget::Index));
        assert_eq!(BufferTarget::from_gltf_target(0), None);
        assert_eq!(TextureParameter::from_gltf_wrap(33071), Some(TextureParameter::WrapClampToEdge));
    }

    #[test]
    fn test_sizes() {
        assert_eq!(IndexType::UnsignedShort.size(), 2);
        assert_eq!(ComponentType::Float.size(), 4);
        assert_eq!(ComponentType::Byte.size(), 1);
    }
}
