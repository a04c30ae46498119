//! In-memory glTF-shaped model document
//!
//! The layout follows glTF 2.0: nodes reference meshes and children by index, mesh
//! primitives reference accessors, accessors reference buffer views, and buffer views
//! slice raw buffers. Numeric enums (component types, targets, primitive modes, sampler
//! filters) keep their glTF codes. Buffers and images arrive already resolved, so the
//! document carries bytes and decoded pixels instead of URIs.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{AssetError, ImageData};

/// `ARRAY_BUFFER` buffer view target
pub const TARGET_ARRAY_BUFFER: u32 = 34962;
/// `ELEMENT_ARRAY_BUFFER` buffer view target
pub const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;
/// `UNSIGNED_SHORT` component type
pub const COMPONENT_UNSIGNED_SHORT: u32 = 5123;
/// `UNSIGNED_INT` component type
pub const COMPONENT_UNSIGNED_INT: u32 = 5125;
/// `FLOAT` component type
pub const COMPONENT_FLOAT: u32 = 5126;
/// `TRIANGLES` primitive mode
pub const MODE_TRIANGLES: u32 = 4;

/// A list of root nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDesc {
    /// Root node indices
    pub nodes: Vec<usize>,
}

/// Local transform of a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NodeTransform {
    /// Column major matrix
    Matrix([f32; 16]),
    /// Translation, rotation quaternion `[x, y, z, w]` and scale
    Trs {
        /// Translation
        translation: [f32; 3],
        /// Rotation quaternion `[x, y, z, w]`
        rotation: [f32; 4],
        /// Scale
        scale: [f32; 3],
    },
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::Trs {
            translation: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0; 3],
        }
    }
}

/// A node of the model hierarchy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDesc {
    /// Optional name
    pub name: Option<String>,
    /// Local transform
    pub transform: NodeTransform,
    /// Mesh drawn at this node
    pub mesh: Option<usize>,
    /// Child node indices
    pub children: Vec<usize>,
}

/// A mesh made of primitives
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshDesc {
    /// Optional name
    pub name: Option<String>,
    /// Sub-draws
    pub primitives: Vec<PrimitiveDesc>,
}

/// One sub-draw of a mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveDesc {
    /// Attribute semantic to accessor index, e.g. `"POSITION" -> 0`
    pub attributes: BTreeMap<String, usize>,
    /// Index accessor
    pub indices: Option<usize>,
    /// Material index
    pub material: Option<usize>,
    /// glTF primitive mode
    pub mode: u32,
}

impl Default for PrimitiveDesc {
    fn default() -> Self {
        Self {
            attributes: BTreeMap::new(),
            indices: None,
            material: None,
            mode: MODE_TRIANGLES,
        }
    }
}

/// Shape of one accessor element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementType {
    /// One component
    Scalar,
    /// Two components
    Vec2,
    /// Three components
    Vec3,
    /// Four components
    Vec4,
    /// 2x2 matrix
    Mat2,
    /// 3x3 matrix
    Mat3,
    /// 4x4 matrix
    Mat4,
}

impl ElementType {
    /// Number of components per element
    pub const fn components(self) -> u32 {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }
}

/// Typed view into a buffer view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessorDesc {
    /// Source buffer view
    pub buffer_view: Option<usize>,
    /// Offset relative to the buffer view
    pub byte_offset: usize,
    /// glTF component type
    pub component_type: u32,
    /// Whether integer data is normalized
    pub normalized: bool,
    /// Number of elements
    pub count: usize,
    /// Element shape
    pub element_type: ElementType,
    /// Per component minimum
    pub min: Vec<f32>,
    /// Per component maximum
    pub max: Vec<f32>,
    /// Whether the accessor stores sparse substitutions
    pub sparse: bool,
}

impl Default for AccessorDesc {
    fn default() -> Self {
        Self {
            buffer_view: None,
            byte_offset: 0,
            component_type: COMPONENT_FLOAT,
            normalized: false,
            count: 0,
            element_type: ElementType::Scalar,
            min: Vec::new(),
            max: Vec::new(),
            sparse: false,
        }
    }
}

impl AccessorDesc {
    /// Size of one element when tightly packed
    pub fn element_size(&self) -> usize {
        let component_size = match self.component_type {
            5120 | 5121 => 1,
            5122 | 5123 => 2,
            _ => 4,
        };
        component_size * self.element_type.components() as usize
    }
}

/// A slice of a buffer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BufferViewDesc {
    /// Source buffer
    pub buffer: usize,
    /// Start of the slice
    pub byte_offset: usize,
    /// Length of the slice
    pub byte_length: usize,
    /// Distance between vertex elements, `None` when tightly packed
    pub byte_stride: Option<usize>,
    /// glTF buffer target
    pub target: Option<u32>,
}

/// Metallic roughness material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDesc {
    /// Optional name
    pub name: Option<String>,
    /// Base color factor
    pub base_color_factor: [f32; 4],
    /// Base color texture index
    pub base_color_texture: Option<usize>,
    /// Metallic factor
    pub metallic_factor: f32,
    /// Roughness factor
    pub roughness_factor: f32,
    /// Combined roughness (green) and metallic (blue) texture index
    pub metallic_roughness_texture: Option<usize>,
    /// Occlusion texture index
    pub occlusion_texture: Option<usize>,
    /// Tangent space normal map index
    pub normal_texture: Option<usize>,
    /// Emissive factor
    pub emissive_factor: [f32; 3],
    /// Emissive texture index
    pub emissive_texture: Option<usize>,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            name: None,
            base_color_factor: [1.0; 4],
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness_texture: None,
            occlusion_texture: None,
            normal_texture: None,
            emissive_factor: [0.0; 3],
            emissive_texture: None,
        }
    }
}

/// Image plus sampler pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureDesc {
    /// Image index
    pub source: Option<usize>,
    /// Sampler index
    pub sampler: Option<usize>,
}

/// Filtering and wrapping overrides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerDesc {
    /// glTF magnification filter
    pub mag_filter: Option<u32>,
    /// glTF minification filter
    pub min_filter: Option<u32>,
    /// glTF wrap mode along s
    pub wrap_s: Option<u32>,
    /// glTF wrap mode along t
    pub wrap_t: Option<u32>,
}

/// An image as resolved by the external loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImageSource {
    /// Decoded pixels
    Decoded(ImageData),
    /// The loader could not resolve or decode the image
    Unavailable {
        /// Where the image was expected
        uri: String,
    },
}

/// A fully resolved model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    /// Scene used when present
    pub default_scene: Option<usize>,
    /// Scenes
    pub scenes: Vec<SceneDesc>,
    /// Nodes
    pub nodes: Vec<NodeDesc>,
    /// Meshes
    pub meshes: Vec<MeshDesc>,
    /// Accessors
    pub accessors: Vec<AccessorDesc>,
    /// Buffer views
    pub buffer_views: Vec<BufferViewDesc>,
    /// Raw buffers
    pub buffers: Vec<Vec<u8>>,
    /// Materials
    pub materials: Vec<MaterialDesc>,
    /// Textures
    pub textures: Vec<TextureDesc>,
    /// Images
    pub images: Vec<ImageSource>,
    /// Samplers
    pub samplers: Vec<SamplerDesc>,
}

fn check(index: usize, len: usize, what: &str, owner: &str) -> Result<(), AssetError> {
    if index < len {
        Ok(())
    } else {
        Err(AssetError::InvalidDocument(format!("{owner} references {what} {index} of {len}")))
    }
}

fn check_optional(index: Option<usize>, len: usize, what: &str, owner: &str) -> Result<(), AssetError> {
    index.map_or(Ok(()), |index| check(index, len, what, owner))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Open,
    Done,
}

/// Reject child lists that lead back to a node on the current path
///
/// Child indices must already be in range.
fn check_node_cycles(nodes: &[NodeDesc]) -> Result<(), AssetError> {
    let mut state = vec![Visit::New; nodes.len()];
    // (node, next child position)
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..nodes.len() {
        if state[root] != Visit::New {
            continue;
        }
        state[root] = Visit::Open;
        stack.push((root, 0));

        while let Some((node, next)) = stack.last_mut() {
            let node = *node;
            if let Some(&child) = nodes[node].children.get(*next) {
                *next += 1;
                match state[child] {
                    Visit::Open => {
                        return Err(AssetError::InvalidDocument(format!(
                            "node {child} is its own ancestor through node {node}"
                        )))
                    }
                    Visit::New => {
                        state[child] = Visit::Open;
                        stack.push((child, 0));
                    }
                    Visit::Done => {}
                }
            } else {
                state[node] = Visit::Done;
                stack.pop();
            }
        }
    }
    Ok(())
}

impl ModelDocument {
    /// The scene to instantiate: the default scene, else the first one
    pub fn active_scene(&self) -> Option<&SceneDesc> {
        self.default_scene
            .and_then(|index| self.scenes.get(index))
            .or_else(|| self.scenes.first())
    }

    /// Bytes of a buffer view
    pub fn buffer_view_bytes(&self, view: &BufferViewDesc) -> Option<&[u8]> {
        self.buffers
            .get(view.buffer)?
            .get(view.byte_offset..view.byte_offset.checked_add(view.byte_length)?)
    }

    /// Read a document stored as RON and validate it
    pub fn from_ron_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let document: Self =
            ron::from_str(&text).map_err(|e| AssetError::InvalidDocument(format!("{}: {e}", path.display())))?;
        document.validate()?;
        log::info!("Read model document {} with {} nodes", path.display(), document.nodes.len());
        Ok(document)
    }

    /// Check that every index points into its table and every buffer view fits its buffer
    ///
    /// Node children must also form a forest: a node that is its own ancestor is
    /// rejected. Scene ingestion indexes the tables directly and walks the child lists
    /// recursively, so documents from untrusted loaders should pass through here first.
    pub fn validate(&self) -> Result<(), AssetError> {
        check_optional(self.default_scene, self.scenes.len(), "scene", "document")?;

        for (i, scene) in self.scenes.iter().enumerate() {
            for &node in &scene.nodes {
                check(node, self.nodes.len(), "node", &format!("scene {i}"))?;
            }
        }
        for (i, node) in self.nodes.iter().enumerate() {
            let owner = format!("node {i}");
            check_optional(node.mesh, self.meshes.len(), "mesh", &owner)?;
            for &child in &node.children {
                check(child, self.nodes.len(), "node", &owner)?;
            }
        }
        check_node_cycles(&self.nodes)?;
        for (i, mesh) in self.meshes.iter().enumerate() {
            for (j, primitive) in mesh.primitives.iter().enumerate() {
                let owner = format!("mesh {i} primitive {j}");
                for &accessor in primitive.attributes.values() {
                    check(accessor, self.accessors.len(), "accessor", &owner)?;
                }
                check_optional(primitive.indices, self.accessors.len(), "accessor", &owner)?;
                check_optional(primitive.material, self.materials.len(), "material", &owner)?;
            }
        }
        for (i, accessor) in self.accessors.iter().enumerate() {
            check_optional(accessor.buffer_view, self.buffer_views.len(), "buffer view", &format!("accessor {i}"))?;
        }
        for (i, view) in self.buffer_views.iter().enumerate() {
            let owner = format!("buffer view {i}");
            check(view.buffer, self.buffers.len(), "buffer", &owner)?;
            if self.buffer_view_bytes(view).is_none() {
                return Err(AssetError::InvalidDocument(format!("{owner} exceeds buffer {}", view.buffer)));
            }
        }
        for (i, material) in self.materials.iter().enumerate() {
            let owner = format!("material {i}");
            for texture in [
                material.base_color_texture,
                material.metallic_roughness_texture,
                material.occlusion_texture,
                material.normal_texture,
                material.emissive_texture,
            ] {
                check_optional(texture, self.textures.len(), "texture", &owner)?;
            }
        }
        for (i, texture) in self.textures.iter().enumerate() {
            let owner = format!("texture {i}");
            check_optional(texture.source, self.images.len(), "image", &owner)?;
            check_optional(texture.sampler, self.samplers.len(), "sampler", &owner)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> ModelDocument {
        let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let indices: [u16; 3] = [0, 1, 2];
        let mut bytes = bytemuck::cast_slice::<f32, u8>(&positions).to_vec();
        bytes.extend_from_slice(bytemuck::cast_slice(&indices));

        ModelDocument {
            scenes: vec![SceneDesc { nodes: vec![0] }],
            nodes: vec![NodeDesc { mesh: Some(0), ..NodeDesc::default() }],
            meshes: vec![MeshDesc {
                name: None,
                primitives: vec![PrimitiveDesc {
                    attributes: BTreeMap::from([("POSITION".to_string(), 0)]),
                    indices: Some(1),
                    ..PrimitiveDesc::default()
                }],
            }],
            accessors: vec![
                AccessorDesc {
                    buffer_view: Some(0),
                    count: 3,
                    element_type: ElementType::Vec3,
                    ..AccessorDesc::default()
                },
                AccessorDesc {
                    buffer_view: Some(1),
                    component_type: COMPONENT_UNSIGNED_SHORT,
                    count: 3,
                    ..AccessorDesc::default()
                },
            ],
            buffer_views: vec![
                BufferViewDesc { buffer: 0, byte_offset: 0, byte_length: 36, byte_stride: None, target: Some(TARGET_ARRAY_BUFFER) },
                BufferViewDesc { buffer: 0, byte_offset: 36, byte_length: 6, byte_stride: None, target: Some(TARGET_ELEMENT_ARRAY_BUFFER) },
            ],
            buffers: vec![bytes],
            ..ModelDocument::default()
        }
    }

    #[test]
    fn test_valid_document_passes() {
        let document = triangle();
        assert!(document.validate().is_ok());
        assert_eq!(document.active_scene().map(|s| s.nodes.len()), Some(1));
        assert_eq!(document.accessors[0].element_size(), 12);
        assert_eq!(document.buffer_view_bytes(&document.buffer_views[1]).map(<[u8]>::len), Some(6));
    }

    #[test]
    fn test_dangling_references_are_reported() {
        let mut document = triangle();
        document.nodes[0].children.push(7);
        let error = document.validate().unwrap_err();
        assert!(error.to_string().contains("node 0 references node 7"));

        let mut document = triangle();
        document.buffer_views[1].byte_length = 64;
        assert!(matches!(document.validate(), Err(AssetError::InvalidDocument(_))));
    }

    #[test]
    fn test_node_cycles_are_rejected() {
        let mut document = triangle();
        document.nodes[0].children.push(0);
        let error = document.validate().unwrap_err();
        assert!(error.to_string().contains("node 0 is its own ancestor"));

        let mut document = triangle();
        document.nodes.push(NodeDesc { children: vec![0], ..NodeDesc::default() });
        document.nodes[0].children.push(1);
        assert!(matches!(document.validate(), Err(AssetError::InvalidDocument(_))));
    }

    #[test]
    fn test_shared_child_is_not_a_cycle() {
        let mut document = triangle();
        document.nodes.push(NodeDesc::default());
        document.nodes.push(NodeDesc { children: vec![1], ..NodeDesc::default() });
        document.nodes[0].children.push(1);
        document.nodes[0].children.push(2);
        assert!(document.validate().is_ok());
    }

    #[test]
    fn test_default_scene_falls_back_to_first() {
        let mut document = triangle();
        document.scenes.push(SceneDesc::default());
        document.default_scene = Some(1);
        assert_eq!(document.active_scene().map(|s| s.nodes.len()), Some(0));

        document.default_scene = None;
        assert_eq!(document.active_scene().map(|s| s.nodes.len()), Some(1));
    }

    #[test]
    fn test_document_round_trips_through_ron() {
        let document = triangle();
        let text = ron::to_string(&document).unwrap();
        let parsed: ModelDocument = ron::from_str(&text).unwrap();
        assert_eq!(parsed, document);
    }

    #[test]
    fn test_missing_ron_file_is_an_io_error() {
        let result = ModelDocument::from_ron_file("/nonexistent/model.ron");
        assert!(matches!(result, Err(AssetError::Io(_))));
    }

    #[test]
    fn test_ron_file_is_read_and_validated() {
        let path = std::env::temp_dir().join(format!("lumen_model_{}.ron", std::process::id()));
        std::fs::write(&path, ron::to_string(&triangle()).unwrap()).unwrap();
        let document = ModelDocument::from_ron_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(document.unwrap(), triangle());

        let mut broken = triangle();
        broken.scenes[0].nodes.push(99);
        std::fs::write(&path, ron::to_string(&broken).unwrap()).unwrap();
        let result = ModelDocument::from_ron_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(AssetError::InvalidDocument(_))));
    }
}
