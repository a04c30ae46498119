//! Procedurally built model documents
//!
//! Used by the viewer binary and by tests that need a complete document without
//! an external loader.

use std::collections::BTreeMap;

use super::model::{
    AccessorDesc, BufferViewDesc, ElementType, ImageSource, MaterialDesc, MeshDesc, ModelDocument, NodeDesc,
    NodeTransform, PrimitiveDesc, SamplerDesc, SceneDesc, TextureDesc, COMPONENT_UNSIGNED_SHORT,
    TARGET_ARRAY_BUFFER, TARGET_ELEMENT_ARRAY_BUFFER,
};
use super::ImageData;

const VERTEX_STRIDE: usize = 8 * 4;

#[rustfmt::skip]
const CUBE_VERTICES: [[f32; 8]; 8] = [
    // position, normal, uv
    [-1.0, -1.0,  1.0,  0.0, 0.0,  1.0,  0.0, 0.0],
    [ 1.0, -1.0,  1.0,  0.0, 0.0,  1.0,  1.0, 0.0],
    [ 1.0,  1.0,  1.0,  0.0, 0.0,  1.0,  1.0, 1.0],
    [-1.0,  1.0,  1.0,  0.0, 0.0,  1.0,  0.0, 1.0],
    [-1.0, -1.0, -1.0,  0.0, 0.0, -1.0,  1.0, 0.0],
    [-1.0,  1.0, -1.0,  0.0, 0.0, -1.0,  1.0, 1.0],
    [ 1.0,  1.0, -1.0,  0.0, 0.0, -1.0,  0.0, 1.0],
    [ 1.0, -1.0, -1.0,  0.0, 0.0, -1.0,  0.0, 0.0],
];

#[rustfmt::skip]
const CUBE_INDICES: [u16; 36] = [
    // Front, back, left
    0, 1, 2, 2, 3, 0,
    4, 5, 6, 6, 7, 4,
    4, 0, 3, 3, 5, 4,
    // Right, top, bottom
    1, 7, 6, 6, 2, 1,
    3, 2, 6, 6, 5, 3,
    4, 7, 1, 1, 0, 4,
];

/// A cube centered at `(0, offset_y, 0)` below a root node
///
/// The cube mesh has two primitives of 18 indices each. The first uses a plain red
/// material; the second a textured material whose roughness/metallic texture also
/// packs occlusion.
pub fn cube_document(offset_y: f32) -> ModelDocument {
    let vertex_bytes: Vec<u8> = CUBE_VERTICES.iter().flat_map(|v| bytemuck::cast_slice::<f32, u8>(v).to_vec()).collect();
    let index_bytes: &[u8] = bytemuck::cast_slice(&CUBE_INDICES);
    let vertex_length = vertex_bytes.len();

    let mut buffer = vertex_bytes;
    buffer.extend_from_slice(index_bytes);

    let vertex_accessor = |byte_offset: usize, element_type: ElementType| AccessorDesc {
        buffer_view: Some(0),
        byte_offset,
        count: CUBE_VERTICES.len(),
        element_type,
        ..AccessorDesc::default()
    };
    let index_accessor = |first: usize| AccessorDesc {
        buffer_view: Some(1),
        byte_offset: first * 2,
        component_type: COMPONENT_UNSIGNED_SHORT,
        count: 18,
        ..AccessorDesc::default()
    };
    let primitive = |indices: usize, material: usize| PrimitiveDesc {
        attributes: BTreeMap::from([
            ("POSITION".to_string(), 0),
            ("NORMAL".to_string(), 1),
            ("TEXCOORD_0".to_string(), 2),
        ]),
        indices: Some(indices),
        material: Some(material),
        ..PrimitiveDesc::default()
    };

    ModelDocument {
        default_scene: Some(0),
        scenes: vec![SceneDesc { nodes: vec![0] }],
        nodes: vec![
            NodeDesc {
                name: Some("root".to_string()),
                children: vec![1],
                ..NodeDesc::default()
            },
            NodeDesc {
                name: Some("cube".to_string()),
                transform: NodeTransform::Trs {
                    translation: [0.0, offset_y, 0.0],
                    rotation: [0.0, 0.0, 0.0, 1.0],
                    scale: [1.0; 3],
                },
                mesh: Some(0),
                children: Vec::new(),
            },
        ],
        meshes: vec![MeshDesc {
            name: Some("cube".to_string()),
            primitives: vec![primitive(3, 0), primitive(4, 1)],
        }],
        accessors: vec![
            AccessorDesc {
                min: vec![-1.0; 3],
                max: vec![1.0; 3],
                ..vertex_accessor(0, ElementType::Vec3)
            },
            vertex_accessor(12, ElementType::Vec3),
            vertex_accessor(24, ElementType::Vec2),
            index_accessor(0),
            index_accessor(18),
        ],
        buffer_views: vec![
            BufferViewDesc {
                buffer: 0,
                byte_offset: 0,
                byte_length: vertex_length,
                byte_stride: Some(VERTEX_STRIDE),
                target: Some(TARGET_ARRAY_BUFFER),
            },
            BufferViewDesc {
                buffer: 0,
                byte_offset: vertex_length,
                byte_length: index_bytes.len(),
                byte_stride: None,
                target: Some(TARGET_ELEMENT_ARRAY_BUFFER),
            },
        ],
        buffers: vec![buffer],
        materials: vec![
            MaterialDesc {
                name: Some("red".to_string()),
                base_color_factor: [1.0, 0.0, 0.0, 1.0],
                metallic_factor: 0.0,
                roughness_factor: 0.5,
                ..MaterialDesc::default()
            },
            MaterialDesc {
                name: Some("checker".to_string()),
                base_color_texture: Some(0),
                metallic_roughness_texture: Some(1),
                occlusion_texture: Some(1),
                ..MaterialDesc::default()
            },
        ],
        textures: vec![
            TextureDesc { source: Some(0), sampler: Some(0) },
            TextureDesc { source: Some(1), sampler: None },
        ],
        images: vec![
            ImageSource::Decoded(ImageData::solid_color(4, 4, [255, 255, 255, 255])),
            ImageSource::Decoded(ImageData::solid_color(2, 2, [255, 128, 0, 255])),
        ],
        samplers: vec![SamplerDesc {
            mag_filter: Some(9728),
            min_filter: None,
            wrap_s: Some(33071),
            wrap_t: Some(33071),
        }],
    }
}
