//! Turning a [`ModelDocument`] into scene entities and GPU resources
//!
//! Unsupported shapes in the document (untargeted buffer views, primitives without
//! indices, sparse accessors, unavailable images) are logged and skipped; the rest of
//! the model still loads.

use std::collections::HashMap;
use std::sync::Arc;

use super::boundaries::SceneBoundaries;
use super::scene_graph::Scene;
use crate::assets::{ImageData, ImageSource, MeshDesc, ModelDocument, NodeDesc, NodeTransform, PrimitiveDesc};
use crate::ecs::{Entity, MeshComponent, Primitive, TransformComponent};
use crate::foundation::math::{Mat4, Quat, Vec3, Vec4};
use crate::graphics::types::{
    AttributeFormat, BufferAccess, BufferTarget, ComponentType, Format, PrimitiveTopology, TextureParameter,
};
use crate::graphics::{
    calculate_mip_count, Buffer, BufferConfiguration, GraphicsContext, Texture, TextureConfiguration, VertexArray,
};
use crate::render::{Material, RenderSystem};

/// Vertex attribute location of each supported glTF semantic
const ATTRIBUTE_LOCATIONS: [(&str, u32); 4] = [("POSITION", 0), ("NORMAL", 1), ("TEXCOORD_0", 2), ("TANGENT", 3)];

/// Textures created during one load, keyed by texture index and color space
type TextureCache = HashMap<(usize, bool), Arc<Texture>>;

/// Pixel transfer format and component type matching a decoded image
pub(super) fn pixel_layout(image: &ImageData) -> (Format, ComponentType) {
    let pixel_format = match image.components {
        1 => Format::Red,
        2 => Format::Rg,
        3 => Format::Rgb,
        _ => Format::Rgba,
    };
    let component_type = match image.bits {
        16 => ComponentType::UnsignedShort,
        32 => ComponentType::Float,
        _ => ComponentType::UnsignedByte,
    };
    (pixel_format, component_type)
}

fn internal_format(image: &ImageData, standard_color_space: bool) -> Format {
    match (image.components == 3, standard_color_space) {
        (true, true) => Format::Srgb8,
        (true, false) => Format::Rgb8,
        (false, true) => Format::Srgb8Alpha8,
        (false, false) => Format::Rgba8,
    }
}

fn node_transform(node: &NodeDesc) -> TransformComponent {
    let mut transform = TransformComponent::default();
    match node.transform {
        NodeTransform::Matrix(elements) => transform.set_from_matrix(&Mat4::from_column_slice(&elements)),
        NodeTransform::Trs { translation, rotation: [x, y, z, w], scale } => {
            transform.position = Vec3::from(translation);
            transform.rotation = Quat::from_quaternion(nalgebra::Quaternion::new(w, x, y, z));
            transform.scale = Vec3::from(scale);
        }
    }
    transform.recompute_local();
    transform
}

impl Scene {
    /// Instantiate the default scene of `document`, or its first scene
    ///
    /// Returns the created entities, the new root first. The root is scaled so the
    /// model spans roughly one unit. Without an active camera a default camera is
    /// created; the active camera is then aimed at the model.
    ///
    /// `document` must pass [`ModelDocument::validate`]; dangling indices panic and
    /// node cycles never terminate.
    pub fn create_entities_from_model(&mut self, document: &ModelDocument, render_system: &mut RenderSystem) -> Vec<Entity> {
        let root = self.create_empty();
        self.transformations.create_component_for(root);
        let mut entities = vec![root];

        self.scene_boundaries = SceneBoundaries::empty();
        let mut textures = TextureCache::new();

        match document.active_scene() {
            Some(scene) => {
                for &index in &scene.nodes {
                    let node = self.build_model_node(
                        &mut entities,
                        document,
                        &document.nodes[index],
                        &Mat4::identity(),
                        render_system.context(),
                        &mut textures,
                    );
                    self.attach(node, root);
                }
            }
            None => log::warn!("Model document has no scenes"),
        }

        let boundaries = self.scene_boundaries;
        let scale = if boundaries.is_empty() || boundaries.extent() <= 0.0 {
            Vec3::repeat(1.0)
        } else {
            Vec3::repeat(1.0 / boundaries.extent())
        };
        if let Some(transform) = self.transformations.get_component_for_entity_mut(root) {
            transform.scale = scale;
            transform.recompute_local();
        }

        if !self.active_camera.is_valid() {
            self.create_default_camera();
        }
        if !boundaries.is_empty() {
            self.frame_active_camera(&boundaries, &scale);
        }

        log::info!(
            "Loaded model with {} entities and {} textures into scene '{}'",
            entities.len(),
            textures.len(),
            self.name()
        );
        entities
    }

    fn frame_active_camera(&mut self, boundaries: &SceneBoundaries, scale: &Vec3) {
        let camera_entity = self.active_camera;
        if let Some(camera) = self.cameras.get_component_for_entity_mut(camera_entity) {
            camera.target = boundaries.center().component_mul(scale);
        }
        if let Some(transform) = self.transformations.get_component_for_entity_mut(camera_entity) {
            transform.position.y = (boundaries.max.y + boundaries.min.y) * 0.75 * scale.y;
        }
    }

    fn build_model_node(
        &mut self,
        entities: &mut Vec<Entity>,
        document: &ModelDocument,
        node: &NodeDesc,
        parent_world: &Mat4,
        context: &mut GraphicsContext,
        textures: &mut TextureCache,
    ) -> Entity {
        let entity = self.create_empty();
        let transform = node_transform(node);
        let trafo = parent_world * transform.local_transformation_matrix;
        self.transformations.insert_component_for(entity, transform);

        if let Some(mesh_index) = node.mesh {
            let mesh = &document.meshes[mesh_index];
            self.build_model_mesh(entity, document, mesh, context, textures);
            update_scene_boundaries(&mut self.scene_boundaries, &trafo, document, mesh);
        }

        entities.push(entity);

        for &child_index in &node.children {
            let child = self.build_model_node(entities, document, &document.nodes[child_index], &trafo, context, textures);
            self.attach(child, entity);
        }
        entity
    }

    fn build_model_mesh(
        &mut self,
        entity: Entity,
        document: &ModelDocument,
        mesh: &MeshDesc,
        context: &mut GraphicsContext,
        textures: &mut TextureCache,
    ) {
        let mut buffers: HashMap<usize, Arc<Buffer>> = HashMap::new();
        for (index, view) in document.buffer_views.iter().enumerate() {
            let Some(target) = view.target.and_then(BufferTarget::from_gltf_target) else {
                log::warn!("Buffer view {index} has no usable target, skipping it");
                continue;
            };
            let Some(bytes) = document.buffer_view_bytes(view) else {
                log::warn!("Buffer view {index} exceeds its buffer, skipping it");
                continue;
            };
            let configuration = BufferConfiguration {
                target,
                access: BufferAccess::empty(),
                size: view.byte_length,
            };
            buffers.insert(index, Arc::new(Buffer::create(context, configuration, Some(bytes))));
        }

        if !shares_vertex_sources(document, mesh) {
            log::warn!(
                "Primitives of mesh {} read different buffer ranges; all of them draw from the last one's",
                mesh.name.as_deref().unwrap_or("<unnamed>")
            );
        }

        let mut vertex_array = VertexArray::create(context);
        let mut component = MeshComponent::default();

        for (primitive_index, primitive) in mesh.primitives.iter().enumerate() {
            let Some(indices) = primitive.indices.map(|index| &document.accessors[index]) else {
                log::debug!("Primitive {primitive_index} has no indices, skipping it");
                continue;
            };
            let Some(index_type) = ComponentType::from_gltf(indices.component_type).and_then(ComponentType::as_index_type) else {
                log::warn!("Primitive {primitive_index} has unsupported index type {}", indices.component_type);
                continue;
            };
            let Some(index_buffer) = indices.buffer_view.and_then(|view| buffers.get(&view)) else {
                log::warn!("Primitive {primitive_index} indices have no index buffer, skipping it");
                continue;
            };
            let topology = PrimitiveTopology::from_gltf_mode(primitive.mode).unwrap_or_else(|| {
                log::warn!("Unknown primitive mode {}, drawing triangles", primitive.mode);
                PrimitiveTopology::Triangles
            });

            vertex_array.bind_index_buffer(context, Arc::clone(index_buffer));

            let material = load_material(document, primitive, context, textures);
            component.push_primitive(
                Primitive {
                    topology,
                    first: u32::try_from(indices.byte_offset).unwrap_or(u32::MAX) / index_type.size(),
                    count: u32::try_from(indices.count).unwrap_or(u32::MAX),
                    index_type,
                    instance_count: 1,
                },
                Arc::new(material),
            );

            let mut binding = 0;
            for (semantic, &accessor_index) in &primitive.attributes {
                let Some(location) = ATTRIBUTE_LOCATIONS.iter().find(|(name, _)| name == semantic).map(|&(_, l)| l) else {
                    log::debug!("Vertex attribute {semantic} is ignored");
                    continue;
                };
                let accessor = &document.accessors[accessor_index];
                if accessor.sparse {
                    log::error!("Sparse accessor for {semantic} is not supported, skipping the attribute");
                    continue;
                }
                let Some(component_type) = ComponentType::from_gltf(accessor.component_type) else {
                    log::warn!("Attribute {semantic} has unsupported component type {}", accessor.component_type);
                    continue;
                };
                let Some((view_index, buffer)) = accessor.buffer_view.and_then(|v| buffers.get(&v).map(|b| (v, b))) else {
                    log::warn!("Attribute {semantic} has no vertex buffer, skipping it");
                    continue;
                };

                let stride = document.buffer_views[view_index]
                    .byte_stride
                    .unwrap_or_else(|| accessor.element_size());
                let format = AttributeFormat {
                    component_type,
                    components: accessor.element_type.components(),
                    normalized: accessor.normalized,
                };
                vertex_array.bind_vertex_buffer(context, binding, Arc::clone(buffer), accessor.byte_offset, stride);
                vertex_array.set_vertex_attribute(context, location, binding, format, 0);
                binding += 1;

                match location {
                    1 => component.has_normals = true,
                    3 => component.has_tangents = true,
                    _ => {}
                }
            }
        }

        component.vertex_array = Some(Arc::new(vertex_array));
        self.meshes.insert_component_for(entity, component);
    }
}

/// Index buffer view plus `(semantic, buffer view, offset)` of every attribute
fn vertex_sources<'a>(document: &ModelDocument, primitive: &'a PrimitiveDesc) -> (Option<usize>, Vec<(&'a str, Option<usize>, usize)>) {
    let indices = primitive.indices.and_then(|index| document.accessors[index].buffer_view);
    let attributes = primitive
        .attributes
        .iter()
        .map(|(semantic, &index)| {
            let accessor = &document.accessors[index];
            (semantic.as_str(), accessor.buffer_view, accessor.byte_offset)
        })
        .collect();
    (indices, attributes)
}

/// Whether every primitive of `mesh` binds the same buffers into the mesh's one vertex array
fn shares_vertex_sources(document: &ModelDocument, mesh: &MeshDesc) -> bool {
    let mut sources = mesh.primitives.iter().map(|primitive| vertex_sources(document, primitive));
    sources.next().map_or(true, |first| sources.all(|other| other == first))
}

/// Material of `primitive`, starting from the engine defaults
fn load_material(
    document: &ModelDocument,
    primitive: &PrimitiveDesc,
    context: &mut GraphicsContext,
    textures: &mut TextureCache,
) -> Material {
    let mut material = Material::default();
    let Some(description) = primitive.material.map(|index| &document.materials[index]) else {
        log::debug!("Primitive has no material, using defaults");
        return material;
    };
    if let Some(name) = &description.name {
        log::debug!("Loading material {name}");
    }

    let mut texture = |index: Option<usize>, srgb: bool| index.and_then(|i| load_texture(document, i, srgb, context, textures));

    material.base_color_texture = texture(description.base_color_texture, true);
    if material.base_color_texture.is_none() {
        material.base_color = Vec4::from(description.base_color_factor);
    }

    material.roughness_metallic_texture = texture(description.metallic_roughness_texture, false);
    if material.roughness_metallic_texture.is_none() {
        material.metallic = description.metallic_factor;
        material.roughness = description.roughness_factor;
    }

    material.packed_occlusion = description.occlusion_texture.is_some()
        && description.occlusion_texture == description.metallic_roughness_texture;
    if !material.packed_occlusion {
        material.occlusion_texture = texture(description.occlusion_texture, false);
    }

    material.normal_texture = texture(description.normal_texture, false);

    material.emissive_color_texture = texture(description.emissive_texture, true);
    if material.emissive_color_texture.is_none() {
        material.emissive_color = Vec3::from(description.emissive_factor);
    }
    material
}

fn load_texture(
    document: &ModelDocument,
    index: usize,
    standard_color_space: bool,
    context: &mut GraphicsContext,
    textures: &mut TextureCache,
) -> Option<Arc<Texture>> {
    if let Some(texture) = textures.get(&(index, standard_color_space)) {
        return Some(Arc::clone(texture));
    }

    let description = &document.textures[index];
    let image = match description.source.map(|source| &document.images[source]) {
        Some(ImageSource::Decoded(image)) if image.width > 0 && image.height > 0 => image,
        Some(ImageSource::Unavailable { uri }) => {
            log::warn!("Image {uri} of texture {index} is unavailable, leaving the slot empty");
            return None;
        }
        _ => {
            log::warn!("Texture {index} has no usable image, leaving the slot empty");
            return None;
        }
    };

    let mut configuration = TextureConfiguration {
        min_filter: TextureParameter::FilterLinearMipmapLinear,
        mag_filter: TextureParameter::FilterLinear,
        wrap_s: TextureParameter::WrapRepeat,
        wrap_t: TextureParameter::WrapRepeat,
        is_standard_color_space: standard_color_space,
        mip_levels: calculate_mip_count(image.width, image.height),
        is_cubemap: false,
    };
    if let Some(sampler) = description.sampler.map(|sampler| &document.samplers[sampler]) {
        let filter = |f: Option<u32>| f.and_then(TextureParameter::from_gltf_filter);
        let wrap = |w: Option<u32>| w.and_then(TextureParameter::from_gltf_wrap);
        configuration.min_filter = filter(sampler.min_filter).unwrap_or(configuration.min_filter);
        configuration.mag_filter = filter(sampler.mag_filter).unwrap_or(configuration.mag_filter);
        configuration.wrap_s = wrap(sampler.wrap_s).unwrap_or(configuration.wrap_s);
        configuration.wrap_t = wrap(sampler.wrap_t).unwrap_or(configuration.wrap_t);
    }

    let (pixel_format, component_type) = pixel_layout(image);
    let mut texture = Texture::create(context, configuration);
    texture.set_data(
        context,
        internal_format(image, standard_color_space),
        image.width,
        image.height,
        pixel_format,
        component_type,
        Some(&image.pixels),
    );

    let texture = Arc::new(texture);
    textures.insert((index, standard_color_space), Arc::clone(&texture));
    Some(texture)
}

/// Grow `boundaries` by the position bounds of every primitive of `mesh`
fn update_scene_boundaries(boundaries: &mut SceneBoundaries, trafo: &Mat4, document: &ModelDocument, mesh: &MeshDesc) {
    for primitive in &mesh.primitives {
        let Some(&position) = primitive.attributes.get("POSITION") else {
            continue;
        };
        let accessor = &document.accessors[position];
        let (Some(min), Some(max)) = (accessor.min.get(..3), accessor.max.get(..3)) else {
            log::debug!("POSITION accessor {position} has no bounds");
            continue;
        };
        boundaries.include_transformed(trafo, &Vec3::from_column_slice(min), &Vec3::from_column_slice(max));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pixel_layout_follows_channels_and_depth() {
        let mut image = ImageData::solid_color(1, 1, [0; 4]);
        assert_eq!(pixel_layout(&image), (Format::Rgba, ComponentType::UnsignedByte));
        assert_eq!(internal_format(&image, true), Format::Srgb8Alpha8);

        image.components = 3;
        image.bits = 16;
        assert_eq!(pixel_layout(&image), (Format::Rgb, ComponentType::UnsignedShort));
        assert_eq!(internal_format(&image, false), Format::Rgb8);

        image.components = 1;
        image.bits = 32;
        assert_eq!(pixel_layout(&image), (Format::Red, ComponentType::Float));
    }

    #[test]
    fn test_trs_node_uses_xyzw_quaternion() {
        let half = std::f32::consts::FRAC_1_SQRT_2;
        let node = NodeDesc {
            transform: NodeTransform::Trs {
                translation: [1.0, 2.0, 3.0],
                rotation: [0.0, half, 0.0, half],
                scale: [2.0, 2.0, 2.0],
            },
            ..NodeDesc::default()
        };
        let transform = node_transform(&node);

        let angle_axis = transform.rotation_angle_axis();
        assert_relative_eq!(angle_axis.x, std::f32::consts::FRAC_PI_2, epsilon = 1e-5);
        assert_relative_eq!(angle_axis.z, 1.0, epsilon = 1e-5);
        assert_relative_eq!(transform.world_position(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_primitives_sharing_buffers_are_detected() {
        let document = crate::assets::procedural::cube_document(0.0);
        assert!(shares_vertex_sources(&document, &document.meshes[0]));

        let mut document = crate::assets::procedural::cube_document(0.0);
        let mut moved = document.accessors[0].clone();
        moved.byte_offset = 4;
        document.accessors.push(moved);
        let moved_index = document.accessors.len() - 1;
        document.meshes[0].primitives[1].attributes.insert("POSITION".to_string(), moved_index);
        assert!(!shares_vertex_sources(&document, &document.meshes[0]));
    }

    #[test]
    fn test_sheared_matrix_node_is_kept_exactly() {
        let matrix = Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 1.0, 1.0)) * Mat4::from_euler_angles(0.0, 0.0, 0.7);
        let mut elements = [0.0; 16];
        elements.copy_from_slice(matrix.as_slice());
        let node = NodeDesc { transform: NodeTransform::Matrix(elements), ..NodeDesc::default() };

        let transform = node_transform(&node);
        assert!(transform.has_baked_matrix());
        assert_eq!(transform.local_transformation_matrix, matrix);
    }

    #[test]
    fn test_matrix_node_is_decomposed() {
        let matrix = Mat4::new_translation(&Vec3::new(4.0, 0.0, -1.0)) * Mat4::new_scaling(3.0);
        let mut elements = [0.0; 16];
        elements.copy_from_slice(matrix.as_slice());
        let node = NodeDesc { transform: NodeTransform::Matrix(elements), ..NodeDesc::default() };

        let transform = node_transform(&node);
        assert_relative_eq!(transform.position, Vec3::new(4.0, 0.0, -1.0), epsilon = 1e-6);
        assert_relative_eq!(transform.scale, Vec3::repeat(3.0), epsilon = 1e-6);
        assert_relative_eq!(transform.local_transformation_matrix, matrix, epsilon = 1e-5);
    }
}
