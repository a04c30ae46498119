//! Scene graph scenarios

use std::sync::Arc;

use approx::assert_relative_eq;

use super::{Scene, SceneBoundaries};
use crate::assets::procedural::cube_document;
use crate::assets::{ImageData, ImageSource, ModelDocument};
use crate::core::config::RenderConfig;
use crate::ecs::{CameraKind, Entity, MeshComponent, Primitive, TransformComponent, MAX_ENTITIES};
use crate::foundation::math::{self, Vec3};
use crate::graphics::headless::{DeviceCall, DeviceRecorder, HeadlessDevice};
use crate::graphics::types::{
    ComponentType, Format, IndexType, PrimitiveTopology, TextureParameter,
};
use crate::graphics::VertexArray;
use crate::render::{Material, RenderSystem};

fn render_system() -> (RenderSystem, DeviceRecorder) {
    let device = HeadlessDevice::new();
    let recorder = device.recorder();
    let mut render_system = RenderSystem::new(Box::new(device));
    render_system
        .configure(&RenderConfig::default())
        .expect("inline shaders always configure");
    (render_system, recorder)
}

fn spawn(scene: &mut Scene, position: Vec3) -> Entity {
    let entity = scene.create_empty();
    scene
        .transformations_mut()
        .insert_component_for(entity, TransformComponent::from_position(position));
    entity
}

fn transform(scene: &Scene, entity: Entity) -> &TransformComponent {
    scene
        .transformations()
        .get_component_for_entity(entity)
        .expect("entity has a transform")
}

fn transform_mut(scene: &mut Scene, entity: Entity) -> &mut TransformComponent {
    scene
        .transformations_mut()
        .get_component_for_entity_mut(entity)
        .expect("entity has a transform")
}

fn world_translation(scene: &Scene, entity: Entity) -> Vec3 {
    transform(scene, entity).world_position()
}

/// Every node's parent, when it is a node too, sits earlier in node storage
fn assert_topological(scene: &Scene) {
    let nodes = scene.nodes();
    for (index, (_, node)) in nodes.iter().enumerate() {
        if let Some(parent_index) = nodes.index_of(node.parent_entity) {
            assert!(
                parent_index < index,
                "{} at {parent_index} is not before its child at {index}",
                node.parent_entity
            );
        }
    }
}

/// `world == parent.world * local` for every node, `world == local` for every root
fn assert_world_matrices(scene: &Scene) {
    for (entity, transform) in scene.transformations().iter() {
        let expected = match scene.parent_of(entity) {
            Some(parent) => scene.transformations().get_component_for_entity(parent).map_or(
                transform.local_transformation_matrix,
                |p| p.world_transformation_matrix * transform.local_transformation_matrix,
            ),
            None => transform.local_transformation_matrix,
        };
        assert_relative_eq!(transform.world_transformation_matrix, expected, epsilon = 1e-5);
    }
}

#[test]
fn test_child_follows_parent_translation() {
    let mut scene = Scene::new("test");
    let a = spawn(&mut scene, Vec3::zeros());
    let b = scene.create_empty();
    scene.attach(b, a);
    transform_mut(&mut scene, b).position = Vec3::new(1.0, 0.0, 0.0);

    scene.update(0.016);
    assert_relative_eq!(world_translation(&scene, b), Vec3::new(1.0, 0.0, 0.0));

    transform_mut(&mut scene, a).position = Vec3::new(5.0, 0.0, 0.0);
    scene.update(0.016);
    assert_relative_eq!(world_translation(&scene, b), Vec3::new(6.0, 0.0, 0.0));
}

#[test]
fn test_world_matrices_compose_through_multiple_levels() {
    let mut scene = Scene::new("test");
    let root = spawn(&mut scene, Vec3::new(1.0, 0.0, 0.0));
    let middle = spawn(&mut scene, Vec3::new(0.0, 2.0, 0.0));
    let leaf = spawn(&mut scene, Vec3::new(0.0, 0.0, 3.0));
    let other_root = spawn(&mut scene, Vec3::new(-4.0, 0.0, 0.0));

    // Attach bottom up so the reorder has work to do
    scene.attach(leaf, middle);
    scene.attach(middle, root);

    transform_mut(&mut scene, root).set_rotation_angle_axis(math::constants::PI / 2.0, Vec3::y());
    transform_mut(&mut scene, middle).scale = Vec3::repeat(2.0);
    scene.update(0.016);

    assert_topological(&scene);
    assert_world_matrices(&scene);

    // Root rotated 90° about y: local z of the leaf, scaled by 2, points along +x
    assert_relative_eq!(world_translation(&scene, leaf), Vec3::new(7.0, 2.0, 0.0), epsilon = 1e-5);

    let other = transform(&scene, other_root);
    assert_eq!(other.world_transformation_matrix, other.local_transformation_matrix);
}

#[test]
fn test_detach_bakes_world_into_local() {
    let mut scene = Scene::new("test");
    let a = spawn(&mut scene, Vec3::new(5.0, 0.0, 0.0));
    let b = spawn(&mut scene, Vec3::new(1.0, 2.0, 0.0));
    scene.attach(b, a);
    transform_mut(&mut scene, a).set_rotation_angle_axis(0.5, Vec3::z());
    scene.update(0.016);

    let world_before = transform(&scene, b).world_transformation_matrix;
    scene.detach(b);

    assert_eq!(transform(&scene, b).local_transformation_matrix, world_before);
    assert_eq!(scene.parent_of(b), None);

    scene.update(0.016);
    assert_relative_eq!(transform(&scene, b).world_transformation_matrix, world_before, epsilon = 1e-5);
}

#[test]
fn test_detach_below_non_uniform_parent_keeps_sheared_world() {
    let mut scene = Scene::new("test");
    let a = spawn(&mut scene, Vec3::zeros());
    let b = spawn(&mut scene, Vec3::new(1.0, 0.0, 0.0));
    transform_mut(&mut scene, a).scale = Vec3::new(2.0, 1.0, 1.0);
    transform_mut(&mut scene, b).set_rotation_angle_axis(std::f32::consts::FRAC_PI_4, Vec3::z());
    scene.attach(b, a);
    scene.update(0.016);

    let world_before = transform(&scene, b).world_transformation_matrix;
    scene.detach(b);
    scene.update(0.016);
    scene.update(0.016);

    assert_relative_eq!(transform(&scene, b).world_transformation_matrix, world_before, epsilon = 1e-5);

    // Moving the entity afterwards falls back to position, rotation and scale
    transform_mut(&mut scene, b).position.z = 2.0;
    scene.update(0.016);
    let moved = transform(&scene, b);
    assert_relative_eq!(
        moved.world_transformation_matrix,
        math::trs_matrix(&moved.position, &moved.rotation, &moved.scale),
        epsilon = 1e-5
    );
}

#[test]
fn test_attach_then_detach_keeps_pre_attach_world() {
    let mut scene = Scene::new("test");
    let a = spawn(&mut scene, Vec3::new(5.0, 0.0, 0.0));
    let b = spawn(&mut scene, Vec3::new(0.0, 1.0, 0.0));
    scene.update(0.016);
    let world_before = transform(&scene, b).world_transformation_matrix;

    scene.attach(b, a);
    scene.detach(b);
    scene.update(0.016);

    assert_relative_eq!(transform(&scene, b).world_transformation_matrix, world_before, epsilon = 1e-5);
}

#[test]
fn test_detach_of_root_is_a_no_op() {
    let mut scene = Scene::new("test");
    let a = spawn(&mut scene, Vec3::new(1.0, 1.0, 1.0));
    scene.detach(a);
    assert_eq!(transform(&scene, a).position, Vec3::new(1.0, 1.0, 1.0));
    assert!(scene.nodes().is_empty());
}

#[test]
fn test_attach_creates_missing_transforms() {
    let mut scene = Scene::new("test");
    let parent = scene.create_empty();
    let child = scene.create_empty();
    scene.attach(child, parent);

    assert!(scene.transformations().contains(parent));
    assert!(scene.transformations().contains(child));
    assert_eq!(scene.parent_of(child), Some(parent));
}

#[test]
fn test_reparenting_keeps_order_in_deep_hierarchies() {
    let mut scene = Scene::new("test");
    let entities: Vec<Entity> = (0..8).map(|i| spawn(&mut scene, Vec3::new(i as f32, 0.0, 0.0))).collect();
    let [a, b, c, d, e, f, g, h] = entities[..] else { unreachable!() };

    // Two chains built leaf first: a <- b <- c <- d and e <- f <- g
    scene.attach(d, c);
    scene.attach(c, b);
    scene.attach(b, a);
    scene.attach(g, f);
    scene.attach(f, e);
    assert_topological(&scene);

    // Move the whole second chain below the leaf of the first
    scene.attach(e, d);
    assert_topological(&scene);

    // Move a middle subtree to a new root, then hang the old root below it
    scene.attach(c, h);
    scene.attach(a, g);
    assert_topological(&scene);
    assert_eq!(scene.parent_of(c), Some(h));
    assert_eq!(scene.parent_of(a), Some(g));

    scene.update(0.016);
    assert_world_matrices(&scene);

    // h(7) -> c(2) -> d(3) -> e(4) -> f(5) -> g(6) -> a(0) -> b(1), positions accumulate
    assert_relative_eq!(world_translation(&scene, b), Vec3::new(28.0, 0.0, 0.0), epsilon = 1e-4);
}

#[test]
fn test_every_attach_order_of_a_chain_ends_topological() {
    // Every order of attaching the three links of a four level chain
    let orders: Vec<[usize; 3]> = vec![[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
    for order in orders {
        let mut scene = Scene::new("test");
        let chain: Vec<Entity> = (0..4).map(|_| spawn(&mut scene, Vec3::new(1.0, 0.0, 0.0))).collect();
        for link in order {
            scene.attach(chain[link + 1], chain[link]);
            assert_topological(&scene);
        }
        scene.update(0.016);
        assert_relative_eq!(world_translation(&scene, chain[3]), Vec3::new(4.0, 0.0, 0.0), epsilon = 1e-5);
    }
}

#[test]
#[should_panic(expected = "beneath its own descendant")]
fn test_attach_below_descendant_panics() {
    let mut scene = Scene::new("test");
    let a = scene.create_empty();
    let b = scene.create_empty();
    let c = scene.create_empty();
    scene.attach(b, a);
    scene.attach(c, b);
    scene.attach(a, c);
}

#[test]
#[should_panic(expected = "beneath its own descendant")]
fn test_attach_to_self_panics() {
    let mut scene = Scene::new("test");
    let a = scene.create_empty();
    scene.attach(a, a);
}

#[test]
#[should_panic(expected = "already has")]
fn test_duplicate_component_panics() {
    let mut scene = Scene::new("test");
    let a = spawn(&mut scene, Vec3::zeros());
    scene.transformations_mut().create_component_for(a);
}

#[test]
fn test_missing_component_is_none() {
    let mut scene = Scene::new("test");
    let a = scene.create_empty();
    assert!(scene.transformations().get_component_for_entity(a).is_none());
    assert!(scene.meshes().get_component_for_entity(Entity::INVALID).is_none());
}

#[test]
fn test_entities_are_never_reused() {
    let mut scene = Scene::new("test");
    let a = scene.create_empty();
    scene.remove_entity(a);
    let b = scene.create_empty();
    assert!(b.id() > a.id());
    assert!(a.is_valid());
}

#[test]
#[should_panic(expected = "entity budget")]
fn test_entity_budget_is_enforced() {
    let mut scene = Scene::new("test");
    for _ in 1..MAX_ENTITIES {
        scene.create_empty();
    }
    scene.create_empty();
}

#[test]
fn test_remove_entity_tears_everything_down() {
    let mut scene = Scene::new("test");
    let parent = spawn(&mut scene, Vec3::zeros());
    let camera = scene.create_default_camera();
    scene.attach(camera, parent);

    scene.remove_entity(camera);
    assert!(!scene.transformations().contains(camera));
    assert!(!scene.cameras().contains(camera));
    assert!(!scene.nodes().contains(camera));
    assert_eq!(scene.active_camera(), None);
    assert!(scene.transformations().contains(parent));
}

#[test]
fn test_default_camera() {
    let mut scene = Scene::new("test");
    let camera = scene.create_default_camera();
    assert_eq!(scene.active_camera(), Some(camera));

    let component = scene.cameras().get_component_for_entity(camera).expect("camera component");
    assert_eq!(component.kind, CameraKind::Perspective);
    assert_relative_eq!(component.aspect, 16.0 / 9.0);
    assert_relative_eq!(component.z_near, 0.1);
    assert_relative_eq!(component.z_far, 10.0);
    assert_relative_eq!(component.vertical_field_of_view, 45.0_f32.to_radians());
    assert_eq!(component.target, Vec3::zeros());
    assert_eq!(transform(&scene, camera).position, Vec3::new(0.0, 0.0, 1.5));

    let expected_view = math::look_at_gl(&Vec3::new(0.0, 0.0, 1.5), &Vec3::zeros(), &Vec3::y());
    assert_relative_eq!(component.view, expected_view, epsilon = 1e-6);
}

#[test]
fn test_camera_follows_parent_transform() {
    let mut scene = Scene::new("test");
    let rig = spawn(&mut scene, Vec3::new(0.0, 0.0, 4.0));
    let camera = scene.create_default_camera();
    transform_mut(&mut scene, camera).position = Vec3::zeros();
    scene.attach(camera, rig);
    scene.update(0.016);

    let component = scene.cameras().get_component_for_entity(camera).expect("camera component");
    let expected_view = math::look_at_gl(&Vec3::new(0.0, 0.0, 4.0), &Vec3::zeros(), &Vec3::y());
    assert_relative_eq!(component.view, expected_view, epsilon = 1e-5);
    assert_relative_eq!(component.view_projection, component.projection * component.view);
}

#[test]
#[should_panic(expected = "no camera component")]
fn test_active_camera_must_be_a_camera() {
    let mut scene = Scene::new("test");
    let a = scene.create_empty();
    scene.set_active_camera(a);
}

#[test]
fn test_mesh_with_two_primitives_draws_twice_in_order() {
    let (mut render_system, recorder) = render_system();
    let mut scene = Scene::new("test");
    let entity = spawn(&mut scene, Vec3::new(0.0, 1.0, 0.0));

    let mut texture = crate::graphics::Texture::create(render_system.context(), Default::default());
    texture.set_data(render_system.context(), Format::Rgba8, 1, 1, Format::Rgba, ComponentType::UnsignedByte, Some(&[0; 4]));
    let texture = Arc::new(texture);

    let vertex_array = Arc::new(VertexArray::create(render_system.context()));
    let mut mesh = MeshComponent::new(vertex_array);
    mesh.push_primitive(
        Primitive { first: 0, count: 6, index_type: IndexType::UnsignedShort, ..Primitive::default() },
        Arc::new(Material::default()),
    );
    mesh.push_primitive(
        Primitive { first: 6, count: 3, index_type: IndexType::UnsignedShort, ..Primitive::default() },
        Arc::new(Material { base_color_texture: Some(Arc::clone(&texture)), ..Material::default() }),
    );
    scene.meshes_mut().insert_component_for(entity, mesh);

    scene.update(0.016);
    recorder.take_calls();
    render_system.set_viewport(0, 0, 64, 64);
    render_system.begin_render();
    scene.render(&mut render_system);
    render_system.finish_render();

    let calls = recorder.calls();
    let draws: Vec<usize> = calls
        .iter()
        .enumerate()
        .filter(|(_, call)| matches!(call, DeviceCall::DrawElements { .. }))
        .map(|(index, _)| index)
        .collect();
    assert_eq!(draws.len(), 2);

    assert!(matches!(calls[draws[0]], DeviceCall::DrawElements { first: 0, count: 6, .. }));
    assert!(matches!(calls[draws[1]], DeviceCall::DrawElements { first: 6, count: 3, .. }));

    let base_color_binding_before = |draw: usize| {
        calls[..draw].iter().rev().find_map(|call| match call {
            DeviceCall::BindTexture { unit: 0, texture } => Some(*texture),
            _ => None,
        })
    };
    assert_eq!(base_color_binding_before(draws[0]), Some(None));
    assert_eq!(base_color_binding_before(draws[1]), Some(Some(texture.handle())));
}

#[test]
fn test_identical_state_is_issued_once() {
    let (mut render_system, recorder) = render_system();
    let mut scene = Scene::new("test");
    let document = cube_document(0.0);
    scene.create_entities_from_model(&document, &mut render_system);
    scene.update(0.016);

    render_system.set_viewport(0, 0, 32, 32);
    render_system.begin_render();
    scene.render(&mut render_system);
    render_system.finish_render();
    let first_frame = render_system.last_frame_stats();

    recorder.take_calls();
    render_system.begin_render();
    scene.render(&mut render_system);
    render_system.finish_render();
    let second_frame = render_system.last_frame_stats();

    assert_eq!(first_frame.draws, second_frame.draws);
    assert!(second_frame.skipped > first_frame.skipped);
    assert_eq!(recorder.count_calls(|c| matches!(c, DeviceCall::SetPolygonMode { .. })), 0);
}

#[test]
fn test_model_ingestion_builds_entities_and_resources() {
    let (mut render_system, recorder) = render_system();
    let mut scene = Scene::new("test");
    let document = cube_document(0.5);

    let entities = scene.create_entities_from_model(&document, &mut render_system);
    assert_eq!(entities.len(), 3);
    let (root, model_root, cube) = (entities[0], entities[1], entities[2]);
    assert_eq!(scene.parent_of(model_root), Some(root));
    assert_eq!(scene.parent_of(cube), Some(model_root));
    assert_topological(&scene);

    // Boundaries: unit cube at y = 0.5 covered by its bounding sphere
    let radius = 3.0_f32.sqrt();
    let boundaries = *scene.scene_boundaries();
    assert_relative_eq!(boundaries.max, Vec3::new(radius, 0.5 + radius, radius), epsilon = 1e-5);
    assert_relative_eq!(boundaries.min, Vec3::new(-radius, 0.5 - radius, -radius), epsilon = 1e-5);

    let scale = 1.0 / (0.5 + 2.0 * radius);
    assert_relative_eq!(transform(&scene, root).scale, Vec3::repeat(scale), epsilon = 1e-6);

    // A default camera was created and aimed at the model
    let camera = scene.active_camera().expect("default camera");
    let camera_component = scene.cameras().get_component_for_entity(camera).expect("camera component");
    assert_relative_eq!(camera_component.target, Vec3::new(0.0, 0.5 * scale, 0.0), epsilon = 1e-6);
    assert_relative_eq!(transform(&scene, camera).position.y, 0.75 * scale, epsilon = 1e-6);

    scene.update(0.016);
    assert_relative_eq!(world_translation(&scene, cube), Vec3::new(0.0, 0.5 * scale, 0.0), epsilon = 1e-6);

    // Mesh: two primitives, element offsets, attributes 0..=2 on separate bindings
    let mesh = scene.meshes().get_component_for_entity(cube).expect("mesh component");
    assert!(mesh.has_normals);
    assert!(!mesh.has_tangents);
    assert_eq!(mesh.primitives().len(), 2);
    assert_eq!(mesh.materials().len(), 2);
    assert_eq!(mesh.primitives()[0].first, 0);
    assert_eq!(mesh.primitives()[1].first, 18);
    assert_eq!(mesh.primitives()[1].count, 18);
    assert_eq!(mesh.primitives()[1].index_type, IndexType::UnsignedShort);
    assert_eq!(mesh.primitives()[0].topology, PrimitiveTopology::Triangles);

    let vertex_array = mesh.vertex_array.as_ref().expect("vertex array");
    assert!((0..3).all(|location| vertex_array.has_attribute(location)));
    assert!(!vertex_array.has_attribute(3));
    assert!(vertex_array.index_buffer().is_some());
    assert_eq!(
        recorder.count_calls(|c| matches!(c, DeviceCall::VertexBuffer { stride: 32, .. })),
        6
    );

    // Materials: factors for the plain one, textures for the other
    let plain = &mesh.materials()[0];
    assert_relative_eq!(plain.base_color, math::Vec4::new(1.0, 0.0, 0.0, 1.0));
    assert_relative_eq!(plain.roughness, 0.5);
    assert!(plain.base_color_texture.is_none());

    let textured = &mesh.materials()[1];
    let base_color = textured.base_color_texture.as_ref().expect("base color texture");
    assert!(textured.packed_occlusion);
    assert!(textured.occlusion_texture.is_none());
    assert!(textured.roughness_metallic_texture.is_some());

    assert_eq!(base_color.internal_format(), Some(Format::Srgb8Alpha8));
    assert_eq!(base_color.mip_levels(), 3);
    let configuration = base_color.configuration();
    assert_eq!(configuration.mag_filter, TextureParameter::FilterNearest);
    assert_eq!(configuration.min_filter, TextureParameter::FilterLinearMipmapLinear);
    assert_eq!(configuration.wrap_s, TextureParameter::WrapClampToEdge);

    let roughness = textured.roughness_metallic_texture.as_ref().expect("roughness texture");
    assert_eq!(roughness.internal_format(), Some(Format::Rgba8));
}

#[test]
fn test_unsupported_document_parts_are_skipped() {
    let (mut render_system, _recorder) = render_system();
    let mut scene = Scene::new("test");
    let mut document: ModelDocument = cube_document(0.0);

    // Untargeted view, sparse normals, second primitive without indices, missing image
    document.buffer_views.push(crate::assets::BufferViewDesc { buffer: 0, byte_length: 4, ..Default::default() });
    document.accessors[1].sparse = true;
    document.meshes[0].primitives[1].indices = None;
    document.images[0] = ImageSource::Unavailable { uri: "missing.png".to_string() };
    assert!(document.validate().is_ok());

    let entities = scene.create_entities_from_model(&document, &mut render_system);
    let mesh = scene.meshes().get_component_for_entity(entities[2]).expect("mesh component");

    assert_eq!(mesh.primitives().len(), 1);
    assert_eq!(mesh.materials().len(), 1);
    assert!(!mesh.has_normals);
    let vertex_array = mesh.vertex_array.as_ref().expect("vertex array");
    assert!(vertex_array.has_attribute(0));
    assert!(!vertex_array.has_attribute(1));
}

#[test]
fn test_unavailable_image_leaves_only_its_slot_empty() {
    let (mut render_system, _recorder) = render_system();
    let mut scene = Scene::new("test");
    let mut document = cube_document(0.0);
    document.images[0] = ImageSource::Unavailable { uri: "missing.png".to_string() };

    let entities = scene.create_entities_from_model(&document, &mut render_system);
    let mesh = scene.meshes().get_component_for_entity(entities[2]).expect("mesh component");
    let textured = &mesh.materials()[1];
    assert!(textured.base_color_texture.is_none());
    assert!(textured.roughness_metallic_texture.is_some());
}

#[test]
fn test_existing_camera_is_reused_for_framing() {
    let (mut render_system, _recorder) = render_system();
    let mut scene = Scene::new("test");
    let camera = scene.create_default_camera();

    scene.create_entities_from_model(&cube_document(0.0), &mut render_system);
    assert_eq!(scene.active_camera(), Some(camera));
    assert_eq!(scene.cameras().len(), 1);
}

#[test]
fn test_empty_model_keeps_unit_scale() {
    let (mut render_system, _recorder) = render_system();
    let mut scene = Scene::new("test");
    let entities = scene.create_entities_from_model(&ModelDocument::default(), &mut render_system);

    assert_eq!(entities.len(), 1);
    assert!(scene.scene_boundaries().is_empty());
    assert_eq!(*scene.scene_boundaries(), SceneBoundaries::empty());
    assert_eq!(transform(&scene, entities[0]).scale, Vec3::repeat(1.0));
}

#[test]
fn test_environment_from_hdr_is_bound_in_lighting_pass() {
    let (mut render_system, recorder) = render_system();
    let mut scene = Scene::new("test");
    let image = ImageData::from_rgba32f(2, 1, &[1.0, 0.5, 0.25, 1.0, 2.0, 2.0, 2.0, 1.0]);

    let entity = scene.create_environment_from_hdr(&image, 1.5, &mut render_system);
    let environment = scene.environments().get_component_for_entity(entity).expect("environment component");
    let texture = environment.hdr_texture.as_ref().expect("hdr texture");
    assert_eq!(texture.internal_format(), Some(Format::Rgba32F));
    assert_eq!(texture.component_type(), Some(ComponentType::Float));
    assert_eq!(texture.mip_levels(), 1);
    assert_eq!(texture.configuration().wrap_t, TextureParameter::WrapClampToEdge);
    assert_eq!(environment.rotation_scale_matrix, math::Mat3::identity());

    render_system.set_viewport(0, 0, 16, 16);
    render_system.begin_render();
    scene.render(&mut render_system);
    render_system.finish_render();

    let handle = texture.handle();
    assert_eq!(
        recorder.count_calls(|c| matches!(c, DeviceCall::BindTexture { unit: 5, texture: Some(t) } if *t == handle)),
        1
    );
}

#[test]
fn test_model_frame_draws_each_primitive_and_lighting() {
    let (mut render_system, _recorder) = render_system();
    let mut scene = Scene::new("test");
    scene.create_entities_from_model(&cube_document(0.0), &mut render_system);
    scene.update(0.016);

    render_system.set_viewport(0, 0, 16, 16);
    render_system.begin_render();
    scene.render(&mut render_system);

    // Two primitives plus the lighting triangle
    let stats = render_system.finish_render();
    assert_eq!(stats.draws, 3);
}
