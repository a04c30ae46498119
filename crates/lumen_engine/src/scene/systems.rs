//! Per-frame scene passes
//!
//! Each pass touches only component payloads, so every traversal runs with
//! structural mutation disallowed. The passes must run in the order
//! transformation → hierarchy → camera; rendering reads the results.

use crate::ecs::{
    CameraComponent, CameraKind, ComponentStorage, MeshComponent, NodeComponent, TransformComponent, Traversal,
};
use crate::foundation::math::{self, Vec3};
use crate::render::RenderSystem;

/// Recompute every local matrix and seed the world matrix with it
pub(crate) fn transformation_update(transformations: &mut ComponentStorage<TransformComponent>) {
    transformations.for_each(
        |storage, index| {
            storage.component_at_mut(index).recompute_local();
            Traversal::Continue
        },
        false,
    );
}

/// Compose each node's world matrix with its parent's
///
/// Node storage keeps parents in front of their children, so one linear pass sees
/// every parent's final world matrix before its children.
pub(crate) fn scene_graph_update(
    nodes: &mut ComponentStorage<NodeComponent>,
    transformations: &mut ComponentStorage<TransformComponent>,
) {
    nodes.for_each(
        |nodes, index| {
            let child = nodes.entity_at(index);
            let parent = nodes.component_at(index).parent_entity;

            let parent_world = transformations
                .get_component_for_entity(parent)
                .map(|transform| transform.world_transformation_matrix);

            match (parent_world, transformations.get_component_for_entity_mut(child)) {
                (Some(parent_world), Some(transform)) => {
                    transform.world_transformation_matrix = parent_world * transform.local_transformation_matrix;
                }
                _ => log::trace!("{child} or its parent {parent} has no transform"),
            }
            Traversal::Continue
        },
        false,
    );
}

/// Rebuild view, projection and view-projection of every camera with a transform
pub(crate) fn camera_update(
    cameras: &mut ComponentStorage<CameraComponent>,
    transformations: &ComponentStorage<TransformComponent>,
) {
    cameras.for_each(
        |cameras, index| {
            let entity = cameras.entity_at(index);
            if let Some(transform) = transformations.get_component_for_entity(entity) {
                update_camera(cameras.component_at_mut(index), &transform.world_position());
            }
            Traversal::Continue
        },
        false,
    );
}

fn update_camera(camera: &mut CameraComponent, position: &Vec3) {
    let front = (camera.target - position).try_normalize(f32::EPSILON).unwrap_or_else(|| -Vec3::z());

    // Looking straight up or down leaves no horizontal right vector
    let right = Vec3::y()
        .cross(&front)
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vec3::x);
    camera.up = front.cross(&right).normalize();

    camera.view = math::look_at_gl(position, &camera.target, &camera.up);
    camera.projection = match camera.kind {
        CameraKind::Perspective => {
            math::perspective_gl(camera.vertical_field_of_view, camera.aspect, camera.z_near, camera.z_far)
        }
        CameraKind::Orthographic => {
            let distance = camera.z_far - camera.z_near;
            math::orthographic_gl(-camera.aspect * distance, camera.aspect * distance, -distance, distance)
        }
    };
    camera.view_projection = camera.projection * camera.view;
}

/// Submit every mesh that has a transform
///
/// Draws follow mesh storage order and, within a mesh, primitive order.
pub(crate) fn render_meshes(
    render_system: &mut RenderSystem,
    meshes: &ComponentStorage<MeshComponent>,
    transformations: &ComponentStorage<TransformComponent>,
) {
    for (entity, mesh) in meshes.iter() {
        let Some(transform) = transformations.get_component_for_entity(entity) else {
            continue;
        };
        let Some(vertex_array) = &mesh.vertex_array else {
            log::debug!("{entity} has a mesh without vertex array");
            continue;
        };

        render_system.bind_vertex_array(std::sync::Arc::clone(vertex_array));
        render_system.set_model_matrix(&transform.world_transformation_matrix);

        for (primitive, material) in mesh.draws() {
            render_system.draw_mesh(
                material,
                primitive.topology,
                primitive.first,
                primitive.count,
                primitive.index_type,
                primitive.instance_count,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Entity;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_view_looks_at_target() {
        let mut camera = CameraComponent::default();
        update_camera(&mut camera, &Vec3::new(0.0, 0.0, 1.5));

        // Target at origin ends up straight ahead on the negative view z axis
        let target = camera.view.transform_point(&math::Point3::origin());
        assert_relative_eq!(target.coords, Vec3::new(0.0, 0.0, -1.5), epsilon = 1e-6);
        assert_relative_eq!(camera.up, Vec3::y(), epsilon = 1e-6);
        assert_relative_eq!(camera.view_projection, camera.projection * camera.view);
    }

    #[test]
    fn test_camera_straight_above_target_keeps_finite_up() {
        let mut camera = CameraComponent::default();
        update_camera(&mut camera, &Vec3::new(0.0, 3.0, 0.0));
        assert!(camera.up.iter().all(|c| c.is_finite()));
        assert!(camera.view.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_orthographic_extent_follows_clip_distance() {
        let mut camera = CameraComponent {
            kind: CameraKind::Orthographic,
            z_near: 1.0,
            z_far: 3.0,
            aspect: 2.0,
            ..CameraComponent::default()
        };
        update_camera(&mut camera, &Vec3::new(0.0, 0.0, 5.0));
        assert_relative_eq!(camera.projection, math::orthographic_gl(-4.0, 4.0, -2.0, 2.0));
    }

    #[test]
    fn test_camera_without_transform_is_left_alone() {
        let mut cameras = ComponentStorage::new();
        cameras.create_component_for(Entity::new(1));
        let transformations = ComponentStorage::<TransformComponent>::new();

        camera_update(&mut cameras, &transformations);
        assert_eq!(cameras.component_at(0).view, math::Mat4::identity());
    }
}
