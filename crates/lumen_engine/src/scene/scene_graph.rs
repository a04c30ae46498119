//! The scene: component storages, hierarchy maintenance and the frame passes

use std::sync::Arc;

use super::boundaries::SceneBoundaries;
use super::model_loader::pixel_layout;
use super::systems;
use crate::assets::ImageData;
use crate::ecs::{
    CameraComponent, CameraKind, ComponentStorage, EnvironmentComponent, MeshComponent, NodeComponent,
    TransformComponent, Traversal, Entity, MAX_ENTITIES,
};
use crate::foundation::math::{Mat3, Vec3};
use crate::graphics::types::{Format, TextureParameter};
use crate::graphics::{Texture, TextureConfiguration};
use crate::render::RenderSystem;

/// Entity-component scene graph
///
/// Owns one storage per component kind. Node storage is kept in topological order:
/// whenever an entity and its parent both carry a node component, the parent sits
/// earlier. [`Scene::update`] relies on that to propagate world matrices in one pass.
pub struct Scene {
    name: String,
    next_entity: u32,
    pub(super) transformations: ComponentStorage<TransformComponent>,
    pub(super) nodes: ComponentStorage<NodeComponent>,
    pub(super) meshes: ComponentStorage<MeshComponent>,
    pub(super) cameras: ComponentStorage<CameraComponent>,
    pub(super) environments: ComponentStorage<EnvironmentComponent>,
    pub(super) active_camera: Entity,
    pub(super) scene_boundaries: SceneBoundaries,
}

impl Scene {
    /// Create an empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            next_entity: 1,
            transformations: ComponentStorage::new(),
            nodes: ComponentStorage::new(),
            meshes: ComponentStorage::new(),
            cameras: ComponentStorage::new(),
            environments: ComponentStorage::new(),
            active_camera: Entity::INVALID,
            scene_boundaries: SceneBoundaries::empty(),
        }
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Allocate a new entity without components
    ///
    /// # Panics
    ///
    /// Panics once [`MAX_ENTITIES`] identifiers were handed out. Identifiers are never
    /// reused, so removed entities still count.
    pub fn create_empty(&mut self) -> Entity {
        assert!(self.next_entity < MAX_ENTITIES, "entity budget of {MAX_ENTITIES} exhausted");
        let entity = Entity::new(self.next_entity);
        self.next_entity += 1;
        entity
    }

    /// Detach `entity` and remove every component it has
    pub fn remove_entity(&mut self, entity: Entity) {
        self.detach(entity);
        self.transformations.remove_component_from(entity);
        self.meshes.remove_component_from(entity);
        self.cameras.remove_component_from(entity);
        self.environments.remove_component_from(entity);

        if self.active_camera == entity {
            self.active_camera = Entity::INVALID;
        }
        log::debug!("Removed {entity}");
    }

    /// Create a perspective camera at `(0, 0, 1.5)` looking at the origin
    ///
    /// The new camera becomes the active camera.
    pub fn create_default_camera(&mut self) -> Entity {
        let entity = self.create_empty();
        let camera = self.cameras.create_component_for(entity);
        *camera = CameraComponent {
            kind: CameraKind::Perspective,
            aspect: 16.0 / 9.0,
            z_near: 0.1,
            z_far: 10.0,
            vertical_field_of_view: 45.0_f32.to_radians(),
            up: Vec3::y(),
            target: Vec3::zeros(),
            ..CameraComponent::default()
        };
        self.transformations
            .insert_component_for(entity, TransformComponent::from_position(Vec3::new(0.0, 0.0, 1.5)))
            .recompute_local();

        self.active_camera = entity;
        systems::camera_update(&mut self.cameras, &self.transformations);
        entity
    }

    /// Create an entity holding an HDR environment and hand it to the render system
    ///
    /// The texture is uploaded as a single level, linear, clamped RGBA32F image.
    pub fn create_environment_from_hdr(
        &mut self,
        image: &ImageData,
        rendered_mip_level: f32,
        render_system: &mut RenderSystem,
    ) -> Entity {
        let entity = self.create_empty();

        let configuration = TextureConfiguration {
            min_filter: TextureParameter::FilterLinear,
            mag_filter: TextureParameter::FilterLinear,
            wrap_s: TextureParameter::WrapClampToEdge,
            wrap_t: TextureParameter::WrapClampToEdge,
            is_standard_color_space: false,
            mip_levels: 1,
            is_cubemap: false,
        };
        let (pixel_format, component_type) = pixel_layout(image);
        let mut texture = Texture::create(render_system.context(), configuration);
        texture.set_data(
            render_system.context(),
            Format::Rgba32F,
            image.width,
            image.height,
            pixel_format,
            component_type,
            Some(&image.pixels),
        );
        let texture = Arc::new(texture);

        self.environments.insert_component_for(
            entity,
            EnvironmentComponent {
                rotation_scale_matrix: Mat3::identity(),
                hdr_texture: Some(Arc::clone(&texture)),
            },
        );
        render_system.set_environment_texture(texture, rendered_mip_level);

        log::info!("Created environment {entity} from {}x{} HDR image", image.width, image.height);
        entity
    }

    /// Make `child` a child of `parent`
    ///
    /// An existing parent link of `child` is detached first. Both entities get a default
    /// transform if they have none.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is `child` or one of its descendants.
    pub fn attach(&mut self, child: Entity, parent: Entity) {
        assert!(
            !self.is_ancestor_or_self(child, parent),
            "cannot attach {child} beneath its own descendant {parent}"
        );

        if self.nodes.contains(child) {
            self.detach(child);
        }
        self.nodes.create_component_for(child).parent_entity = parent;

        if self.nodes.len() > 1 {
            self.restore_node_order();
        }

        if !self.transformations.contains(parent) {
            self.transformations.create_component_for(parent);
        }
        if !self.transformations.contains(child) {
            self.transformations.create_component_for(child);
        }
    }

    /// Walk up from `entity` looking for `ancestor`
    fn is_ancestor_or_self(&self, ancestor: Entity, mut entity: Entity) -> bool {
        for _ in 0..=self.nodes.len() {
            if entity == ancestor {
                return true;
            }
            match self.nodes.get_component_for_entity(entity) {
                Some(node) => entity = node.parent_entity,
                None => return false,
            }
        }
        false
    }

    /// Move parents in front of their children
    ///
    /// Whenever the node at the cursor has its parent later in storage, the parent is
    /// moved into the cursor slot and the slot is examined again, now for the parent.
    /// Slots before the cursor are never disturbed, so the pass ends after at most
    /// one revisit per ancestor.
    fn restore_node_order(&mut self) {
        let mut revisits = 0;
        self.nodes.for_each(
            |nodes, index| {
                let parent = nodes.component_at(index).parent_entity;
                match nodes.index_of(parent) {
                    Some(parent_index) if parent_index > index => {
                        revisits += 1;
                        assert!(revisits <= nodes.len(), "node hierarchy contains a cycle through {parent}");
                        nodes.move_component(parent_index, index);
                        Traversal::Revisit
                    }
                    _ => {
                        revisits = 0;
                        Traversal::Continue
                    }
                }
            },
            true,
        );
    }

    /// Remove the parent link of `child`, keeping it where it currently is in the world
    ///
    /// The world matrix computed by the last update becomes the local transform.
    pub fn detach(&mut self, child: Entity) {
        if !self.nodes.contains(child) {
            log::debug!("{child} has no parent");
            return;
        }

        if let Some(transform) = self.transformations.get_component_for_entity_mut(child) {
            let world = transform.world_transformation_matrix;
            transform.set_from_matrix(&world);
        }

        self.nodes.sort_remove_component_from(child);
    }

    /// Parent of `entity`, if it has one
    pub fn parent_of(&self, entity: Entity) -> Option<Entity> {
        self.nodes.get_component_for_entity(entity).map(|node| node.parent_entity)
    }

    /// Run the frame passes: local matrices, hierarchy, cameras
    pub fn update(&mut self, _dt: f32) {
        systems::transformation_update(&mut self.transformations);
        systems::scene_graph_update(&mut self.nodes, &mut self.transformations);
        systems::camera_update(&mut self.cameras, &self.transformations);
    }

    /// Submit the active camera and every mesh to the render system
    pub fn render(&self, render_system: &mut RenderSystem) {
        if let Some((camera, transform)) = self.active_camera_data() {
            render_system.set_view_projection_matrix(&camera.view_projection);
            render_system.set_camera_position(&transform.world_position());
        }
        systems::render_meshes(render_system, &self.meshes, &self.transformations);
    }

    fn active_camera_data(&self) -> Option<(&CameraComponent, &TransformComponent)> {
        let camera = self.cameras.get_component_for_entity(self.active_camera)?;
        let transform = self.transformations.get_component_for_entity(self.active_camera)?;
        Some((camera, transform))
    }

    /// Entity of the active camera
    pub fn active_camera(&self) -> Option<Entity> {
        self.active_camera.is_valid().then_some(self.active_camera)
    }

    /// Render through the camera of `entity`
    ///
    /// # Panics
    ///
    /// Panics if `entity` has no camera component.
    pub fn set_active_camera(&mut self, entity: Entity) {
        assert!(self.cameras.contains(entity), "{entity} has no camera component");
        self.active_camera = entity;
    }

    /// Extent accumulated by the last model load
    ///
    /// Not maintained afterwards: moving or removing entities leaves it stale.
    pub fn scene_boundaries(&self) -> &SceneBoundaries {
        &self.scene_boundaries
    }

    /// Transform storage
    pub fn transformations(&self) -> &ComponentStorage<TransformComponent> {
        &self.transformations
    }

    /// Mutable transform storage
    pub fn transformations_mut(&mut self) -> &mut ComponentStorage<TransformComponent> {
        &mut self.transformations
    }

    /// Node storage, in topological order
    pub fn nodes(&self) -> &ComponentStorage<NodeComponent> {
        &self.nodes
    }

    /// Mesh storage
    pub fn meshes(&self) -> &ComponentStorage<MeshComponent> {
        &self.meshes
    }

    /// Mutable mesh storage
    pub fn meshes_mut(&mut self) -> &mut ComponentStorage<MeshComponent> {
        &mut self.meshes
    }

    /// Camera storage
    pub fn cameras(&self) -> &ComponentStorage<CameraComponent> {
        &self.cameras
    }

    /// Mutable camera storage
    pub fn cameras_mut(&mut self) -> &mut ComponentStorage<CameraComponent> {
        &mut self.cameras
    }

    /// Environment storage
    pub fn environments(&self) -> &ComponentStorage<EnvironmentComponent> {
        &self.environments
    }
}
