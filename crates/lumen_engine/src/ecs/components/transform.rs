//! Transform component for the ECS system
//!
//! Position, rotation and scale relative to the parent, plus the local and world
//! matrices derived from them during the scene update. The derived matrices are
//! caches: the scene overwrites them every frame.
//!
//! A matrix handed to [`TransformComponent::set_from_matrix`] may carry shear that
//! position, rotation and scale cannot express. It stays the local matrix until one of
//! those three fields changes.

use crate::ecs::Component;
use crate::foundation::math::{self, Mat4, Quat, Vec3, Vec4};

/// ECS Transform component
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    /// Position relative to the parent
    pub position: Vec3,

    /// Rotation relative to the parent
    pub rotation: Quat,

    /// Scale factors relative to the parent
    pub scale: Vec3,

    /// Matrix built from position, rotation and scale
    pub local_transformation_matrix: Mat4,

    /// Local matrix composed with every ancestor's matrix
    pub world_transformation_matrix: Mat4,

    baked: Option<BakedMatrix>,
}

/// Matrix set directly, with the decomposition it was stored under
#[derive(Debug, Clone, Copy, PartialEq)]
struct BakedMatrix {
    matrix: Mat4,
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
}

impl Component for TransformComponent {}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            local_transformation_matrix: Mat4::identity(),
            world_transformation_matrix: Mat4::identity(),
            baked: None,
        }
    }
}

impl TransformComponent {
    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Set the rotation from an angle in radians around an axis
    pub fn set_rotation_angle_axis(&mut self, angle: f32, axis: Vec3) {
        self.rotation = math::quat_from_angle_axis(angle, &axis);
    }

    /// Rotation as `(angle, axis.x, axis.y, axis.z)`
    pub fn rotation_angle_axis(&self) -> Vec4 {
        math::quat_to_angle_axis(&self.rotation)
    }

    /// Recompute the local matrix and seed the world matrix with it
    ///
    /// A matrix from [`set_from_matrix`](Self::set_from_matrix) is kept as long as
    /// position, rotation and scale still hold its decomposition.
    pub fn recompute_local(&mut self) {
        self.baked = self
            .baked
            .filter(|b| b.position == self.position && b.rotation == self.rotation && b.scale == self.scale);
        self.local_transformation_matrix = match &self.baked {
            Some(baked) => baked.matrix,
            None => math::trs_matrix(&self.position, &self.rotation, &self.scale),
        };
        self.world_transformation_matrix = self.local_transformation_matrix;
    }

    /// Make `matrix` the local matrix
    ///
    /// Position, rotation and scale are overwritten with its decomposition and both
    /// cached matrices are set to `matrix`. Later updates keep `matrix` exactly, shear
    /// included, until one of the three fields is written.
    pub fn set_from_matrix(&mut self, matrix: &Mat4) {
        let (position, rotation, scale) = math::decompose_trs(matrix);
        self.position = position;
        self.rotation = rotation;
        self.scale = scale;
        self.baked = Some(BakedMatrix {
            matrix: *matrix,
            position,
            rotation,
            scale,
        });
        self.local_transformation_matrix = *matrix;
        self.world_transformation_matrix = *matrix;
    }

    /// Whether the local matrix comes from [`set_from_matrix`](Self::set_from_matrix)
    pub fn has_baked_matrix(&self) -> bool {
        self.baked.is_some()
    }

    /// World space position taken from the world matrix
    pub fn world_position(&self) -> Vec3 {
        math::translation_of(&self.world_transformation_matrix)
    }
}
