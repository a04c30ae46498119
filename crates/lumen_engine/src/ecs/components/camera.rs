//! Camera component

use crate::ecs::Component;
use crate::foundation::math::{Mat4, Vec3};

/// Projection used by a camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraKind {
    /// Perspective projection driven by the vertical field of view
    #[default]
    Perspective,
    /// Orthographic projection sized by the near/far distance
    Orthographic,
}

/// Camera component
///
/// `view`, `projection` and `view_projection` are recomputed from the entity's
/// world transform and the look-at target on every scene update.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraComponent {
    /// Projection kind
    pub kind: CameraKind,
    /// Near plane distance
    pub z_near: f32,
    /// Far plane distance
    pub z_far: f32,
    /// Vertical field of view in radians
    pub vertical_field_of_view: f32,
    /// Width divided by height
    pub aspect: f32,
    /// Up vector, re-derived during update
    pub up: Vec3,
    /// World space point the camera looks at
    pub target: Vec3,
    /// World to view matrix
    pub view: Mat4,
    /// View to clip matrix
    pub projection: Mat4,
    /// `projection * view`
    pub view_projection: Mat4,
}

impl Component for CameraComponent {}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            kind: CameraKind::Perspective,
            z_near: 0.1,
            z_far: 10.0,
            vertical_field_of_view: 45.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            up: Vec3::y(),
            target: Vec3::zeros(),
            view: Mat4::identity(),
            projection: Mat4::identity(),
            view_projection: Mat4::identity(),
        }
    }
}
