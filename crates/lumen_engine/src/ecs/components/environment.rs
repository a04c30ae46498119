//! Image based lighting environment component

use std::sync::Arc;

use crate::ecs::Component;
use crate::foundation::math::Mat3;
use crate::graphics::Texture;

/// Environment used for image based lighting
#[derive(Debug, Clone)]
pub struct EnvironmentComponent {
    /// Rotation and scale applied when sampling the environment
    pub rotation_scale_matrix: Mat3,
    /// Equirectangular HDR source texture
    pub hdr_texture: Option<Arc<Texture>>,
}

impl Component for EnvironmentComponent {}

impl Default for EnvironmentComponent {
    fn default() -> Self {
        Self {
            rotation_scale_matrix: Mat3::identity(),
            hdr_texture: None,
        }
    }
}
