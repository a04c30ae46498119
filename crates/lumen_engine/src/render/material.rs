//! Material system for rendering

use std::sync::Arc;

use crate::foundation::math::{Vec3, Vec4};
use crate::graphics::Texture;

/// Physically based material
///
/// Every texture slot is optional; the matching factor is used when a slot is empty.
#[derive(Debug, Clone)]
pub struct Material {
    /// Base color factor (RGBA)
    pub base_color: Vec4,
    /// Base color texture, sRGB encoded
    pub base_color_texture: Option<Arc<Texture>>,

    /// Metallic factor (0.0 = dielectric, 1.0 = metallic)
    pub metallic: f32,
    /// Roughness factor (0.0 = mirror, 1.0 = completely rough)
    pub roughness: f32,
    /// Roughness in green, metallic in blue, optionally occlusion in red
    pub roughness_metallic_texture: Option<Arc<Texture>>,
    /// Whether the red channel of the roughness/metallic texture holds occlusion
    pub packed_occlusion: bool,
    /// Separate occlusion texture, only used when occlusion is not packed
    pub occlusion_texture: Option<Arc<Texture>>,

    /// Tangent space normal map
    pub normal_texture: Option<Arc<Texture>>,

    /// Emissive color factor
    pub emissive_color: Vec3,
    /// Emissive color texture
    pub emissive_color_texture: Option<Arc<Texture>>,
}

impl Material {
    /// Create a new material with default properties
    pub fn new() -> Self {
        Self {
            base_color: Vec4::new(0.9, 0.9, 0.9, 1.0),
            base_color_texture: None,
            metallic: 0.0,
            roughness: 1.0,
            roughness_metallic_texture: None,
            packed_occlusion: false,
            occlusion_texture: None,
            normal_texture: None,
            emissive_color: Vec3::zeros(),
            emissive_color_texture: None,
        }
    }

    /// Set the base color factor
    pub fn with_base_color(mut self, r: f32, g: f32, b: f32, a: f32) -> Self {
        self.base_color = Vec4::new(r, g, b, a);
        self
    }

    /// Set the metallic factor
    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic.clamp(0.0, 1.0);
        self
    }

    /// Set the roughness factor
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    /// Set the emissive color factor
    pub fn with_emissive(mut self, r: f32, g: f32, b: f32) -> Self {
        self.emissive_color = Vec3::new(r, g, b);
        self
    }

    /// Texture of every material slot, indexed by texture unit
    ///
    /// The occlusion slot is empty when occlusion is packed into the
    /// roughness/metallic texture.
    pub fn texture_slots(&self) -> [Option<&Arc<Texture>>; 5] {
        let occlusion = if self.packed_occlusion { None } else { self.occlusion_texture.as_ref() };
        [
            self.base_color_texture.as_ref(),
            self.roughness_metallic_texture.as_ref(),
            occlusion,
            self.normal_texture.as_ref(),
            self.emissive_color_texture.as_ref(),
        ]
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new()
    }
}
