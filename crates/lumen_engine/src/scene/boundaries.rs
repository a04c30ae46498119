//! Axis aligned scene extent gathered while loading models

use crate::foundation::math::{self, Mat4, Point3, Vec3};

/// Running min/max corners of everything loaded into a scene
///
/// The value is accumulated once while a model is ingested and used to normalise
/// the model scale and frame the default camera. Later edits to the scene do not
/// update it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBoundaries {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Default for SceneBoundaries {
    fn default() -> Self {
        Self::empty()
    }
}

impl SceneBoundaries {
    /// Boundaries containing nothing: `min` at `+MAX`, `max` at `-MAX`
    pub fn empty() -> Self {
        Self {
            min: Vec3::repeat(f32::MAX),
            max: Vec3::repeat(-f32::MAX),
        }
    }

    /// Whether nothing was accumulated yet
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Midpoint of the two corners
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Largest maximum component minus smallest minimum component
    pub fn extent(&self) -> f32 {
        math::max_component(&self.max) - math::min_component(&self.min)
    }

    /// Grow to contain the bounding cube of a sphere
    pub fn include_sphere(&mut self, center: &Vec3, radius: f32) {
        let reach = Vec3::repeat(radius);
        self.max = self.max.sup(&(center + reach));
        self.min = self.min.inf(&(center - reach));
    }

    /// Grow to contain a local space box placed by `trafo`
    ///
    /// Both corners are transformed and the sphere through them is accumulated, so
    /// rotated boxes stay covered.
    pub fn include_transformed(&mut self, trafo: &Mat4, local_min: &Vec3, local_max: &Vec3) {
        let max = trafo.transform_point(&Point3::from(*local_max)).coords;
        let min = trafo.transform_point(&Point3::from(*local_min)).coords;

        let center = (max + min) * 0.5;
        let radius = (max - center).norm();
        self.include_sphere(&center, radius);
    }
}
