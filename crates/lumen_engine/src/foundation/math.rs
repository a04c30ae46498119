//! Math utilities and types
//!
//! Provides the nalgebra aliases used by components and the render system, plus the
//! OpenGL-convention projection helpers the deferred pipeline expects
//! (right-handed view space, clip depth in `[-1, 1]`).

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Unit quaternion type for rotations
pub type Quat = nalgebra::UnitQuaternion<f32>;

/// Build a local transformation matrix in translate * rotate * scale order
pub fn trs_matrix(position: &Vec3, rotation: &Quat, scale: &Vec3) -> Mat4 {
    Mat4::new_translation(position)
        * rotation.to_homogeneous()
        * Mat4::new_nonuniform_scaling(scale)
}

/// Build a rotation from an angle in radians around an (unnormalized) axis
///
/// A zero-length axis yields the identity rotation.
pub fn quat_from_angle_axis(angle: f32, axis: &Vec3) -> Quat {
    match Unit::try_new(*axis, f32::EPSILON) {
        Some(axis) => Quat::from_axis_angle(&axis, angle),
        None => Quat::identity(),
    }
}

/// Split a rotation into `(angle, x, y, z)` with a unit axis
///
/// The identity rotation reports angle 0 around +X.
pub fn quat_to_angle_axis(rotation: &Quat) -> Vec4 {
    match rotation.axis_angle() {
        Some((axis, angle)) => Vec4::new(angle, axis.x, axis.y, axis.z),
        None => Vec4::new(0.0, 1.0, 0.0, 0.0),
    }
}

/// Decompose an affine matrix into position, rotation and scale
///
/// Shear and projection parts are discarded.
pub fn decompose_trs(matrix: &Mat4) -> (Vec3, Quat, Vec3) {
    let position = Vec3::new(matrix.m14, matrix.m24, matrix.m34);

    let scale_x = Vec3::new(matrix.m11, matrix.m21, matrix.m31).magnitude();
    let scale_y = Vec3::new(matrix.m12, matrix.m22, matrix.m32).magnitude();
    let scale_z = Vec3::new(matrix.m13, matrix.m23, matrix.m33).magnitude();
    let scale = Vec3::new(scale_x, scale_y, scale_z);

    let safe = |s: f32| if s.abs() > f32::EPSILON { s } else { 1.0 };
    let rotation_matrix = Mat3::new(
        matrix.m11 / safe(scale_x), matrix.m12 / safe(scale_y), matrix.m13 / safe(scale_z),
        matrix.m21 / safe(scale_x), matrix.m22 / safe(scale_y), matrix.m23 / safe(scale_z),
        matrix.m31 / safe(scale_x), matrix.m32 / safe(scale_y), matrix.m33 / safe(scale_z),
    );
    let rotation = Quat::from_matrix(&rotation_matrix);

    (position, rotation, scale)
}

/// Translation part of an affine matrix
pub fn translation_of(matrix: &Mat4) -> Vec3 {
    Vec3::new(matrix.m14, matrix.m24, matrix.m34)
}

/// Right-handed perspective projection mapping depth to `[-1, 1]`
pub fn perspective_gl(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::new_perspective(aspect, fov_y, near, far)
}

/// Orthographic projection with the depth range `[-1, 1]`
pub fn orthographic_gl(left: f32, right: f32, bottom: f32, top: f32) -> Mat4 {
    Mat4::new_orthographic(left, right, bottom, top, -1.0, 1.0)
}

/// Right-handed look-at view matrix
pub fn look_at_gl(eye: &Vec3, target: &Vec3, up: &Vec3) -> Mat4 {
    Mat4::look_at_rh(&Point3::from(*eye), &Point3::from(*target), up)
}

/// Largest component of a vector
pub fn max_component(v: &Vec3) -> f32 {
    v.x.max(v.y).max(v.z)
}

/// Smallest component of a vector
pub fn min_component(v: &Vec3) -> f32 {
    v.x.min(v.y).min(v.z)
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_trs_matrix_applies_scale_then_rotation_then_translation() {
        let rotation = quat_from_angle_axis(constants::PI * 0.5, &Vec3::z());
        let matrix = trs_matrix(&Vec3::new(1.0, 0.0, 0.0), &rotation, &Vec3::new(2.0, 2.0, 2.0));

        let point = matrix.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(point, Point3::new(1.0, 2.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_angle_axis_round_trip_keeps_rotation() {
        let rotation = quat_from_angle_axis(0.75, &Vec3::new(0.0, 2.0, 0.0));
        let angle_axis = quat_to_angle_axis(&rotation);

        assert_relative_eq!(angle_axis.x, 0.75, epsilon = 1e-6);
        assert_relative_eq!(Vec3::new(angle_axis.y, angle_axis.z, angle_axis.w), Vec3::y(), epsilon = 1e-6);
    }

    #[test]
    fn test_zero_axis_is_identity() {
        let rotation = quat_from_angle_axis(1.0, &Vec3::zeros());
        assert_eq!(rotation, Quat::identity());
        assert_relative_eq!(quat_to_angle_axis(&rotation), Vec4::new(0.0, 1.0, 0.0, 0.0));
    }

    #[test]
    fn test_decompose_recovers_components() {
        let position = Vec3::new(3.0, -1.0, 2.0);
        let rotation = quat_from_angle_axis(0.4, &Vec3::new(1.0, 1.0, 0.0));
        let scale = Vec3::new(2.0, 0.5, 1.5);

        let (p, r, s) = decompose_trs(&trs_matrix(&position, &rotation, &scale));

        assert_relative_eq!(p, position, epsilon = 1e-5);
        assert_relative_eq!(s, scale, epsilon = 1e-5);
        assert!(r.angle_to(&rotation) < 1e-3);
    }

    #[test]
    fn test_component_extrema() {
        let v = Vec3::new(-2.0, 5.0, 1.0);
        assert_eq!(max_component(&v), 5.0);
        assert_eq!(min_component(&v), -2.0);
    }
}
