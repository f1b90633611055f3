mod vector;
mod matrix;
mod transform;
mod rotation;
mod aabb;

pub use vector::Vector3;
pub use matrix::Matrix3;
pub use transform::Transform;
pub use rotation::{Quaternion, Rotation};
pub use aabb::Aabb;

/// Tolerance used for degenerate geometry and normalization
pub const EPSILON: f32 = 1.0e-5;

/// Builds two unit tangents orthogonal to `normal` and to each other.
///
/// The reference axis is X unless the normal is (nearly) parallel to it, in
/// which case Y is used.
pub fn tangent_vectors(normal: Vector3) -> (Vector3, Vector3) {
    let reference = if Vector3::new(0.0, normal.y, normal.z).length_squared() < EPSILON {
        Vector3::unit_y()
    } else {
        Vector3::unit_x()
    };
    let tangent1 = normal.cross(&reference).normalize();
    let tangent2 = tangent1.cross(&normal).normalize();
    (tangent1, tangent2)
}
