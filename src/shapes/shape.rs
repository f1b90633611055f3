use crate::math::{Vector3, Quaternion, Transform};
use crate::shapes::ConvexMesh;
use std::sync::Arc;

/// A convex mesh placed in body space by a local offset
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    mesh: Arc<ConvexMesh>,
    offset_position: Vector3,
    offset_orientation: Quaternion,
}

impl Shape {
    /// Creates a shape with the given offset
    pub fn new(mesh: Arc<ConvexMesh>, offset_position: Vector3, offset_orientation: Quaternion) -> Self {
        Self {
            mesh,
            offset_position,
            offset_orientation: offset_orientation.normalize(),
        }
    }

    /// Creates a shape centered on the body origin
    pub fn from_mesh(mesh: Arc<ConvexMesh>) -> Self {
        Self::new(mesh, Vector3::zero(), Quaternion::identity())
    }

    /// Returns the mesh
    #[inline]
    pub fn mesh(&self) -> &ConvexMesh {
        &self.mesh
    }

    /// Returns the offset position in body space
    #[inline]
    pub fn offset_position(&self) -> Vector3 {
        self.offset_position
    }

    /// Returns the offset orientation in body space
    #[inline]
    pub fn offset_orientation(&self) -> Quaternion {
        self.offset_orientation
    }

    /// Shape-to-body transform
    #[inline]
    pub fn offset_transform(&self) -> Transform {
        Transform::from_orientation_position(self.offset_orientation, self.offset_position)
    }
}
