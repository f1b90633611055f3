use crate::math::{Vector3, Quaternion, Matrix3};
use std::ops::Mul;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Rigid 3x4 affine transform: a rotation matrix followed by a translation
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Transform {
    /// Upper 3x3 block
    pub rotation: Matrix3,

    /// Fourth column
    pub translation: Vector3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Creates a new transform from a rotation matrix and a translation
    #[inline]
    pub const fn new(rotation: Matrix3, translation: Vector3) -> Self {
        Self { rotation, translation }
    }

    /// Creates a new identity transform
    #[inline]
    pub const fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zero(),
        }
    }

    /// Creates a transform from a unit quaternion and a position
    #[inline]
    pub fn from_orientation_position(orientation: Quaternion, position: Vector3) -> Self {
        Self {
            rotation: orientation.to_rotation_matrix(),
            translation: position,
        }
    }

    /// Creates a pure translation
    #[inline]
    pub fn from_position(position: Vector3) -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: position,
        }
    }

    /// Transforms a point (rotation then translation)
    #[inline]
    pub fn transform_point(&self, point: Vector3) -> Vector3 {
        self.rotation * point + self.translation
    }

    /// Composes two transforms so that `(a * b).transform_point(p) == a.transform_point(b.transform_point(p))`
    #[inline]
    pub fn multiply(&self, other: &Self) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
            translation: self.rotation * other.translation + self.translation,
        }
    }

    /// Inverse of a transform whose rotation block is orthonormal
    #[inline]
    pub fn ortho_inverse(&self) -> Self {
        let inv_rotation = self.rotation.transpose();
        Self {
            rotation: inv_rotation,
            translation: -(inv_rotation * self.translation),
        }
    }
}

impl Mul for Transform {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.multiply(&rhs)
    }
}
