use crate::math::{Vector3, Matrix3};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Axis-aligned bounding box stored as a center and half extents
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Center of the box
    pub center: Vector3,

    /// Half size along each axis, never negative
    pub half: Vector3,
}

impl Aabb {
    /// Creates an AABB centered at a position with the given half extents
    #[inline]
    pub const fn new(center: Vector3, half: Vector3) -> Self {
        Self { center, half }
    }

    /// Creates an AABB from minimum and maximum corners
    #[inline]
    pub fn from_min_max(min: Vector3, max: Vector3) -> Self {
        Self {
            center: (min + max) * 0.5,
            half: (max - min) * 0.5,
        }
    }

    /// Creates the smallest AABB containing every point, or None for an empty slice
    pub fn from_points(points: &[Vector3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest.iter().fold((*first, *first), |(min, max), p| {
            (min.min_per_elem(p), max.max_per_elem(p))
        });
        Some(Self::from_min_max(min, max))
    }

    /// Returns the minimum corner
    #[inline]
    pub fn min(&self) -> Vector3 {
        self.center - self.half
    }

    /// Returns the maximum corner
    #[inline]
    pub fn max(&self) -> Vector3 {
        self.center + self.half
    }

    /// Bounds of this box after rotating by `rotation`, translating by `position`
    /// and growing every half extent by `margin` before rotation.
    #[inline]
    pub fn transformed(&self, rotation: &Matrix3, position: Vector3, margin: f32) -> Self {
        Self {
            center: position + *rotation * self.center,
            half: rotation.abs_per_elem() * (self.half + Vector3::splat(margin)),
        }
    }

    /// Checks if this AABB overlaps another. Touching boxes overlap.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        let d = (self.center - other.center).abs();
        let h = self.half + other.half;
        !(d.x > h.x || d.y > h.y || d.z > h.z)
    }

    /// Checks if this AABB contains a point
    #[inline]
    pub fn contains_point(&self, point: Vector3) -> bool {
        let d = (point - self.center).abs();
        d.x <= self.half.x && d.y <= self.half.y && d.z <= self.half.z
    }
}
