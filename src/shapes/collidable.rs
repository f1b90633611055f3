use crate::error::PhysicsError;
use crate::math::{Vector3, Aabb};
use crate::shapes::Shape;
use crate::Result;

/// Maximum number of shapes one body can carry
pub const MAX_SHAPES: usize = 5;

/// The collision geometry of one body: a few convex shapes and their bounds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collidable {
    shapes: Vec<Shape>,
    bounds: Option<Aabb>,
}

impl Collidable {
    /// Creates a new empty collidable
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a finished collidable holding a single shape
    pub fn from_shape(shape: Shape) -> Result<Self> {
        let mut collidable = Self::new();
        collidable.add_shape(shape)?;
        collidable.finish()?;
        Ok(collidable)
    }

    /// Adds a shape. Fails once the collidable is finished or full.
    pub fn add_shape(&mut self, shape: Shape) -> Result<()> {
        if self.bounds.is_some() {
            return Err(PhysicsError::InvalidParameter(
                "cannot add shapes to a finished collidable".to_string(),
            ));
        }
        if self.shapes.len() >= MAX_SHAPES {
            return Err(PhysicsError::CapacityExceeded {
                resource: "shapes per collidable",
                limit: MAX_SHAPES,
            });
        }
        self.shapes.push(shape);
        Ok(())
    }

    /// Computes the body-space bounds over every shape's offset vertices and
    /// seals the collidable
    pub fn finish(&mut self) -> Result<()> {
        let mut points = self.shapes.iter().flat_map(|shape| {
            let offset = shape.offset_transform();
            shape.mesh().vertices().iter().map(move |v| offset.transform_point(*v))
        });

        let first = points.next().ok_or_else(|| {
            PhysicsError::InvalidGeometry("collidable has no shapes".to_string())
        })?;
        let (min, max) = points.fold((first, first), |(min, max), p| {
            (min.min_per_elem(&p), max.max_per_elem(&p))
        });

        self.bounds = Some(Aabb::from_min_max(min, max));
        Ok(())
    }

    /// Returns true once `finish` has succeeded
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.bounds.is_some()
    }

    /// Returns the shapes
    #[inline]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Returns the number of shapes
    #[inline]
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Body-space bounds, or a zero box before `finish`
    #[inline]
    pub fn bounds(&self) -> Aabb {
        self.bounds.unwrap_or_default()
    }

    /// Body-space center of the bounds
    #[inline]
    pub fn center(&self) -> Vector3 {
        self.bounds().center
    }

    /// Body-space half extents of the bounds
    #[inline]
    pub fn half(&self) -> Vector3 {
        self.bounds().half
    }
}
