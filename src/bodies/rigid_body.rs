use crate::bodies::{Material, MotionType, State};
use crate::collision::CollisionFilter;
use crate::error::PhysicsError;
use crate::math::{Vector3, Matrix3, Quaternion};
use crate::Result;

/// Registration parameters for a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBodyDesc {
    /// Mass of the body, must be positive
    pub mass: f32,

    /// Inertia tensor in body-local space, must be invertible
    pub inertia: Matrix3,

    /// Restitution and friction
    pub material: Material,

    /// Initial state
    pub state: State,

    /// Broadphase group/mask
    pub filter: CollisionFilter,
}

impl Default for RigidBodyDesc {
    fn default() -> Self {
        Self {
            mass: 1.0,
            inertia: Matrix3::identity(),
            material: Material::default(),
            state: State::default(),
            filter: CollisionFilter::default(),
        }
    }
}

impl RigidBodyDesc {
    /// Creates a description of an active body at the given position
    pub fn new_dynamic(position: Vector3) -> Self {
        Self {
            state: State::new(position, Quaternion::identity(), MotionType::Active),
            ..Self::default()
        }
    }

    /// Creates a description of a static body at the given position
    pub fn new_static(position: Vector3) -> Self {
        Self {
            state: State::new(position, Quaternion::identity(), MotionType::Static),
            ..Self::default()
        }
    }

    /// Sets the mass
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Sets the body-local inertia tensor
    pub fn with_inertia(mut self, inertia: Matrix3) -> Self {
        self.inertia = inertia;
        self
    }

    /// Sets the material
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Sets the initial orientation
    pub fn with_orientation(mut self, orientation: Quaternion) -> Self {
        self.state.orientation = orientation.normalize();
        self
    }

    /// Sets the initial linear velocity
    pub fn with_linear_velocity(mut self, velocity: Vector3) -> Self {
        self.state.linear_velocity = velocity;
        self
    }

    /// Sets the initial angular velocity
    pub fn with_angular_velocity(mut self, velocity: Vector3) -> Self {
        self.state.angular_velocity = velocity;
        self
    }

    /// Sets the collision filter
    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Immutable mass properties of a registered body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBody {
    mass: f32,
    inertia: Matrix3,
    inv_inertia: Matrix3,
    material: Material,
}

impl RigidBody {
    /// Validates the description and caches the inverse inertia
    pub fn new(mass: f32, inertia: Matrix3, material: Material) -> Result<Self> {
        if mass <= 0.0 || !mass.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "mass must be positive and finite, got {}",
                mass
            )));
        }

        let inv_inertia = inertia.inverse().ok_or_else(|| {
            PhysicsError::InvalidParameter("inertia tensor is singular".to_string())
        })?;

        Ok(Self {
            mass,
            inertia,
            inv_inertia,
            material,
        })
    }

    /// Returns the mass
    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Returns the inverse mass
    #[inline]
    pub fn inv_mass(&self) -> f32 {
        1.0 / self.mass
    }

    /// Returns the body-local inertia tensor
    #[inline]
    pub fn inertia(&self) -> Matrix3 {
        self.inertia
    }

    /// Returns the cached body-local inverse inertia tensor
    #[inline]
    pub fn inv_inertia(&self) -> Matrix3 {
        self.inv_inertia
    }

    /// Returns the material
    #[inline]
    pub fn material(&self) -> Material {
        self.material
    }

    /// Returns the restitution
    #[inline]
    pub fn restitution(&self) -> f32 {
        self.material.restitution
    }

    /// Returns the friction coefficient
    #[inline]
    pub fn friction(&self) -> f32 {
        self.material.friction
    }

    /// World-space inertia `R * I * R^T`
    pub fn world_inertia(&self, rotation: &Matrix3) -> Matrix3 {
        *rotation * self.inertia * rotation.transpose()
    }

    /// World-space inverse inertia `R * I^-1 * R^T`
    pub fn world_inv_inertia(&self, rotation: &Matrix3) -> Matrix3 {
        *rotation * self.inv_inertia * rotation.transpose()
    }
}
