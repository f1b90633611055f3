use crate::error::PhysicsError;
use crate::math::Vector3;
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Configuration parameters for the physics simulation.
///
/// Fixed at world construction; see [`SimulationConfig::validate`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// The fixed time step for the simulation
    pub time_step: f32,

    /// The number of Gauss-Seidel sweeps per step
    pub solver_iterations: u32,

    /// The bias factor for contact penetration recovery (Baumgarte stabilization)
    pub contact_bias: f32,

    /// Penetration depth tolerated without correction
    pub contact_slop: f32,

    /// Gravitational acceleration applied to every active body
    pub gravity: Vector3,

    /// Growth added to body bounds before the broadphase overlap test
    pub aabb_margin: f32,

    /// Linear speed cap
    pub max_linear_velocity: f32,

    /// Angular speed cap
    pub max_angular_velocity: f32,

    /// Maximum number of registered bodies
    pub max_bodies: usize,

    /// Maximum number of registered joints
    pub max_joints: usize,

    /// Maximum number of broadphase pairs kept per step
    pub max_pairs: usize,

    /// The bias factor given to new ball joints
    pub joint_bias: f32,

    /// Whether meshes with concave edges are refused at registration
    pub reject_concave_meshes: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_step: 0.016,
            solver_iterations: 10,
            contact_bias: 0.1,
            contact_slop: 0.001,
            gravity: Vector3::new(0.0, -9.8, 0.0),
            aabb_margin: 0.01,
            max_linear_velocity: 340.0,
            max_angular_velocity: std::f32::consts::PI * 60.0,
            max_bodies: 500,
            max_joints: 100,
            max_pairs: 5000,
            joint_bias: 0.1,
            reject_concave_meshes: false,
        }
    }
}

impl SimulationConfig {
    /// Checks that every parameter is usable
    pub fn validate(&self) -> Result<()> {
        fn positive(name: &str, value: f32) -> Result<()> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(PhysicsError::InvalidParameter(format!("{} must be positive and finite, got {}", name, value)))
            }
        }

        fn non_negative(name: &str, value: f32) -> Result<()> {
            if value >= 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(PhysicsError::InvalidParameter(format!("{} must be non-negative and finite, got {}", name, value)))
            }
        }

        positive("time_step", self.time_step)?;
        positive("max_linear_velocity", self.max_linear_velocity)?;
        positive("max_angular_velocity", self.max_angular_velocity)?;
        non_negative("contact_bias", self.contact_bias)?;
        non_negative("contact_slop", self.contact_slop)?;
        non_negative("aabb_margin", self.aabb_margin)?;
        non_negative("joint_bias", self.joint_bias)?;

        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidParameter("gravity must be finite".to_string()));
        }

        // Handles are 32-bit slots
        if self.max_bodies > u32::MAX as usize {
            return Err(PhysicsError::InvalidParameter(format!(
                "max_bodies must fit in a 32-bit handle, got {}",
                self.max_bodies
            )));
        }
        if self.max_joints > u32::MAX as usize {
            return Err(PhysicsError::InvalidParameter(format!(
                "max_joints must fit in a 32-bit handle, got {}",
                self.max_joints
            )));
        }

        Ok(())
    }
}
