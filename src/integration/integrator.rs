use crate::bodies::{RigidBody, State};
use crate::math::Vector3;

/// Trait for numerical integration algorithms
pub trait Integrator {
    /// Applies a force and torque over a time step, updating velocities only
    fn apply_external_force(&self, state: &mut State, body: &RigidBody, force: Vector3, torque: Vector3, dt: f32);

    /// Advances positions and orientations of every active state
    fn integrate(&self, states: &mut [State], dt: f32);

    /// Returns the name of the integrator
    fn name(&self) -> &str;
}
