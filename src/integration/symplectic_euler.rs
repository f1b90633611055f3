use crate::bodies::{RigidBody, State};
use crate::integration::Integrator;
use crate::math::{Quaternion, Vector3};

/// Default linear speed cap, in m/s
pub const DEFAULT_MAX_LINEAR_VELOCITY: f32 = 340.0;

/// Default angular speed cap, in rad/s
pub const DEFAULT_MAX_ANGULAR_VELOCITY: f32 = std::f32::consts::PI * 60.0;

/// Symplectic Euler integrator (semi-implicit Euler).
/// Velocities are updated first and positions use the new velocities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymplecticEulerIntegrator {
    max_linear_velocity: f32,
    max_angular_velocity: f32,
}

impl SymplecticEulerIntegrator {
    /// Creates a new Symplectic Euler integrator with the given speed caps
    pub fn new(max_linear_velocity: f32, max_angular_velocity: f32) -> Self {
        Self {
            max_linear_velocity,
            max_angular_velocity,
        }
    }
}

impl Default for SymplecticEulerIntegrator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINEAR_VELOCITY, DEFAULT_MAX_ANGULAR_VELOCITY)
    }
}

// Scales `v` down to `max` length, keeping its direction
#[inline]
fn clamp_length(v: Vector3, max: f32) -> Vector3 {
    let len_sqr = v.length_squared();
    if len_sqr > max * max {
        v * (max / len_sqr.sqrt())
    } else {
        v
    }
}

impl Integrator for SymplecticEulerIntegrator {
    fn apply_external_force(&self, state: &mut State, body: &RigidBody, force: Vector3, torque: Vector3, dt: f32) {
        if state.is_static() {
            return;
        }

        state.linear_velocity += force * (body.inv_mass() * dt);

        // Torque acts on angular momentum in world space
        let rotation = state.orientation.to_rotation_matrix();
        let mut angular_momentum = body.world_inertia(&rotation) * state.angular_velocity;
        angular_momentum += torque * dt;
        state.angular_velocity = body.world_inv_inertia(&rotation) * angular_momentum;

        state.linear_velocity = clamp_length(state.linear_velocity, self.max_linear_velocity);
        state.angular_velocity = clamp_length(state.angular_velocity, self.max_angular_velocity);
    }

    fn integrate(&self, states: &mut [State], dt: f32) {
        for state in states.iter_mut().filter(|s| !s.is_static()) {
            state.position += state.linear_velocity * dt;

            let spin = Quaternion::from_vector(state.angular_velocity) * state.orientation;
            state.orientation = (state.orientation + spin * (0.5 * dt)).normalize();
        }
    }

    fn name(&self) -> &str {
        "SymplecticEuler"
    }
}
