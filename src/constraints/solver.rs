use crate::bodies::{RigidBody, State};
use crate::collision::{Pair, PairType};
use crate::constraints::ball_joint::BallJoint;
use crate::constraints::constraint::{body_pair_mut, effective_mass_matrix, SolverBody};
use crate::math::{tangent_vectors, Rotation};
use log::trace;

/// Trait for velocity-level constraint solvers
pub trait ConstraintSolver {
    /// Solves joints and contacts for one step and writes the resulting
    /// velocity changes back into `states`.
    ///
    /// `solver_bodies` is scratch space with one slot per body, reserved by
    /// the caller before the step starts mutating anything.
    fn solve(
        &self,
        states: &mut [State],
        bodies: &[RigidBody],
        pairs: &mut [Pair],
        joints: &mut [BallJoint],
        solver_bodies: &mut [SolverBody],
        dt: f32,
    );

    /// Returns the name of the solver
    fn name(&self) -> &str;
}

/// Warm-started sequential impulse (projected Gauss-Seidel) solver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequentialImpulseSolver {
    /// Number of Gauss-Seidel sweeps
    iterations: u32,

    /// Baumgarte factor for penetration recovery
    bias: f32,

    /// Penetration tolerated without correction
    slop: f32,
}

impl SequentialImpulseSolver {
    /// Creates a new sequential impulse solver
    pub fn new(iterations: u32, bias: f32, slop: f32) -> Self {
        Self { iterations, bias, slop }
    }

    /// Returns the number of iterations
    #[inline]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    fn setup_contacts(&self, states: &[State], bodies: &[RigidBody], solver_bodies: &[SolverBody], pairs: &mut [Pair], dt: f32) {
        for pair in pairs.iter_mut() {
            let (a, b) = (pair.body_a().index(), pair.body_b().index());
            let (state_a, state_b) = (&states[a], &states[b]);
            let (body_a, body_b) = (&solver_bodies[a], &solver_bodies[b]);

            // Restitution only applies on the first step of contact
            let restitution = match pair.pair_type {
                PairType::New => bodies[a].material().combined_restitution(&bodies[b].material()),
                PairType::Keep => 0.0,
            };
            pair.contact.friction = bodies[a].material().combined_friction(&bodies[b].material());

            for cp in pair.contact.points_mut() {
                let ra = body_a.orientation.rotate_vector(cp.point_a);
                let rb = body_b.orientation.rotate_vector(cp.point_b);
                let k = effective_mass_matrix(body_a, body_b, ra, rb);

                let velocity_a = state_a.linear_velocity + state_a.angular_velocity.cross(&ra);
                let velocity_b = state_b.linear_velocity + state_b.angular_velocity.cross(&rb);
                let relative_velocity = velocity_a - velocity_b;

                let normal = cp.normal;
                let (tangent1, tangent2) = tangent_vectors(normal);

                let normal_error = -(1.0 + restitution) * relative_velocity.dot(&normal)
                    - (self.bias * (cp.distance + self.slop).min(0.0)) / dt;
                cp.constraints[0].prepare(normal, &k, normal_error, 0.0, f32::MAX);

                // Friction limits depend on the normal impulse and are set per sweep
                cp.constraints[1].prepare(tangent1, &k, -relative_velocity.dot(&tangent1), 0.0, 0.0);
                cp.constraints[2].prepare(tangent2, &k, -relative_velocity.dot(&tangent2), 0.0, 0.0);
            }
        }
    }

    fn warm_start(pairs: &[Pair], solver_bodies: &mut [SolverBody]) {
        for pair in pairs {
            let (a, b) = body_pair_mut(solver_bodies, pair.body_a().index(), pair.body_b().index());
            for cp in pair.contact.points() {
                let ra = a.orientation.rotate_vector(cp.point_a);
                let rb = b.orientation.rotate_vector(cp.point_b);
                for row in cp.constraints.iter() {
                    row.apply_impulse(row.accum_impulse, a, b, ra, rb);
                }
            }
        }
    }

    fn solve_contacts(pairs: &mut [Pair], solver_bodies: &mut [SolverBody]) {
        for pair in pairs.iter_mut() {
            let (a, b) = body_pair_mut(solver_bodies, pair.body_a().index(), pair.body_b().index());
            let friction = pair.contact.friction;

            for cp in pair.contact.points_mut() {
                let ra = a.orientation.rotate_vector(cp.point_a);
                let rb = b.orientation.rotate_vector(cp.point_b);

                let [normal_row, tangent1_row, tangent2_row] = &mut cp.constraints;
                normal_row.solve(a, b, ra, rb);

                let max_friction = friction * normal_row.accum_impulse.abs();
                for row in [&mut *tangent1_row, &mut *tangent2_row] {
                    row.lower_limit = -max_friction;
                    row.upper_limit = max_friction;
                }

                tangent1_row.solve(a, b, ra, rb);
                tangent2_row.solve(a, b, ra, rb);
            }
        }
    }
}

impl Default for SequentialImpulseSolver {
    fn default() -> Self {
        Self::new(10, 0.1, 0.001)
    }
}

impl ConstraintSolver for SequentialImpulseSolver {
    fn solve(
        &self,
        states: &mut [State],
        bodies: &[RigidBody],
        pairs: &mut [Pair],
        joints: &mut [BallJoint],
        solver_bodies: &mut [SolverBody],
        dt: f32,
    ) {
        debug_assert_eq!(solver_bodies.len(), states.len());
        for ((solver_body, state), body) in solver_bodies.iter_mut().zip(states.iter()).zip(bodies) {
            *solver_body = SolverBody::new(state, body);
        }

        for joint in joints.iter_mut() {
            joint.setup(states, solver_bodies, dt);
        }
        self.setup_contacts(states, bodies, solver_bodies, pairs, dt);

        Self::warm_start(pairs, solver_bodies);

        for _ in 0..self.iterations {
            for joint in joints.iter_mut() {
                joint.solve(solver_bodies);
            }
            Self::solve_contacts(pairs, solver_bodies);
        }

        for (state, solver_body) in states.iter_mut().zip(solver_bodies.iter()) {
            state.linear_velocity += solver_body.delta_linear_velocity;
            state.angular_velocity += solver_body.delta_angular_velocity;
        }

        trace!(
            "solver: {} joints, {} pairs, {} iterations",
            joints.len(),
            pairs.len(),
            self.iterations
        );
    }

    fn name(&self) -> &str {
        "Sequential Impulse"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::{Material, MotionType};
    use crate::core::BodyHandle;
    use crate::math::{Matrix3, Quaternion, Vector3};

    fn body() -> RigidBody {
        RigidBody::new(1.0, Matrix3::identity(), Material::new(0.0, 0.5)).unwrap()
    }

    #[test]
    fn test_contact_stops_approach() {
        let mut states = vec![
            State::new(Vector3::new(0.0, 1.0, 0.0), Quaternion::identity(), MotionType::Active),
            State::new(Vector3::zero(), Quaternion::identity(), MotionType::Static),
        ];
        states[0].linear_velocity = Vector3::new(0.0, -2.0, 0.0);
        let bodies = vec![body(), body()];

        let mut pair = Pair::new(BodyHandle(0), BodyHandle(1));
        pair.contact.add_contact(
            -0.01,
            Vector3::unit_y(),
            Vector3::new(0.0, -0.5, 0.0),
            Vector3::new(0.0, 0.5, 0.0),
        );
        let mut pairs = vec![pair];

        let mut solver_bodies = vec![SolverBody::default(); states.len()];
        SequentialImpulseSolver::default().solve(&mut states, &bodies, &mut pairs, &mut [], &mut solver_bodies, 0.016);

        // Approach velocity removed, small push-out allowed
        assert!(states[0].linear_velocity.y >= 0.0);
        assert!(states[0].linear_velocity.y < 1.0);
        assert_eq!(states[1].linear_velocity, Vector3::zero());
        assert!(pairs[0].contact.points()[0].constraints[0].accum_impulse > 0.0);
    }

    #[test]
    fn test_friction_bounded_by_normal_impulse() {
        let mut states = vec![
            State::new(Vector3::new(0.0, 1.0, 0.0), Quaternion::identity(), MotionType::Active),
            State::new(Vector3::zero(), Quaternion::identity(), MotionType::Static),
        ];
        states[0].linear_velocity = Vector3::new(5.0, -1.0, 0.0);
        let bodies = vec![body(), body()];

        let mut pair = Pair::new(BodyHandle(0), BodyHandle(1));
        pair.contact.add_contact(
            -0.01,
            Vector3::unit_y(),
            Vector3::new(0.0, -0.5, 0.0),
            Vector3::new(0.0, 0.5, 0.0),
        );
        let mut pairs = vec![pair];

        let mut solver_bodies = vec![SolverBody::default(); states.len()];
        SequentialImpulseSolver::default().solve(&mut states, &bodies, &mut pairs, &mut [], &mut solver_bodies, 0.016);

        let cp = &pairs[0].contact.points()[0];
        let limit = pairs[0].contact.friction * cp.constraints[0].accum_impulse.abs();
        assert!(cp.constraints[1].accum_impulse.abs() <= limit + 1e-5);
        assert!(cp.constraints[2].accum_impulse.abs() <= limit + 1e-5);
        assert!(states[0].linear_velocity.x < 5.0);
    }
}
