use crate::bodies::State;
use crate::constraints::constraint::{body_pair_mut, effective_mass_matrix, ConstraintRow, SolverBody};
use crate::core::BodyHandle;
use crate::math::{Vector3, Rotation, EPSILON};

/// Default Baumgarte factor for joints
pub const DEFAULT_JOINT_BIAS: f32 = 0.1;

/// A point-to-point joint pinning an anchor on A to an anchor on B
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallJoint {
    /// The first body in the joint
    body_a: BodyHandle,

    /// The second body in the joint
    body_b: BodyHandle,

    /// The anchor point on the first body (in local space)
    anchor_a: Vector3,

    /// The anchor point on the second body (in local space)
    anchor_b: Vector3,

    /// Position error correction factor
    bias: f32,

    /// Row along the current anchor separation
    constraint: ConstraintRow,
}

impl BallJoint {
    /// Creates a new ball joint
    pub fn new(body_a: BodyHandle, body_b: BodyHandle, anchor_a: Vector3, anchor_b: Vector3) -> Self {
        Self {
            body_a,
            body_b,
            anchor_a,
            anchor_b,
            bias: DEFAULT_JOINT_BIAS,
            constraint: ConstraintRow::default(),
        }
    }

    /// Sets the position error correction factor
    pub fn with_bias(mut self, bias: f32) -> Self {
        self.bias = bias;
        self
    }

    /// Returns the bodies joined
    #[inline]
    pub fn bodies(&self) -> (BodyHandle, BodyHandle) {
        (self.body_a, self.body_b)
    }

    /// Returns the local anchors
    #[inline]
    pub fn anchors(&self) -> (Vector3, Vector3) {
        (self.anchor_a, self.anchor_b)
    }

    /// Returns the bias
    #[inline]
    pub fn bias(&self) -> f32 {
        self.bias
    }

    /// Returns the constraint row from the last solve
    #[inline]
    pub fn constraint(&self) -> &ConstraintRow {
        &self.constraint
    }

    /// World-space distance between the two anchors
    pub fn separation(&self, state_a: &State, state_b: &State) -> f32 {
        let pa = state_a.position + state_a.orientation.rotate_vector(self.anchor_a);
        let pb = state_b.position + state_b.orientation.rotate_vector(self.anchor_b);
        pa.distance(&pb)
    }

    /// Builds the row for this step. The accumulated impulse is not warm started.
    pub(crate) fn setup(&mut self, states: &[State], bodies: &[SolverBody], dt: f32) {
        let (a, b) = (self.body_a.index(), self.body_b.index());
        let (state_a, state_b) = (&states[a], &states[b]);
        let (body_a, body_b) = (&bodies[a], &bodies[b]);

        let ra = body_a.orientation.rotate_vector(self.anchor_a);
        let rb = body_b.orientation.rotate_vector(self.anchor_b);

        self.constraint.accum_impulse = 0.0;

        let direction = (state_a.position + ra) - (state_b.position + rb);
        let distance_sqr = direction.length_squared();
        if distance_sqr < EPSILON * EPSILON {
            self.constraint = ConstraintRow::default();
            return;
        }

        let distance = distance_sqr.sqrt();
        let direction = direction / distance;

        let velocity_a = state_a.linear_velocity + state_a.angular_velocity.cross(&ra);
        let velocity_b = state_b.linear_velocity + state_b.angular_velocity.cross(&rb);
        let relative_velocity = velocity_a - velocity_b;

        let k = effective_mass_matrix(body_a, body_b, ra, rb);
        let error = -relative_velocity.dot(&direction) - self.bias * distance / dt;
        self.constraint.prepare(direction, &k, error, -f32::MAX, f32::MAX);
    }

    pub(crate) fn solve(&mut self, bodies: &mut [SolverBody]) {
        let (a, b) = body_pair_mut(bodies, self.body_a.index(), self.body_b.index());
        let ra = a.orientation.rotate_vector(self.anchor_a);
        let rb = b.orientation.rotate_vector(self.anchor_b);
        self.constraint.solve(a, b, ra, rb);
    }
}
