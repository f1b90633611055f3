use crate::bodies::{RigidBody, State};
use crate::math::{Vector3, Matrix3, Quaternion};

/// One scalar velocity constraint along an axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintRow {
    /// Constraint direction in world space
    pub axis: Vector3,

    /// Inverse effective mass along `axis`, zero when the row is inert
    pub jac_diag_inv: f32,

    /// Target impulse before accounting for the current velocity delta
    pub rhs: f32,

    /// Lower bound on the accumulated impulse
    pub lower_limit: f32,

    /// Upper bound on the accumulated impulse
    pub upper_limit: f32,

    /// Impulse applied so far; carried over between steps for contacts
    pub accum_impulse: f32,
}

impl Default for ConstraintRow {
    fn default() -> Self {
        Self {
            axis: Vector3::unit_x(),
            jac_diag_inv: 0.0,
            rhs: 0.0,
            lower_limit: -f32::MAX,
            upper_limit: f32::MAX,
            accum_impulse: 0.0,
        }
    }
}

impl ConstraintRow {
    /// Fills in axis, inverse effective mass and limits. `velocity_error` is
    /// scaled by the inverse effective mass to become the row's rhs.
    pub(crate) fn prepare(
        &mut self,
        axis: Vector3,
        k: &Matrix3,
        velocity_error: f32,
        lower_limit: f32,
        upper_limit: f32,
    ) {
        let denom = (*k * axis).dot(&axis);
        self.jac_diag_inv = if denom > crate::math::EPSILON { 1.0 / denom } else { 0.0 };
        self.rhs = velocity_error * self.jac_diag_inv;
        self.axis = axis;
        self.lower_limit = lower_limit;
        self.upper_limit = upper_limit;
    }

    /// Applies `impulse` along the axis: `+` to A and `-` to B
    #[inline]
    pub(crate) fn apply_impulse(&self, impulse: f32, a: &mut SolverBody, b: &mut SolverBody, ra: Vector3, rb: Vector3) {
        let j = self.axis * impulse;
        a.delta_linear_velocity += j * a.inv_mass;
        a.delta_angular_velocity += a.inv_inertia * ra.cross(&j);
        b.delta_linear_velocity -= j * b.inv_mass;
        b.delta_angular_velocity -= b.inv_inertia * rb.cross(&j);
    }

    /// One projected Gauss-Seidel update
    pub(crate) fn solve(&mut self, a: &mut SolverBody, b: &mut SolverBody, ra: Vector3, rb: Vector3) {
        let dv = a.velocity_delta_at(ra) - b.velocity_delta_at(rb);
        let delta = self.rhs - self.jac_diag_inv * self.axis.dot(&dv);

        let old = self.accum_impulse;
        self.accum_impulse = (old + delta).clamp(self.lower_limit, self.upper_limit);
        self.apply_impulse(self.accum_impulse - old, a, b, ra, rb);
    }
}

/// Per-step solver view of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverBody {
    /// Orientation at the start of the solve
    pub orientation: Quaternion,

    /// Zero for static bodies
    pub inv_mass: f32,

    /// World-space inverse inertia, zero for static bodies
    pub inv_inertia: Matrix3,

    /// Accumulated linear velocity change
    pub delta_linear_velocity: Vector3,

    /// Accumulated angular velocity change
    pub delta_angular_velocity: Vector3,
}

impl SolverBody {
    /// Snapshots a body for the solver
    pub fn new(state: &State, body: &RigidBody) -> Self {
        let (inv_mass, inv_inertia) = if state.is_static() {
            (0.0, Matrix3::zero())
        } else {
            let rotation = state.orientation.to_rotation_matrix();
            (body.inv_mass(), body.world_inv_inertia(&rotation))
        };

        Self {
            orientation: state.orientation,
            inv_mass,
            inv_inertia,
            delta_linear_velocity: Vector3::zero(),
            delta_angular_velocity: Vector3::zero(),
        }
    }

    #[inline]
    fn velocity_delta_at(&self, r: Vector3) -> Vector3 {
        self.delta_linear_velocity + self.delta_angular_velocity.cross(&r)
    }
}

impl Default for SolverBody {
    fn default() -> Self {
        Self {
            orientation: Quaternion::identity(),
            inv_mass: 0.0,
            inv_inertia: Matrix3::zero(),
            delta_linear_velocity: Vector3::zero(),
            delta_angular_velocity: Vector3::zero(),
        }
    }
}

/// `K = (mA⁻¹ + mB⁻¹)·I − [rA]×·IA⁻¹·[rA]× − [rB]×·IB⁻¹·[rB]×`
pub(crate) fn effective_mass_matrix(a: &SolverBody, b: &SolverBody, ra: Vector3, rb: Vector3) -> Matrix3 {
    let cra = Matrix3::cross_matrix(ra);
    let crb = Matrix3::cross_matrix(rb);
    Matrix3::identity() * (a.inv_mass + b.inv_mass) - cra * a.inv_inertia * cra - crb * b.inv_inertia * crb
}

/// Mutable access to two distinct solver bodies
pub(crate) fn body_pair_mut(bodies: &mut [SolverBody], a: usize, b: usize) -> (&mut SolverBody, &mut SolverBody) {
    debug_assert_ne!(a, b);
    if a < b {
        let (lo, hi) = bodies.split_at_mut(b);
        (&mut lo[a], &mut hi[0])
    } else {
        let (lo, hi) = bodies.split_at_mut(a);
        (&mut hi[0], &mut lo[b])
    }
}
