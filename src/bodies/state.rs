use crate::math::{Vector3, Quaternion, Transform};

/// How a body participates in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionType {
    /// Fully simulated: affected by gravity, contacts and joints
    #[default]
    Active,

    /// Never moves; behaves as infinite mass in the solver
    Static,
}

/// Mutable kinematic state of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    /// World-space position of the body origin
    pub position: Vector3,

    /// Unit quaternion orientation
    pub orientation: Quaternion,

    /// Linear velocity in world space
    pub linear_velocity: Vector3,

    /// Angular velocity in world space
    pub angular_velocity: Vector3,

    /// Active or static
    pub motion_type: MotionType,
}

impl Default for State {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            orientation: Quaternion::identity(),
            linear_velocity: Vector3::zero(),
            angular_velocity: Vector3::zero(),
            motion_type: MotionType::Active,
        }
    }
}

impl State {
    /// Creates a resting state at the given pose
    pub fn new(position: Vector3, orientation: Quaternion, motion_type: MotionType) -> Self {
        Self {
            position,
            orientation,
            motion_type,
            ..Self::default()
        }
    }

    /// Returns true if the body is static
    #[inline]
    pub fn is_static(&self) -> bool {
        self.motion_type == MotionType::Static
    }

    /// Body-to-world transform
    #[inline]
    pub fn transform(&self) -> Transform {
        Transform::from_orientation_position(self.orientation, self.position)
    }
}
