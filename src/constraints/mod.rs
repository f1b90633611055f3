mod ball_joint;
mod constraint;
mod solver;

pub use self::ball_joint::{BallJoint, DEFAULT_JOINT_BIAS};
pub use self::constraint::{ConstraintRow, SolverBody};
pub use self::solver::{ConstraintSolver, SequentialImpulseSolver};
