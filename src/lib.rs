pub mod math;
pub mod core;
pub mod bodies;
pub mod shapes;
pub mod collision;
pub mod constraints;
pub mod integration;

/// Re-export common types for easier usage
pub use crate::core::{PhysicsWorld, SimulationConfig, BodyHandle, JointHandle};
pub use crate::bodies::{RigidBodyDesc, MotionType, State};
pub use crate::shapes::{ConvexMesh, Shape, Collidable};
pub use crate::math::Vector3;

/// Error types for the physics engine
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum PhysicsError {
        #[error("Capacity exceeded: {resource} is limited to {limit}")]
        CapacityExceeded {
            resource: &'static str,
            limit: usize,
        },

        #[error("Invalid geometry: {0}")]
        InvalidGeometry(String),

        #[error("Invalid parameter: {0}")]
        InvalidParameter(String),

        #[error("Resource not found: {0}")]
        ResourceNotFound(String),

        #[error("Step allocation failed: requested {requested} bytes, {available} available")]
        AllocationFailed {
            requested: usize,
            available: usize,
        },
    }
}

pub use crate::error::PhysicsError;

/// Result type for physics engine operations
pub type Result<T> = std::result::Result<T, error::PhysicsError>;

/// Engine version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
