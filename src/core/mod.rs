pub mod allocator;
pub mod config;
pub mod storage;
pub mod world;

pub use self::allocator::{BoundedAllocator, HeapAllocator, ScopedBuffer, StepAllocator};
pub use self::config::SimulationConfig;
pub use self::storage::{BodyStorage, JointStorage};
pub use self::world::PhysicsWorld;

/// A unique identifier for a body in the physics world.
///
/// Handles are slot indices handed out in registration order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub(crate) u32);

impl BodyHandle {
    /// Returns the slot index of the body
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A unique identifier for a joint in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointHandle(pub(crate) u32);

impl JointHandle {
    /// Returns the slot index of the joint
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
