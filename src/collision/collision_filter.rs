use bitflags::bitflags;
use crate::core::BodyHandle;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

bitflags! {
    /// A bit mask representing a collision group
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
    pub struct CollisionGroup: u32 {
        /// Default group
        const DEFAULT    = 0x00000001;

        /// Static world objects
        const STATIC     = 0x00000002;

        /// Dynamic objects
        const DYNAMIC    = 0x00000004;

        /// Character objects
        const CHARACTER  = 0x00000008;

        /// Debris objects
        const DEBRIS     = 0x00000010;

        /// All groups
        const ALL        = 0xFFFFFFFF;
    }
}

/// Type alias for a collision mask (what groups this object collides with)
pub type CollisionMask = CollisionGroup;

/// Per-body group/mask pair consulted by the broadphase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CollisionFilter {
    /// Groups this body belongs to
    pub group: CollisionGroup,

    /// Groups this body is allowed to touch
    pub mask: CollisionMask,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            group: CollisionGroup::DEFAULT,
            mask: CollisionMask::ALL,
        }
    }
}

impl CollisionFilter {
    /// Creates a new filter
    pub fn new(group: CollisionGroup, mask: CollisionMask) -> Self {
        Self { group, mask }
    }

    /// A collides with B if A's mask includes B's group and B's mask includes A's group
    #[inline]
    pub fn allows(&self, other: &Self) -> bool {
        self.mask.intersects(other.group) && other.mask.intersects(self.group)
    }
}

/// User callback that may veto a broadphase pair. Receives `(a, b)` with `a < b`.
pub type PairFilter = Box<dyn Fn(BodyHandle, BodyHandle) -> bool>;
