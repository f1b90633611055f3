mod broad_phase;
mod closest;
mod collision_filter;
mod contact;
mod narrow_phase;
mod pair;
mod sat;
mod sort;

pub use self::broad_phase::{BroadPhase, BroadPhaseInput, BroadPhaseStats, DEFAULT_AABB_MARGIN};
pub use self::closest::{closest_point_line, closest_point_triangle, closest_two_segments};
pub use self::collision_filter::{CollisionFilter, CollisionGroup, CollisionMask, PairFilter};
pub use self::contact::{Contact, ContactPoint, MAX_CONTACT_POINTS};
pub use self::narrow_phase::NarrowPhase;
pub use self::pair::{pair_key, Pair, PairType};
pub use self::sat::{convex_convex_contact, SatContact};
pub use self::sort::{merge_sort, SortKey};
