use crate::bodies::State;
use crate::collision::collision_filter::{CollisionFilter, PairFilter};
use crate::collision::pair::{pair_key, Pair, PairType};
use crate::collision::sort::{merge_sort, SortKey};
use crate::core::{BodyHandle, ScopedBuffer, StepAllocator};
use crate::math::Aabb;
use crate::shapes::Collidable;
use crate::Result;
use log::{trace, warn};

/// Default growth applied to every half extent before the overlap test
pub const DEFAULT_AABB_MARGIN: f32 = 0.01;

/// Bodies as seen by the broadphase, indexed by body slot
#[derive(Clone, Copy)]
pub struct BroadPhaseInput<'a> {
    /// Current states
    pub states: &'a [State],

    /// Collision geometry
    pub collidables: &'a [Collidable],

    /// Group/mask filters
    pub filters: &'a [CollisionFilter],

    /// Optional user veto
    pub pair_filter: Option<&'a PairFilter>,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    key: u64,
    body_a: BodyHandle,
    body_b: BodyHandle,
}

impl SortKey for Candidate {
    fn sort_key(&self) -> u64 {
        self.key
    }
}

/// Summary of one broadphase update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadPhaseStats {
    /// Pairs that appeared this step
    pub new_pairs: usize,

    /// Pairs carried over from the previous step
    pub kept_pairs: usize,

    /// Pairs from the previous step that no longer overlap
    pub removed_pairs: usize,

    /// Overlapping candidates dropped because the pair table was full
    pub dropped_pairs: usize,
}

/// Brute-force AABB broadphase with persistent, key-sorted pairs
#[derive(Debug, Clone)]
pub struct BroadPhase {
    margin: f32,
    max_pairs: usize,
}

impl BroadPhase {
    /// Creates a new broadphase
    pub fn new(margin: f32, max_pairs: usize) -> Self {
        Self { margin, max_pairs }
    }

    /// World-space bounds of a body, grown by the margin
    pub fn world_aabb(&self, state: &State, collidable: &Collidable) -> Aabb {
        let rotation = state.orientation.to_rotation_matrix();
        collidable.bounds().transformed(&rotation, state.position, self.margin)
    }

    /// Replaces `pairs` (sorted by key) with this step's overlapping pairs.
    ///
    /// Pairs present in both steps become `Keep` and have their contact
    /// refreshed; new ones start with an empty contact; vanished ones are
    /// dropped with their contact. On error `pairs` is left untouched.
    pub fn update(
        &self,
        input: BroadPhaseInput<'_>,
        pairs: &mut Vec<Pair>,
        allocator: &dyn StepAllocator,
    ) -> Result<BroadPhaseStats> {
        let count = input.states.len();

        let mut aabbs: ScopedBuffer<'_, Aabb> = ScopedBuffer::with_capacity(allocator, count)?;
        for (state, collidable) in input.states.iter().zip(input.collidables) {
            aabbs.push(self.world_aabb(state, collidable))?;
        }

        let capacity = (count * count.saturating_sub(1) / 2).min(self.max_pairs);
        let mut candidates: ScopedBuffer<'_, Candidate> = ScopedBuffer::with_capacity(allocator, capacity)?;
        let mut stats = BroadPhaseStats::default();

        for i in 0..count {
            for j in (i + 1)..count {
                if input.states[i].is_static() && input.states[j].is_static() {
                    continue;
                }
                if !input.filters[i].allows(&input.filters[j]) {
                    continue;
                }
                if !aabbs[i].intersects(&aabbs[j]) {
                    continue;
                }

                let (a, b) = (BodyHandle(i as u32), BodyHandle(j as u32));
                if let Some(filter) = input.pair_filter {
                    if !filter(a, b) {
                        continue;
                    }
                }

                if candidates.len() >= self.max_pairs {
                    stats.dropped_pairs += 1;
                    continue;
                }
                candidates.push(Candidate { key: pair_key(a, b), body_a: a, body_b: b })?;
            }
        }

        if stats.dropped_pairs > 0 {
            warn!(
                "pair capacity {} reached, {} overlapping pairs ignored this step",
                self.max_pairs, stats.dropped_pairs
            );
        }

        {
            let mut scratch: ScopedBuffer<'_, Candidate> = ScopedBuffer::with_capacity(allocator, candidates.len())?;
            for c in candidates.iter() {
                scratch.push(*c)?;
            }
            merge_sort(&mut candidates, &mut scratch);
        }

        // Nothing can fail past this point
        let old_pairs = std::mem::take(pairs);
        let old_count = old_pairs.len();
        let mut merged = Vec::with_capacity(candidates.len());
        let mut old_iter = old_pairs.into_iter().peekable();

        for candidate in candidates.iter() {
            // Old pairs with a smaller key vanished
            while old_iter.peek().map_or(false, |p| p.key() < candidate.key) {
                old_iter.next();
                stats.removed_pairs += 1;
            }

            match old_iter.next_if(|p| p.key() == candidate.key) {
                Some(mut pair) => {
                    let state_a = &input.states[pair.body_a().index()];
                    let state_b = &input.states[pair.body_b().index()];
                    pair.pair_type = PairType::Keep;
                    pair.contact.refresh(
                        state_a.position,
                        state_a.orientation,
                        state_b.position,
                        state_b.orientation,
                    );
                    stats.kept_pairs += 1;
                    merged.push(pair);
                }
                None => {
                    stats.new_pairs += 1;
                    merged.push(Pair::new(candidate.body_a, candidate.body_b));
                }
            }
        }
        stats.removed_pairs += old_iter.count();

        debug_assert!(merged.windows(2).all(|w| w[0].key() < w[1].key()));
        debug_assert_eq!(stats.kept_pairs + stats.removed_pairs, old_count);

        trace!(
            "broadphase: {} new, {} kept, {} removed",
            stats.new_pairs, stats.kept_pairs, stats.removed_pairs
        );

        *pairs = merged;
        Ok(stats)
    }
}
