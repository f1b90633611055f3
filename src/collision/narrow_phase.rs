use crate::bodies::State;
use crate::collision::contact::Contact;
use crate::collision::pair::Pair;
use crate::collision::sat::convex_convex_contact;
use crate::shapes::Collidable;
use log::trace;

/// SAT-based narrowphase over every shape pair of every broadphase pair
#[derive(Debug, Clone, Copy, Default)]
pub struct NarrowPhase;

impl NarrowPhase {
    /// Creates a new narrowphase
    pub fn new() -> Self {
        Self
    }

    /// Generates contacts for each pair and merges them into the pair's
    /// cached manifold. Returns the total number of cached contact points.
    pub fn detect_collisions(&self, states: &[State], collidables: &[Collidable], pairs: &mut [Pair]) -> usize {
        let mut total = 0;

        for pair in pairs.iter_mut() {
            let (a, b) = (pair.body_a().index(), pair.body_b().index());
            let transform_a = states[a].transform();
            let transform_b = states[b].transform();

            let mut fresh = Contact::new();

            for shape_a in collidables[a].shapes() {
                let offset_a = shape_a.offset_transform();
                let world_a = transform_a * offset_a;

                for shape_b in collidables[b].shapes() {
                    let offset_b = shape_b.offset_transform();
                    let world_b = transform_b * offset_b;

                    let hit = match convex_convex_contact(shape_a.mesh(), &world_a, shape_b.mesh(), &world_b) {
                        Some(hit) if hit.depth < 0.0 => hit,
                        _ => continue,
                    };

                    // Shape-local points into body-local points
                    fresh.add_contact(
                        hit.depth,
                        hit.normal,
                        offset_a.transform_point(hit.point_a),
                        offset_b.transform_point(hit.point_b),
                    );
                }
            }

            pair.contact.merge(&fresh);
            total += pair.contact.len();
        }

        trace!("narrowphase: {} pairs, {} contact points", pairs.len(), total);
        total
    }
}
