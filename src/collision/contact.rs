use crate::constraints::ConstraintRow;
use crate::math::{Vector3, Quaternion, Rotation};

/// Maximum number of contact points to store in a manifold
pub const MAX_CONTACT_POINTS: usize = 4;

/// Squared distance under which two local points are the same contact
const SAME_POINT: f32 = 0.01;

/// Normal separation beyond which a cached point is discarded
const THRESHOLD_NORMAL: f32 = 0.01;

/// Squared tangential drift beyond which a cached point is discarded
const THRESHOLD_TANGENT: f32 = 0.002;

/// Minimum normal alignment for two points to match
const SAME_NORMAL: f32 = 0.99;

/// One point of contact between two bodies
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContactPoint {
    /// Signed separation along the normal; negative means overlap
    pub distance: f32,

    /// Contact point in body A's local frame
    pub point_a: Vector3,

    /// Contact point in body B's local frame
    pub point_b: Vector3,

    /// World-space normal pointing from B towards A
    pub normal: Vector3,

    /// Normal row followed by the two friction rows
    pub constraints: [ConstraintRow; 3],
}

impl ContactPoint {
    /// Creates a contact point with zero accumulated impulses
    pub fn new(distance: f32, normal: Vector3, point_a: Vector3, point_b: Vector3) -> Self {
        Self {
            distance,
            point_a,
            point_b,
            normal,
            constraints: [ConstraintRow::default(); 3],
        }
    }

    /// Clears accumulated impulses
    pub fn reset(&mut self) {
        for row in self.constraints.iter_mut() {
            row.accum_impulse = 0.0;
        }
    }

    // Copies geometry while keeping the accumulated impulses
    fn update_geometry(&mut self, other: &ContactPoint) {
        self.distance = other.distance;
        self.point_a = other.point_a;
        self.point_b = other.point_b;
        self.normal = other.normal;
    }
}

/// Persistent contact manifold between two bodies (at most four points)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contact {
    points: Vec<ContactPoint>,

    /// Combined friction coefficient, set by the solver
    pub friction: f32,
}

impl Contact {
    /// Creates a new empty contact
    pub fn new() -> Self {
        Self {
            points: Vec::with_capacity(MAX_CONTACT_POINTS),
            friction: 0.0,
        }
    }

    /// Returns the contact points
    #[inline]
    pub fn points(&self) -> &[ContactPoint] {
        &self.points
    }

    /// Returns the contact points mutably
    #[inline]
    pub fn points_mut(&mut self) -> &mut [ContactPoint] {
        &mut self.points
    }

    /// Returns the number of contact points
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns whether the manifold is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Removes every point
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Re-evaluates cached points against the current poses and drops those
    /// that separated or slid apart
    pub fn refresh(&mut self, pa: Vector3, qa: Quaternion, pb: Vector3, qb: Quaternion) {
        let mut i = 0;
        while i < self.points.len() {
            let cp = &mut self.points[i];
            let normal = cp.normal;
            let cpa = pa + qa.rotate_vector(cp.point_a);
            let cpb = pb + qb.rotate_vector(cp.point_b);

            let distance = normal.dot(&(cpa - cpb));
            if distance > THRESHOLD_NORMAL {
                self.points.swap_remove(i);
                continue;
            }
            cp.distance = distance;

            // Drift in the contact plane
            let projected = cpa - normal * distance;
            if projected.distance_squared(&cpb) > THRESHOLD_TANGENT {
                self.points.swap_remove(i);
                continue;
            }

            i += 1;
        }
    }

    /// Merges freshly generated points into the cache. Matching points keep
    /// their accumulated impulses.
    pub fn merge(&mut self, other: &Contact) {
        for cp in other.points.iter() {
            self.insert(cp);
        }
    }

    /// Inserts a single point, resetting impulses unless it matches a cached point
    pub fn add_contact(&mut self, depth: f32, normal: Vector3, point_a: Vector3, point_b: Vector3) {
        self.insert(&ContactPoint::new(depth, normal, point_a, point_b));
    }

    fn insert(&mut self, cp: &ContactPoint) {
        if let Some(id) = self.find_nearest(cp) {
            self.points[id].update_geometry(cp);
        } else if self.points.len() < MAX_CONTACT_POINTS {
            let mut fresh = *cp;
            fresh.reset();
            self.points.push(fresh);
        } else {
            let id = self.replacement_index(cp.point_a, cp.distance);
            let mut fresh = *cp;
            fresh.reset();
            self.points[id] = fresh;
        }
    }

    fn find_nearest(&self, cp: &ContactPoint) -> Option<usize> {
        let mut nearest = None;
        let mut min_diff = SAME_POINT;

        for (i, existing) in self.points.iter().enumerate() {
            let diff_a = existing.point_a.distance_squared(&cp.point_a);
            let diff_b = existing.point_b.distance_squared(&cp.point_b);
            if diff_a < min_diff && diff_b < min_diff && cp.normal.dot(&existing.normal) > SAME_NORMAL {
                min_diff = diff_a.max(diff_b);
                nearest = Some(i);
            }
        }

        nearest
    }

    // Slot whose replacement by `new_point` spans the largest area. The
    // deepest cached point is never chosen.
    fn replacement_index(&self, new_point: Vector3, new_distance: f32) -> usize {
        let mut deepest = None;
        let mut max_penetration = new_distance;
        for (i, cp) in self.points.iter().enumerate() {
            if cp.distance < max_penetration {
                deepest = Some(i);
                max_penetration = cp.distance;
            }
        }

        let p: [Vector3; MAX_CONTACT_POINTS] = [
            self.points[0].point_a,
            self.points[1].point_a,
            self.points[2].point_a,
            self.points[3].point_a,
        ];

        let mut best = 0;
        let mut best_area = -1.0;
        for skip in 0..MAX_CONTACT_POINTS {
            if deepest == Some(skip) {
                continue;
            }
            let mut rest = p.iter().enumerate().filter(|(i, _)| *i != skip).map(|(_, v)| *v);
            let (a, b, c) = match (rest.next(), rest.next(), rest.next()) {
                (Some(a), Some(b), Some(c)) => (a, b, c),
                _ => continue,
            };
            let area = area_4_points(new_point, a, b, c);
            if area > best_area {
                best = skip;
                best_area = area;
            }
        }

        best
    }
}

// Largest squared cross-product over the three ways of pairing up four points
fn area_4_points(p0: Vector3, p1: Vector3, p2: Vector3, p3: Vector3) -> f32 {
    let a = (p0 - p1).cross(&(p2 - p3)).length_squared();
    let b = (p0 - p2).cross(&(p1 - p3)).length_squared();
    let c = (p0 - p3).cross(&(p1 - p2)).length_squared();
    a.max(b).max(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn up() -> Vector3 {
        Vector3::unit_y()
    }

    #[test]
    fn test_add_contact_matches_nearby_point() {
        let mut contact = Contact::new();
        contact.add_contact(-0.01, up(), Vector3::new(0.5, 0.0, 0.5), Vector3::new(0.5, 1.0, 0.5));
        contact.points_mut()[0].constraints[0].accum_impulse = 2.0;

        // Within the same-point radius and with the same normal
        contact.add_contact(-0.02, up(), Vector3::new(0.52, 0.0, 0.5), Vector3::new(0.52, 1.0, 0.5));

        assert_eq!(contact.len(), 1);
        assert_eq!(contact.points()[0].distance, -0.02);
        assert_eq!(contact.points()[0].constraints[0].accum_impulse, 2.0);
    }

    #[test]
    fn test_fifth_point_keeps_deepest() {
        let mut contact = Contact::new();
        let corners = [
            (Vector3::new(-1.0, 0.0, -1.0), -0.05),
            (Vector3::new(1.0, 0.0, -1.0), -0.01),
            (Vector3::new(1.0, 0.0, 1.0), -0.01),
            (Vector3::new(-1.0, 0.0, 1.0), -0.01),
        ];
        for (p, d) in corners.iter() {
            contact.add_contact(*d, up(), *p, *p);
        }
        assert_eq!(contact.len(), 4);

        // A point near the deepest corner would shrink the area the most if
        // the deepest were replaced; it must be kept regardless.
        let extra = Vector3::new(-0.9, 0.0, -0.7);
        contact.add_contact(-0.02, up(), extra, extra);

        assert_eq!(contact.len(), MAX_CONTACT_POINTS);
        assert!(contact.points().iter().any(|cp| cp.distance == -0.05));
        assert!(contact.points().iter().any(|cp| cp.point_a == extra));
    }

    #[test]
    fn test_refresh_drops_separated_points() {
        let mut contact = Contact::new();
        contact.add_contact(-0.01, up(), Vector3::zero(), Vector3::zero());
        contact.add_contact(-0.01, up(), Vector3::new(1.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));

        // A moved up by 0.5: both points separate along the normal
        contact.refresh(
            Vector3::new(0.0, 0.5, 0.0),
            Quaternion::identity(),
            Vector3::zero(),
            Quaternion::identity(),
        );
        assert!(contact.is_empty());
    }

    #[test]
    fn test_refresh_drops_sliding_points() {
        let mut contact = Contact::new();
        contact.add_contact(-0.01, up(), Vector3::zero(), Vector3::zero());

        // A slid sideways by 0.1 (0.01 squared > 0.002)
        contact.refresh(
            Vector3::new(0.1, 0.0, 0.0),
            Quaternion::identity(),
            Vector3::zero(),
            Quaternion::identity(),
        );
        assert!(contact.is_empty());
    }

    #[test]
    fn test_refresh_updates_distance() {
        let mut contact = Contact::new();
        contact.add_contact(-0.01, up(), Vector3::zero(), Vector3::zero());

        contact.refresh(
            Vector3::new(0.0, -0.02, 0.0),
            Quaternion::identity(),
            Vector3::zero(),
            Quaternion::identity(),
        );
        assert_eq!(contact.len(), 1);
        assert!((contact.points()[0].distance + 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_merge_resets_impulses_on_new_points() {
        let mut cached = Contact::new();
        cached.add_contact(-0.01, up(), Vector3::zero(), Vector3::zero());
        cached.points_mut()[0].constraints[0].accum_impulse = 1.5;

        let mut fresh = Contact::new();
        fresh.add_contact(-0.01, up(), Vector3::zero(), Vector3::zero());
        fresh.add_contact(-0.01, up(), Vector3::new(1.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        fresh.points_mut()[1].constraints[0].accum_impulse = 9.0;

        cached.merge(&fresh);

        assert_eq!(cached.len(), 2);
        assert_eq!(cached.points()[0].constraints[0].accum_impulse, 1.5);
        assert_eq!(cached.points()[1].constraints[0].accum_impulse, 0.0);
    }
}
