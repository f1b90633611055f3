//! Closest-point queries used by the SAT contact search.

use crate::math::{Vector3, EPSILON};

/// Closest points between segments `a0-a1` and `b0-b1`, returned as `(on_a, on_b)`
pub fn closest_two_segments(a0: Vector3, a1: Vector3, b0: Vector3, b1: Vector3) -> (Vector3, Vector3) {
    let v1 = a1 - a0;
    let v2 = b1 - b0;
    let r = a0 - b0;

    let a = v1.dot(&v1);
    let b = v1.dot(&v2);
    let c = v2.dot(&v2);
    let d = v1.dot(&r);
    let e = v2.dot(&r);
    let det = -a * c + b * b;

    // Parallel segments keep s = 0 as the starting guess
    let mut s = if det * det > EPSILON { (c * d - b * e) / det } else { 0.0 };
    s = s.clamp(0.0, 1.0);

    let t = if c > EPSILON { ((e + s * b) / c).clamp(0.0, 1.0) } else { 0.0 };

    if a > EPSILON {
        s = ((-d + t * b) / a).clamp(0.0, 1.0);
    }

    (a0 + v1 * s, b0 + v2 * t)
}

/// Orthogonal projection of `point` onto the infinite line through `origin` along `direction`
#[inline]
pub fn closest_point_line(point: Vector3, origin: Vector3, direction: Vector3) -> Vector3 {
    let len_sqr = direction.length_squared();
    if len_sqr <= EPSILON * EPSILON {
        return origin;
    }
    let s = (point - origin).dot(&direction) / len_sqr;
    origin + direction * s
}

/// Closest point on triangle `p0 p1 p2` (counter-clockwise around `normal`) to `point`
pub fn closest_point_triangle(point: Vector3, p0: Vector3, p1: Vector3, p2: Vector3, normal: Vector3) -> Vector3 {
    // Project onto the triangle's plane
    let proj = point - normal * normal.dot(&(point - p0));

    let corners = [p0, p1, p2];
    let mut outside = [0.0f32; 3];
    let mut before_start = [0.0f32; 3];
    let mut past_end = [0.0f32; 3];

    for i in 0..3 {
        let start = corners[i];
        let end = corners[(i + 1) % 3];
        let edge = end - start;
        let edge_normal = edge.cross(&normal);

        outside[i] = (proj - start).dot(&edge_normal);
        before_start[i] = (proj - start).dot(&edge);
        past_end[i] = (proj - end).dot(&(-edge));

        // Edge region
        if outside[i] > 0.0 && before_start[i] > 0.0 && past_end[i] > 0.0 {
            return closest_point_line(proj, start, edge);
        }
    }

    // Face region
    if outside.iter().all(|&v| v <= 0.0) {
        return proj;
    }

    // Vertex regions: corner i sits between edge i and edge i-1
    for i in 0..3 {
        let prev = (i + 2) % 3;
        if before_start[i] <= 0.0 && past_end[prev] <= 0.0 {
            return corners[i];
        }
    }

    proj
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_crossing_segments() {
        let (pa, pb) = closest_two_segments(
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, -1.0, 1.0),
            Vector3::new(0.0, 1.0, 1.0),
        );
        assert_relative_eq!(pa, Vector3::zero(), epsilon = 1e-6);
        assert_relative_eq!(pb, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_parallel_segments() {
        let (pa, pb) = closest_two_segments(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(2.0, 1.0, 0.0),
            Vector3::new(3.0, 1.0, 0.0),
        );
        assert_relative_eq!(pa, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(pb, Vector3::new(2.0, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_triangle_regions() {
        let p0 = Vector3::new(0.0, 0.0, 0.0);
        let p1 = Vector3::new(1.0, 0.0, 0.0);
        let p2 = Vector3::new(0.0, 1.0, 0.0);
        let n = Vector3::unit_z();

        // Face
        let inside = closest_point_triangle(Vector3::new(0.25, 0.25, 3.0), p0, p1, p2, n);
        assert_relative_eq!(inside, Vector3::new(0.25, 0.25, 0.0), epsilon = 1e-6);

        // Edge p0-p1
        let below = closest_point_triangle(Vector3::new(0.5, -1.0, 1.0), p0, p1, p2, n);
        assert_relative_eq!(below, Vector3::new(0.5, 0.0, 0.0), epsilon = 1e-6);

        // Hypotenuse
        let diagonal = closest_point_triangle(Vector3::new(1.0, 1.0, 0.0), p0, p1, p2, n);
        assert_relative_eq!(diagonal, Vector3::new(0.5, 0.5, 0.0), epsilon = 1e-6);

        // Vertex p0
        let corner = closest_point_triangle(Vector3::new(-1.0, -1.0, 0.0), p0, p1, p2, n);
        assert_relative_eq!(corner, p0, epsilon = 1e-6);

        // Vertex p1
        let right = closest_point_triangle(Vector3::new(2.0, -0.5, 0.0), p0, p1, p2, n);
        assert_relative_eq!(right, p1, epsilon = 1e-6);
    }
}
