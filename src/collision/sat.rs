use crate::collision::closest::{closest_point_triangle, closest_two_segments};
use crate::math::{Vector3, Matrix3, Transform, EPSILON};
use crate::shapes::{ConvexMesh, EdgeType};

/// Normal alignment needed to treat a facet as the reference face
const FACET_ALIGNMENT: f32 = 0.99;

/// Separation applied to A during the contact search, as a multiple of the depth
const SEPARATION_SCALE: f32 = 1.1;

/// Result of an overlapping SAT query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatContact {
    /// World-space normal pointing from B towards A
    pub normal: Vector3,

    /// Negative penetration depth
    pub depth: f32,

    /// Contact point in mesh A's local frame
    pub point_a: Vector3,

    /// Contact point in mesh B's local frame
    pub point_b: Vector3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisSource {
    PointBFacetA,
    PointAFacetB,
    EdgeEdge,
}

#[derive(Debug, Clone, Copy)]
struct BestAxis {
    depth: f32,
    axis: Vector3,
    source: AxisSource,
    flipped: bool,
}

impl BestAxis {
    // Returns false when the intervals are disjoint
    fn check(&mut self, axis: Vector3, a: (f32, f32), b: (f32, f32), source: AxisSource) -> bool {
        let d1 = a.0 - b.1;
        let d2 = b.0 - a.1;
        if d1 >= 0.0 || d2 >= 0.0 {
            return false;
        }
        if self.depth < d1 {
            *self = BestAxis { depth: d1, axis, source, flipped: false };
        }
        if self.depth < d2 {
            *self = BestAxis { depth: d2, axis: -axis, source, flipped: true };
        }
        true
    }
}

/// Exact contact between two convex meshes.
///
/// Returns `None` as soon as a separating axis is found. Otherwise returns
/// the axis of least penetration and the closest pair of features along it.
/// The query runs in the local frame of whichever mesh has more facets.
pub fn convex_convex_contact(
    mesh_a: &ConvexMesh,
    transform_a: &Transform,
    mesh_b: &ConvexMesh,
    transform_b: &Transform,
) -> Option<SatContact> {
    if mesh_a.facets().len() >= mesh_b.facets().len() {
        contact_local(mesh_a, transform_a, mesh_b, transform_b)
    } else {
        contact_local(mesh_b, transform_b, mesh_a, transform_a).map(|c| SatContact {
            normal: -c.normal,
            depth: c.depth,
            point_a: c.point_b,
            point_b: c.point_a,
        })
    }
}

fn contact_local(
    mesh_a: &ConvexMesh,
    transform_a: &Transform,
    mesh_b: &ConvexMesh,
    transform_b: &Transform,
) -> Option<SatContact> {
    // B expressed in A's frame, and back
    let transform_ab = transform_a.ortho_inverse() * *transform_b;
    let matrix_ab = transform_ab.rotation;
    let offset_ab = transform_ab.translation;
    let transform_ba = transform_ab.ortho_inverse();
    let matrix_ba = transform_ba.rotation;
    let offset_ba = transform_ba.translation;

    let project_b = |axis: Vector3| {
        let (lo, hi) = mesh_b.projection(matrix_ba * axis);
        let offset = offset_ab.dot(&axis);
        (lo + offset, hi + offset)
    };

    let mut best = BestAxis {
        depth: -f32::MAX,
        axis: Vector3::zero(),
        source: AxisSource::EdgeEdge,
        flipped: false,
    };

    for facet in mesh_a.facets() {
        let axis = facet.normal;
        if !best.check(axis, mesh_a.projection(axis), project_b(axis), AxisSource::PointBFacetA) {
            return None;
        }
    }

    for facet in mesh_b.facets() {
        let axis = matrix_ab * facet.normal;
        let (lo, hi) = mesh_b.projection(facet.normal);
        let offset = offset_ab.dot(&axis);
        if !best.check(axis, mesh_a.projection(axis), (lo + offset, hi + offset), AxisSource::PointAFacetB) {
            return None;
        }
    }

    let vertices_a = mesh_a.vertices();
    let vertices_b = mesh_b.vertices();
    for edge_a in mesh_a.edges().iter().filter(|e| e.edge_type == EdgeType::Convex) {
        let dir_a = vertices_a[edge_a.vertex_ids[1] as usize] - vertices_a[edge_a.vertex_ids[0] as usize];

        for edge_b in mesh_b.edges().iter().filter(|e| e.edge_type == EdgeType::Convex) {
            let dir_b = matrix_ab
                * (vertices_b[edge_b.vertex_ids[1] as usize] - vertices_b[edge_b.vertex_ids[0] as usize]);

            let axis = dir_a.cross(&dir_b);
            if axis.length_squared() < EPSILON * EPSILON {
                continue;
            }
            let axis = axis.normalize();

            if !best.check(axis, mesh_a.projection(axis), project_b(axis), AxisSource::EdgeEdge) {
                return None;
            }
        }
    }

    let (closest_a, closest_b) = closest_features(mesh_a, mesh_b, &matrix_ab, offset_ab, &matrix_ba, &best)?;
    let separation = best.axis * (SEPARATION_SCALE * best.depth.abs());

    Some(SatContact {
        normal: transform_a.rotation * best.axis,
        depth: best.depth,
        point_a: closest_a - separation,
        point_b: offset_ba + matrix_ba * closest_b,
    })
}

// Pulls A out of overlap along the best axis and searches the facets facing
// each other for the closest pair of points. Both results are in A's frame
// with A still displaced.
fn closest_features(
    mesh_a: &ConvexMesh,
    mesh_b: &ConvexMesh,
    matrix_ab: &Matrix3,
    offset_ab: Vector3,
    matrix_ba: &Matrix3,
    best: &BestAxis,
) -> Option<(Vector3, Vector3)> {
    let separation = best.axis * (SEPARATION_SCALE * best.depth.abs());
    let axis_in_b = *matrix_ba * best.axis;
    let vertices_a = mesh_a.vertices();
    let vertices_b = mesh_b.vertices();

    let mut closest: Option<(f32, Vector3, Vector3)> = None;
    let mut consider = |pa: Vector3, pb: Vector3| {
        let d = pa.distance_squared(&pb);
        if closest.map_or(true, |(min, _, _)| d < min) {
            closest = Some((d, pa, pb));
        }
    };

    for facet_a in mesh_a.facets() {
        let check_a = facet_a.normal.dot(&(-best.axis));
        if best.source == AxisSource::PointBFacetA && check_a < FACET_ALIGNMENT && best.flipped {
            continue;
        }
        if check_a < 0.0 {
            continue;
        }

        let tri_a = facet_a.vertex_ids.map(|v| separation + vertices_a[v as usize]);

        for facet_b in mesh_b.facets() {
            let check_b = facet_b.normal.dot(&axis_in_b);
            if best.source == AxisSource::PointAFacetB && check_b < FACET_ALIGNMENT && !best.flipped {
                continue;
            }
            if check_b < 0.0 {
                continue;
            }

            let tri_b = facet_b.vertex_ids.map(|v| offset_ab + *matrix_ab * vertices_b[v as usize]);

            // Edge against edge
            for i in 0..3 {
                if mesh_a.edges()[facet_a.edge_ids[i] as usize].edge_type != EdgeType::Convex {
                    continue;
                }
                for j in 0..3 {
                    if mesh_b.edges()[facet_b.edge_ids[j] as usize].edge_type != EdgeType::Convex {
                        continue;
                    }
                    let (sa, sb) = closest_two_segments(tri_a[i], tri_a[(i + 1) % 3], tri_b[j], tri_b[(j + 1) % 3]);
                    consider(sa, sb);
                }
            }

            // Vertex of A against triangle of B
            let normal_b = *matrix_ab * facet_b.normal;
            for p in tri_a.iter() {
                let s = closest_point_triangle(*p, tri_b[0], tri_b[1], tri_b[2], normal_b);
                consider(*p, s);
            }

            // Vertex of B against triangle of A
            for p in tri_b.iter() {
                let s = closest_point_triangle(*p, tri_a[0], tri_a[1], tri_a[2], facet_a.normal);
                consider(s, *p);
            }
        }
    }

    closest.map(|(_, pa, pb)| (pa, pb))
}
