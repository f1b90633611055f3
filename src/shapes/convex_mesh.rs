use crate::error::PhysicsError;
use crate::math::{Vector3, Aabb, EPSILON};
use crate::Result;

/// Maximum number of vertices in a convex mesh
pub const MAX_VERTICES: usize = 34;

/// Maximum number of edges in a convex mesh
pub const MAX_EDGES: usize = 96;

/// Maximum number of triangular facets in a convex mesh
pub const MAX_FACETS: usize = 64;

/// Classification of an edge by the dihedral angle of its two facets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeType {
    /// Facets meet at a convex fold; the only edges used as SAT axes
    Convex,

    /// Facets meet at an inward fold. The mesh is not actually convex.
    Concave,

    /// Facets are coplanar
    Flat,
}

/// An edge shared by (up to) two facets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Dihedral classification
    pub edge_type: EdgeType,

    /// End points, smaller index first
    pub vertex_ids: [u8; 2],

    /// Facets sharing the edge; both entries are equal for an open edge
    pub facet_ids: [u8; 2],
}

/// A triangle of the mesh with counter-clockwise winding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet {
    /// Vertex indices
    pub vertex_ids: [u8; 3],

    /// Edge `i` joins `vertex_ids[i]` and `vertex_ids[(i + 1) % 3]`
    pub edge_ids: [u8; 3],

    /// Outward unit normal
    pub normal: Vector3,
}

/// Triangulated convex polyhedron with precomputed adjacency
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexMesh {
    vertices: Vec<Vector3>,
    facets: Vec<Facet>,
    edges: Vec<Edge>,
}

impl ConvexMesh {
    /// Builds a mesh from a vertex list and counter-clockwise triangle indices.
    ///
    /// Vertices are scaled per axis. Zero-area triangles are dropped. Edges are
    /// classified as convex, concave or flat from the two facets sharing them.
    pub fn new(vertices: &[Vector3], indices: &[u16], scale: Vector3) -> Result<Self> {
        if vertices.len() > MAX_VERTICES {
            return Err(PhysicsError::CapacityExceeded {
                resource: "convex mesh vertices",
                limit: MAX_VERTICES,
            });
        }
        if indices.len() > MAX_FACETS * 3 {
            return Err(PhysicsError::CapacityExceeded {
                resource: "convex mesh facets",
                limit: MAX_FACETS,
            });
        }
        if indices.len() % 3 != 0 {
            return Err(PhysicsError::InvalidGeometry(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            )));
        }
        if scale.length_squared() <= 0.0 {
            return Err(PhysicsError::InvalidParameter("mesh scale must be non-zero".to_string()));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(PhysicsError::InvalidGeometry(format!(
                "index {} out of range for {} vertices",
                bad,
                vertices.len()
            )));
        }

        let vertices: Vec<Vector3> = vertices.iter().map(|v| v.mul_per_elem(&scale)).collect();

        let mut facets = Vec::with_capacity(indices.len() / 3);
        for tri in indices.chunks_exact(3) {
            let p0 = vertices[tri[0] as usize];
            let p1 = vertices[tri[1] as usize];
            let p2 = vertices[tri[2] as usize];

            let normal = (p1 - p0).cross(&(p2 - p0));
            let area_sqr = normal.length_squared();
            if area_sqr > EPSILON * EPSILON {
                facets.push(Facet {
                    vertex_ids: [tri[0] as u8, tri[1] as u8, tri[2] as u8],
                    edge_ids: [0; 3],
                    normal: normal / area_sqr.sqrt(),
                });
            }
        }

        if facets.is_empty() {
            return Err(PhysicsError::InvalidGeometry("mesh has no non-degenerate facets".to_string()));
        }

        let edges = Self::build_edges(&vertices, &mut facets)?;

        Ok(Self { vertices, facets, edges })
    }

    /// Axis-aligned box with corners at `±scale / 2`, 8 vertices and 12 triangles
    pub fn cuboid(scale: Vector3) -> Result<Self> {
        const VERTICES: [[f32; 3]; 8] = [
            [-0.5, -0.5, 0.5],
            [0.5, -0.5, 0.5],
            [-0.5, 0.5, 0.5],
            [0.5, 0.5, 0.5],
            [-0.5, 0.5, -0.5],
            [0.5, 0.5, -0.5],
            [-0.5, -0.5, -0.5],
            [0.5, -0.5, -0.5],
        ];
        const INDICES: [u16; 36] = [
            0, 1, 2, 2, 1, 3,
            2, 3, 4, 4, 3, 5,
            4, 5, 6, 6, 5, 7,
            6, 7, 0, 0, 7, 1,
            1, 7, 3, 3, 7, 5,
            6, 0, 4, 4, 0, 2,
        ];

        let vertices: Vec<Vector3> = VERTICES.iter().copied().map(Vector3::from).collect();
        Self::new(&vertices, &INDICES, scale)
    }

    // Registers each unordered vertex pair once, keyed in a triangular table.
    fn build_edges(vertices: &[Vector3], facets: &mut [Facet]) -> Result<Vec<Edge>> {
        let mut table: Vec<Option<u8>> = vec![None; MAX_VERTICES * (MAX_VERTICES - 1) / 2];
        let mut edges: Vec<Edge> = Vec::new();

        for i in 0..facets.len() {
            for e in 0..3 {
                let facet = facets[i];
                let a = facet.vertex_ids[e];
                let b = facet.vertex_ids[(e + 1) % 3];
                let (v0, v1) = (a.min(b), a.max(b));
                let slot = v1 as usize * (v1 as usize - 1) / 2 + v0 as usize;

                match table[slot] {
                    None => {
                        if edges.len() >= MAX_EDGES {
                            return Err(PhysicsError::CapacityExceeded {
                                resource: "convex mesh edges",
                                limit: MAX_EDGES,
                            });
                        }
                        let id = edges.len() as u8;
                        edges.push(Edge {
                            edge_type: EdgeType::Convex,
                            vertex_ids: [v0, v1],
                            facet_ids: [i as u8; 2],
                        });
                        table[slot] = Some(id);
                        facets[i].edge_ids[e] = id;
                    }
                    Some(id) => {
                        let edge = &mut edges[id as usize];
                        let other = facets[edge.facet_ids[0] as usize];

                        // Side of the registering facet's plane the opposite vertex lies on
                        let s = vertices[facet.vertex_ids[(e + 2) % 3] as usize];
                        let q = vertices[other.vertex_ids[0] as usize];
                        let d = (s - q).dot(&other.normal);

                        edge.edge_type = if d < -EPSILON {
                            EdgeType::Convex
                        } else if d > EPSILON {
                            EdgeType::Concave
                        } else {
                            EdgeType::Flat
                        };
                        edge.facet_ids[1] = i as u8;
                        facets[i].edge_ids[e] = id;
                    }
                }
            }
        }

        Ok(edges)
    }

    /// Returns the scaled vertices
    #[inline]
    pub fn vertices(&self) -> &[Vector3] {
        &self.vertices
    }

    /// Returns the facets
    #[inline]
    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    /// Returns the edges
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns true if any edge was classified as concave
    pub fn has_concave_edges(&self) -> bool {
        self.edges.iter().any(|e| e.edge_type == EdgeType::Concave)
    }

    /// Projects every vertex onto `axis` and returns the `(min, max)` interval
    pub fn projection(&self, axis: Vector3) -> (f32, f32) {
        self.vertices.iter().fold((f32::MAX, -f32::MAX), |(lo, hi), v| {
            let p = axis.dot(v);
            (lo.min(p), hi.max(p))
        })
    }

    /// Local-space bounds of the vertices
    pub fn local_bounds(&self) -> Aabb {
        Aabb::from_points(&self.vertices).unwrap_or_default()
    }
}
