mod convex_mesh;
mod shape;
mod collidable;

pub use self::convex_mesh::{ConvexMesh, Edge, EdgeType, Facet, MAX_EDGES, MAX_FACETS, MAX_VERTICES};
pub use self::shape::Shape;
pub use self::collidable::{Collidable, MAX_SHAPES};
