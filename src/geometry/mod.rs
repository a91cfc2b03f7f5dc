//! Coordinate systems and geometric operations

pub mod grid;
pub mod measure;
pub mod shapes;
pub mod world_space;

// Re-export commonly used items
pub use measure::{distance, nearest_edge_insert_index, point_in_rect};
pub use shapes::ShapeKind;
pub use world_space::{
    projection_to_world, round2, snap, world_to_projection, MapPoint, MapProjection, WorldPoint,
    WORLD_BOUNDS,
};
