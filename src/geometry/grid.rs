//! Grid overlay shown while snap-to-grid is on

use super::world_space::{MapPoint, MapProjection, WorldBounds};

/// Major grid lines are drawn every this many snap cells.
pub const MAJOR_GRID_EVERY: f64 = 5.0;

/// A grid line segment, already projected into map space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub from: MapPoint,
    pub to: MapPoint,
}

/// Major grid lines covering `bounds`, vertical lines first.
///
/// The extent is widened outwards to whole multiples of `grid_size` so the
/// lines stay aligned with the snap positions.
pub fn major_grid_lines(
    projection: &MapProjection,
    bounds: WorldBounds,
    grid_size: f64,
) -> Vec<GridLine> {
    if grid_size <= 0.0 {
        return Vec::new();
    }

    let start_x = (bounds.min_x / grid_size).floor() * grid_size;
    let end_x = (bounds.max_x / grid_size).ceil() * grid_size;
    let start_y = (bounds.min_y / grid_size).floor() * grid_size;
    let end_y = (bounds.max_y / grid_size).ceil() * grid_size;
    let spacing = grid_size * MAJOR_GRID_EVERY;

    let mut lines = Vec::new();
    let mut x = start_x;
    while x <= end_x {
        lines.push(GridLine {
            from: projection.world_to_map((x, bounds.min_y).into()),
            to: projection.world_to_map((x, bounds.max_y).into()),
        });
        x += spacing;
    }

    let mut y = start_y;
    while y <= end_y {
        lines.push(GridLine {
            from: projection.world_to_map((bounds.min_x, y).into()),
            to: projection.world_to_map((bounds.max_x, y).into()),
        });
        y += spacing;
    }

    lines
}
