//! Distances, hit tests and edge lookup for zone outlines

use kurbo::Rect;

use super::world_space::{MapPoint, WorldPoint};

/// Euclidean distance between two points in world units.
///
/// Always measured in world space: the map image is not square, so map-space
/// distances are not proportional to world distances.
pub fn distance(a: WorldPoint, b: WorldPoint) -> f64 {
    a.to_raw().distance(b.to_raw())
}

/// Inclusive containment test against the rectangle spanned by two corners
/// given in any order.
pub fn point_in_rect(point: MapPoint, corner_a: MapPoint, corner_b: MapPoint) -> bool {
    let rect = Rect::from_points(corner_a.to_raw(), corner_b.to_raw());
    let p = point.to_raw();
    // kurbo's `contains` excludes the far edges
    p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
}

/// Index at which a vertex clicked near `click` should be spliced into the
/// closed polygon `outline`.
///
/// Edges wrap from the last point to the first. The edge whose midpoint lies
/// closest to the click wins, the first one in iteration order on ties, and
/// the returned index sits immediately after that edge's first point.
pub fn nearest_edge_insert_index(outline: &[MapPoint], click: MapPoint) -> usize {
    let mut best = (f64::INFINITY, 0);
    let n = outline.len();
    for i in 0..n {
        let mid = outline[i].midpoint(outline[(i + 1) % n]);
        let dist = mid.to_raw().distance(click.to_raw());
        if dist < best.0 {
            best = (dist, i + 1);
        }
    }
    best.1
}

/// Length label for one edge of an outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeLength {
    /// Index of the edge's first point.
    pub from: usize,
    pub length: f64,
    /// Where the label sits on the map.
    pub anchor: MapPoint,
}

/// Per-edge world lengths of a closed outline, wrapping last to first.
/// Outlines with fewer than two points have no edges.
pub fn edge_lengths(world: &[WorldPoint], map: &[MapPoint]) -> Vec<EdgeLength> {
    let n = world.len().min(map.len());
    if n < 2 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            EdgeLength {
                from: i,
                length: distance(world[i], world[j]),
                anchor: map[i].midpoint(map[j]),
            }
        })
        .collect()
}

/// Average of the given points, `None` when empty.
pub fn centroid(points: impl IntoIterator<Item = WorldPoint>) -> Option<WorldPoint> {
    let mut count = 0usize;
    let (sx, sy) = points.into_iter().fold((0.0, 0.0), |(sx, sy), p| {
        count += 1;
        (sx + p.x, sy + p.y)
    });
    (count > 0).then(|| WorldPoint::new(sx / count as f64, sy / count as f64))
}
