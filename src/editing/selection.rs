//-----------------------------------------------------------------------
// Point Selection
//-----------------------------------------------------------------------
// Points of the active zone can be selected with a marquee: press on the
// empty map, drag, release. The selection only ever refers to points of
// the active zone and is cleared whenever the active zone changes or a
// snapshot is restored.

use std::collections::BTreeSet;

use crate::data::{PointId, ZonePoint};
use crate::geometry::point_in_rect;
use crate::geometry::MapPoint;

/// An in-progress rectangular selection, in map space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    /// Where the press happened
    pub start: MapPoint,
    /// Current pointer position
    pub end: MapPoint,
}

impl SelectionRect {
    pub fn new(start: MapPoint) -> Self {
        Self { start, end: start }
    }

    pub fn contains(&self, point: MapPoint) -> bool {
        point_in_rect(point, self.start, self.end)
    }

    /// Ids of the points lying inside the rectangle, in outline order
    pub fn hits<'a>(&self, points: impl IntoIterator<Item = &'a ZonePoint>) -> Vec<PointId> {
        points
            .into_iter()
            .filter(|p| self.contains(p.map))
            .map(|p| p.id)
            .collect()
    }
}

/// The set of selected points within the active zone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSelection {
    selected: BTreeSet<PointId>,
}

impl PointSelection {
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Replace the selection
    pub fn set(&mut self, ids: impl IntoIterator<Item = PointId>) {
        self.selected = ids.into_iter().collect();
    }

    pub fn remove(&mut self, id: PointId) {
        self.selected.remove(&id);
    }

    pub fn contains(&self, id: PointId) -> bool {
        self.selected.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = PointId> + '_ {
        self.selected.iter().copied()
    }
}
