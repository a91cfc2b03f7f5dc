//! Zones and their points
//!
//! A zone is a named polygon with a vertical extent. Its points are kept in
//! winding order; the order they were clicked in is meaningful.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::geometry::measure::centroid;
use crate::geometry::{MapPoint, MapProjection, WorldPoint};

/// Colours handed out to new zones, cycled by creation index
pub const ZONE_COLORS: [&str; 8] = [
    "#22c55e", "#3b82f6", "#f59e0b", "#ef4444", "#06b6d4", "#ec4899", "#8b5cf6", "#a855f7",
];

/// Palette colour for the zone created when `existing` zones are present
pub fn palette_color(existing: usize) -> SmolStr {
    SmolStr::new_inline(ZONE_COLORS[existing % ZONE_COLORS.len()])
}

/// Identifier of a zone, unique for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(u64);

/// Identifier of a point, unique for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(u64);

impl ZoneId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl PointId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "zone-{}", self.0)
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "point-{}", self.0)
    }
}

/// Hands out fresh identifiers. Never rewound by undo, so an id is never
/// reused even after the entity it named has been undone away.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn zone(&mut self) -> ZoneId {
        ZoneId(self.bump())
    }

    pub fn point(&mut self) -> PointId {
        PointId(self.bump())
    }

    fn bump(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}

/// A vertex of a zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonePoint {
    pub id: PointId,
    /// Position in world space
    pub world: WorldPoint,
    /// Height in world space, unknown until computed or imported
    pub z: Option<f64>,
    /// Map position derived from `world` when the point was written
    pub map: MapPoint,
}

impl ZonePoint {
    pub fn new(
        id: PointId,
        world: WorldPoint,
        z: Option<f64>,
        projection: &MapProjection,
    ) -> Self {
        Self {
            id,
            world,
            z,
            map: projection.world_to_map(world),
        }
    }

    /// Move the point, refreshing its cached map position. The stored height
    /// no longer applies at the new position and is cleared.
    pub fn relocate(&mut self, world: WorldPoint, projection: &MapProjection) {
        self.world = world;
        self.z = None;
        self.map = projection.world_to_map(world);
    }
}

/// How the zone's interior is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillPattern {
    #[default]
    Solid,
    Stripes,
    Dots,
}

/// A named polygon with a vertical extent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: SmolStr,
    pub points: Vec<ZonePoint>,
    pub color: SmolStr,
    pub visible: bool,
    pub thickness: f64,
    pub fill_pattern: FillPattern,
    /// Elevation of the zone's floor, unknown until computed or imported
    pub ground_z: Option<f64>,
}

impl Zone {
    pub fn new(id: ZoneId, name: impl Into<SmolStr>, color: SmolStr, thickness: f64) -> Self {
        Self {
            id,
            name: name.into(),
            points: Vec::new(),
            color,
            visible: true,
            thickness,
            fill_pattern: FillPattern::default(),
            ground_z: None,
        }
    }

    pub fn point(&self, id: PointId) -> Option<&ZonePoint> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn point_index(&self, id: PointId) -> Option<usize> {
        self.points.iter().position(|p| p.id == id)
    }

    /// Whether the outline forms a closed polygon
    pub fn is_polygon(&self) -> bool {
        self.points.len() >= 3
    }

    pub fn world_outline(&self) -> Vec<WorldPoint> {
        self.points.iter().map(|p| p.world).collect()
    }

    pub fn map_outline(&self) -> Vec<MapPoint> {
        self.points.iter().map(|p| p.map).collect()
    }

    /// Average of the point positions
    pub fn centroid(&self) -> Option<WorldPoint> {
        centroid(self.points.iter().map(|p| p.world))
    }

    /// Name usable as a script identifier: each whitespace run becomes `_`
    pub fn identifier(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        let mut in_space = false;
        for c in self.name.chars() {
            if c.is_whitespace() {
                if !in_space {
                    out.push('_');
                }
                in_space = true;
            } else {
                out.push(c);
                in_space = false;
            }
        }
        out
    }
}
