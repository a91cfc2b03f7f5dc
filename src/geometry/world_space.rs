//! World space and map space coordinate systems
//!
//! World space is the game's own coordinate system, the one zone scripts are
//! written in. Map space is the pixel frame of the fixed map image, reported
//! by the map widget as `(lat, lng)`: `lng` grows to the right and `lat` grows
//! upwards from the bottom edge of the image.
//!
//! The two are related by a fixed affine map with independent per-axis scale,
//! a vertical flip and per-axis offsets. Those constants belong to the map
//! image that ships with the editor and are not configurable at runtime.

use std::fmt;
use std::ops::{Add, Sub};

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Width of the map image in map units (pixels).
pub const MAP_IMAGE_WIDTH: f64 = 4096.0;
/// Height of the map image in map units (pixels).
pub const MAP_IMAGE_HEIGHT: f64 = 6144.0;

const SCALE_X: f64 = 0.454685;
const SCALE_Y: f64 = -0.454830;
const OFFSET_X: f64 = 1882.72;
const OFFSET_Y: f64 = 3826.58;

/// The playable area in world units, used to lay out the grid overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

pub const WORLD_BOUNDS: WorldBounds = WorldBounds {
    min_x: -4000.0,
    max_x: 4500.0,
    min_y: -4000.0,
    max_y: 8000.0,
};

/// A point in world space.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

/// A point in map space, in the widget's `(lat, lng)` convention.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MapPoint {
    pub lat: f64,
    pub lng: f64,
}

impl WorldPoint {
    pub const ZERO: WorldPoint = WorldPoint { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> WorldPoint {
        WorldPoint { x, y }
    }

    /// Convert back from a kurbo point after doing vector math in world space.
    pub fn from_raw(point: impl Into<Point>) -> WorldPoint {
        let point = point.into();
        WorldPoint::new(point.x, point.y)
    }

    pub fn to_raw(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Both axes rounded to the 2-decimal precision coordinates are stored at.
    pub fn rounded(self) -> WorldPoint {
        WorldPoint::new(round2(self.x), round2(self.y))
    }

    /// Both axes snapped to the nearest multiple of `grid_size`.
    pub fn snapped(self, grid_size: f64) -> WorldPoint {
        WorldPoint::new(snap(self.x, grid_size), snap(self.y, grid_size))
    }

    /// Both axes rounded to whole world units.
    pub fn whole(self) -> WorldPoint {
        WorldPoint::new(round_half_up(self.x), round_half_up(self.y))
    }
}

impl MapPoint {
    pub fn new(lat: f64, lng: f64) -> MapPoint {
        MapPoint { lat, lng }
    }

    /// A kurbo point with `x = lng` and `y = lat`.
    pub fn to_raw(self) -> Point {
        Point::new(self.lng, self.lat)
    }

    pub fn from_raw(point: impl Into<Point>) -> MapPoint {
        let point = point.into();
        MapPoint::new(point.y, point.x)
    }

    pub fn midpoint(self, other: MapPoint) -> MapPoint {
        MapPoint::from_raw(self.to_raw().midpoint(other.to_raw()))
    }
}

impl Add<Vec2> for WorldPoint {
    type Output = WorldPoint;

    fn add(self, other: Vec2) -> WorldPoint {
        WorldPoint::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub<WorldPoint> for WorldPoint {
    type Output = Vec2;

    fn sub(self, other: WorldPoint) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl From<(f64, f64)> for WorldPoint {
    fn from(src: (f64, f64)) -> WorldPoint {
        WorldPoint::new(src.0, src.1)
    }
}

impl fmt::Debug for WorldPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "WorldPoint<{} {}>", self.x, self.y)
    }
}

impl fmt::Display for WorldPoint {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "x: {:.2}, y: {:.2}", self.x, self.y)
    }
}

impl fmt::Debug for MapPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MapPoint<{} {}>", self.lat, self.lng)
    }
}

/// The affine mapping between world space and map space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapProjection {
    to_map: Affine,
    to_world: Affine,
}

impl MapProjection {
    pub fn new() -> Self {
        // lng = x * SCALE_X + OFFSET_X
        // lat = IMG_HEIGHT - (y * SCALE_Y + OFFSET_Y)
        let to_map = Affine::new([
            SCALE_X,
            0.0,
            0.0,
            -SCALE_Y,
            OFFSET_X,
            MAP_IMAGE_HEIGHT - OFFSET_Y,
        ]);
        MapProjection {
            to_map,
            to_world: to_map.inverse(),
        }
    }

    pub fn world_to_map(&self, point: WorldPoint) -> MapPoint {
        MapPoint::from_raw(self.to_map * point.to_raw())
    }

    pub fn map_to_world(&self, point: MapPoint) -> WorldPoint {
        WorldPoint::from_raw(self.to_world * point.to_raw())
    }
}

impl Default for MapProjection {
    fn default() -> Self {
        Self::new()
    }
}

/// Project world `(x, y)` onto the map.
pub fn world_to_projection(x: f64, y: f64) -> MapPoint {
    MapProjection::new().world_to_map(WorldPoint::new(x, y))
}

/// Recover world `(x, y)` from a map position.
pub fn projection_to_world(lat: f64, lng: f64) -> WorldPoint {
    MapProjection::new().map_to_world(MapPoint::new(lat, lng))
}

/// Round to the nearest multiple of `grid_size`. A non-positive grid leaves
/// the value untouched.
pub fn snap(value: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 || !grid_size.is_finite() {
        return value;
    }
    round_half_up(value / grid_size) * grid_size
}

/// Round to 2 decimals, halves rounding towards positive infinity.
pub fn round2(value: f64) -> f64 {
    round_half_up(value * 100.0) / 100.0
}

fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
