//! Live preview of a shape template before it becomes a zone
//!
//! The preview is not part of history. It is either confirmed, which turns
//! it into a zone, or cancelled.

use crate::geometry::shapes::generate;
use crate::geometry::{MapPoint, MapProjection, ShapeKind, WorldPoint};

pub const MIN_PREVIEW_SCALE: f64 = 5.0;
pub const MAX_PREVIEW_SCALE: f64 = 3000.0;
pub const PREVIEW_SCALE_STEP: f64 = 5.0;
pub const MAX_PREVIEW_ROTATION: f64 = 360.0;
pub const PREVIEW_ROTATION_STEP: f64 = 5.0;

/// An uncommitted template placement
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewShape {
    kind: ShapeKind,
    points: Vec<WorldPoint>,
    center: WorldPoint,
    scale: f64,
    rotation: f64,
}

impl PreviewShape {
    /// Place a template at `center`, which is rounded to whole world units,
    /// with no rotation.
    pub fn new(kind: ShapeKind, center: WorldPoint, size: f64) -> Self {
        let mut preview = Self {
            kind,
            points: Vec::new(),
            center: center.whole(),
            scale: size.clamp(MIN_PREVIEW_SCALE, MAX_PREVIEW_SCALE),
            rotation: 0.0,
        };
        preview.regenerate();
        preview
    }

    /// Re-centre the preview; used while its centre handle is dragged.
    pub fn move_to(&mut self, center: WorldPoint) {
        self.center = center.whole();
        self.regenerate();
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(MIN_PREVIEW_SCALE, MAX_PREVIEW_SCALE);
        self.regenerate();
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = degrees.clamp(0.0, MAX_PREVIEW_ROTATION);
        self.regenerate();
    }

    fn regenerate(&mut self) {
        self.points = generate(self.kind, self.center, self.scale, self.rotation);
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn points(&self) -> &[WorldPoint] {
        &self.points
    }

    pub fn center(&self) -> WorldPoint {
        self.center
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Outline for drawing on the map
    pub fn map_outline(&self, projection: &MapProjection) -> Vec<MapPoint> {
        self.points
            .iter()
            .map(|p| projection.world_to_map(*p))
            .collect()
    }

    /// Name given to the zone the preview turns into
    pub fn zone_name(&self) -> String {
        format!("{} Zone", self.kind.display_name())
    }
}
