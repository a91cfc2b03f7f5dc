//! Shape templates for quickly laying out common zone outlines
//!
//! A template is generated in shape-local space around the origin, rotated
//! about the origin and only then translated to its centre. Keeping that
//! order means a preview dragged to a new centre rotates about where it is
//! now, not about where it was first placed.

use std::fmt;
use std::str::FromStr;

use kurbo::{Affine, Vec2};
use serde::{Deserialize, Serialize};

use super::world_space::WorldPoint;
use crate::core::errors::EditorError;

/// The built-in shape templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
    Pentagon,
    Hexagon,
    Star,
    LShape,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::Rectangle,
        ShapeKind::Circle,
        ShapeKind::Triangle,
        ShapeKind::Pentagon,
        ShapeKind::Hexagon,
        ShapeKind::Star,
        ShapeKind::LShape,
    ];

    /// The tag used in host payloads and on the command line.
    pub fn tag(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Pentagon => "pentagon",
            ShapeKind::Hexagon => "hexagon",
            ShapeKind::Star => "star",
            ShapeKind::LShape => "l-shape",
        }
    }

    /// Human readable name, used to title zones created from the template.
    pub fn display_name(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Circle => "Circle",
            ShapeKind::Triangle => "Triangle",
            ShapeKind::Pentagon => "Pentagon",
            ShapeKind::Hexagon => "Hexagon",
            ShapeKind::Star => "Star",
            ShapeKind::LShape => "L-Shape",
        }
    }

    pub fn vertex_count(self) -> usize {
        match self {
            ShapeKind::Rectangle => 4,
            ShapeKind::Circle => 16,
            ShapeKind::Triangle => 3,
            ShapeKind::Pentagon => 5,
            ShapeKind::Hexagon => 6,
            ShapeKind::Star => 10,
            ShapeKind::LShape => 6,
        }
    }

    /// Vertex offsets from the centre before rotation.
    pub fn local_outline(self, size: f64) -> Vec<Vec2> {
        const UP: f64 = -std::f64::consts::FRAC_PI_2;
        match self {
            ShapeKind::Rectangle => vec![
                Vec2::new(-size, -size),
                Vec2::new(size, -size),
                Vec2::new(size, size),
                Vec2::new(-size, size),
            ],
            ShapeKind::Circle => regular_polygon(16, 0.0, |_| size),
            ShapeKind::Triangle => regular_polygon(3, UP, |_| size),
            ShapeKind::Pentagon => regular_polygon(5, UP, |_| size),
            ShapeKind::Hexagon => regular_polygon(6, 0.0, |_| size),
            ShapeKind::Star => {
                regular_polygon(10, UP, |i| if i % 2 == 0 { size } else { size * 0.5 })
            }
            ShapeKind::LShape => vec![
                Vec2::new(-size, -size),
                Vec2::new(0.0, -size),
                Vec2::new(0.0, 0.0),
                Vec2::new(size, 0.0),
                Vec2::new(size, size),
                Vec2::new(-size, size),
            ],
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ShapeKind {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ShapeKind::ALL
            .into_iter()
            .find(|kind| kind.tag() == wanted)
            .ok_or_else(|| EditorError::UnknownShape(s.to_string()))
    }
}

/// `count` vertices evenly spaced around the origin, the first at
/// `start_angle` radians, with a per-vertex radius.
fn regular_polygon(count: usize, start_angle: f64, radius: impl Fn(usize) -> f64) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            let angle = (i as f64 / count as f64) * std::f64::consts::TAU + start_angle;
            Vec2::from_angle(angle) * radius(i)
        })
        .collect()
}

/// Generate a template outline in world space.
///
/// Coordinates are rounded to 2 decimals like every other stored point.
/// The output depends only on the inputs, so regenerating with a new centre,
/// size or rotation simply replaces the previous outline.
pub fn generate(
    kind: ShapeKind,
    center: WorldPoint,
    size: f64,
    rotation_degrees: f64,
) -> Vec<WorldPoint> {
    let transform =
        Affine::translate(center.to_raw().to_vec2()) * Affine::rotate(rotation_degrees.to_radians());
    kind.local_outline(size)
        .into_iter()
        .map(|offset| WorldPoint::from_raw(transform * offset.to_point()).rounded())
        .collect()
}
