//! Zone definitions as script code, in the dialects resources consume
//!
//! Every function here is pure: the zone goes in, a string comes out. Zones
//! that are too small to export produce a Lua comment instead, so the result
//! can always be pasted somewhere without breaking a script.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::data::Zone;

const NEED_MORE_POINTS: &str = "-- Need at least 3 points";
const NO_POINTS: &str = "-- No points";

/// The supported output dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// `PolyZone:Create` with 2-D points and a `minZ`/`maxZ` pair
    #[value(name = "polyzone")]
    PolyZone,
    /// `lib.zones.poly` with 3-D points and a thickness
    #[value(name = "oxlib")]
    OxLib,
    /// Bare `vector2` list
    Vec2,
    /// Bare `vector3` list
    Vec3,
}

impl ExportFormat {
    /// Name shown in the "copied" notification
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::PolyZone => "PolyZone",
            ExportFormat::OxLib => "ox_lib",
            ExportFormat::Vec2 => "vector2",
            ExportFormat::Vec3 => "vector3",
        }
    }

    pub fn render(self, zone: &Zone) -> String {
        match self {
            ExportFormat::PolyZone => polyzone(zone),
            ExportFormat::OxLib => ox_lib(zone),
            ExportFormat::Vec2 => vector2_list(zone),
            ExportFormat::Vec3 => vector3_list(zone),
        }
    }
}

/// Shortest round-trip decimal form, with no trailing `.0` and no negative zero.
pub fn fmt_num(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

/// `local <name> = PolyZone:Create({...}, {...})`
pub fn polyzone(zone: &Zone) -> String {
    if !zone.is_polygon() {
        return NEED_MORE_POINTS.to_string();
    }
    let points = zone
        .points
        .iter()
        .map(|p| format!("    vector2({}, {})", fmt_num(p.world.x), fmt_num(p.world.y)))
        .collect::<Vec<_>>()
        .join(",\n");
    let min_z = zone.ground_z.unwrap_or(0.0);
    let max_z = min_z + zone.thickness;

    format!(
        "local {} = PolyZone:Create({{\n{}\n}}, {{\n    name = \"{}\",\n    minZ = {},\n    maxZ = {}\n}})",
        zone.identifier(),
        points,
        zone.name,
        fmt_num(min_z),
        fmt_num(max_z),
    )
}

/// `lib.zones.poly({...})` with every point at the zone's ground height
pub fn ox_lib(zone: &Zone) -> String {
    if !zone.is_polygon() {
        return NEED_MORE_POINTS.to_string();
    }
    let base = fmt_num(zone.ground_z.unwrap_or(0.0));
    let points = zone
        .points
        .iter()
        .map(|p| {
            format!(
                "        vec3({}, {}, {})",
                fmt_num(p.world.x),
                fmt_num(p.world.y),
                base
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "lib.zones.poly({{\n    name = '{}',\n    points = {{\n{}\n    }},\n    thickness = {},\n    debug = true\n}})",
        zone.identifier(),
        points,
        fmt_num(zone.thickness),
    )
}

/// One `vector2(x, y)` per line
pub fn vector2_list(zone: &Zone) -> String {
    if zone.points.is_empty() {
        return NO_POINTS.to_string();
    }
    zone.points
        .iter()
        .map(|p| format!("vector2({}, {})", fmt_num(p.world.x), fmt_num(p.world.y)))
        .collect::<Vec<_>>()
        .join(",\n")
}

/// One `vector3(x, y, z)` per line. The zone's ground height wins over a
/// point's own height; points with neither get 0.
pub fn vector3_list(zone: &Zone) -> String {
    if zone.points.is_empty() {
        return NO_POINTS.to_string();
    }
    zone.points
        .iter()
        .map(|p| {
            let z = zone.ground_z.or(p.z).unwrap_or(0.0);
            format!(
                "vector3({}, {}, {})",
                fmt_num(p.world.x),
                fmt_num(p.world.y),
                fmt_num(z)
            )
        })
        .collect::<Vec<_>>()
        .join(",\n")
}
