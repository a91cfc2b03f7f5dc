//! Recover zone outlines from pasted script snippets
//!
//! The input is whatever the user copied out of a resource: a PolyZone or
//! ox_lib definition, a bare list of vectors, a Lua table of `{x = .., y = ..}`
//! entries, or just columns of numbers. Parsing is best effort. It never
//! fails; unrecognised text simply yields fewer points, and the caller
//! decides whether enough were found.
//!
//! Coordinates are recovered by a fixed, ordered list of matchers. The first
//! matcher that finds at least one point wins and the others are not
//! consulted, so the results of different syntaxes are never mixed.

use regex_lite::Regex;

use crate::geometry::WorldPoint;

/// One recovered coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportedPoint {
    /// World position, rounded to 2 decimals
    pub position: WorldPoint,
    pub z: Option<f64>,
}

/// Everything recovered from a snippet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedZone {
    pub points: Vec<ImportedPoint>,
    pub name: Option<String>,
    /// Explicit `thickness`, or the span of `minZ`/`maxZ`
    pub thickness: Option<f64>,
    /// The first height seen in the coordinates
    pub ground_z: Option<f64>,
}

impl ImportedZone {
    pub fn thickness_or(&self, default: f64) -> f64 {
        self.thickness.unwrap_or(default)
    }
}

/// A strategy for finding coordinates in free text
pub trait CoordinateMatcher: Send + Sync {
    /// Short description used in log output
    fn name(&self) -> &'static str;

    /// All coordinates this strategy recognises, in text order
    fn find_points(&self, text: &str) -> Vec<ImportedPoint>;
}

/// `vec2(x, y)`, `vector2(x, y)`, `vec3(x, y, z)`, `vector3(x, y, z)`
pub struct VectorLiteral {
    re: Regex,
}

impl Default for VectorLiteral {
    fn default() -> Self {
        let re = Regex::new(
            r"(?i)vec(?:tor)?([23])\s*\(\s*([-0-9.]+)\s*,\s*([-0-9.]+)(?:\s*,\s*([-0-9.]+))?\s*\)",
        )
        .expect("vector literal regex");
        Self { re }
    }
}

impl CoordinateMatcher for VectorLiteral {
    fn name(&self) -> &'static str {
        "vector literal"
    }

    fn find_points(&self, text: &str) -> Vec<ImportedPoint> {
        self.re
            .captures_iter(text)
            .filter_map(|caps| {
                point_from_parts(
                    caps.get(2).map(|m| m.as_str()),
                    caps.get(3).map(|m| m.as_str()),
                    caps.get(4).map(|m| m.as_str()),
                )
            })
            .collect()
    }
}

/// Two or three numbers separated by commas or whitespace, bounded by line
/// ends, whitespace, commas or braces
pub struct BareNumbers {
    re: Regex,
}

impl Default for BareNumbers {
    fn default() -> Self {
        let re = Regex::new(
            r"(?m)(?:^|[{\s,])(\s*-?[0-9]+\.?[0-9]*)\s*[,\s]\s*(-?[0-9]+\.?[0-9]*)(?:\s*[,\s]\s*(-?[0-9]+\.?[0-9]*))?(?:[}\s,]|$)",
        )
        .expect("bare number regex");
        Self { re }
    }
}

impl CoordinateMatcher for BareNumbers {
    fn name(&self) -> &'static str {
        "bare numbers"
    }

    fn find_points(&self, text: &str) -> Vec<ImportedPoint> {
        self.re
            .captures_iter(text)
            .filter_map(|caps| {
                point_from_parts(
                    caps.get(1).map(|m| m.as_str()),
                    caps.get(2).map(|m| m.as_str()),
                    caps.get(3).map(|m| m.as_str()),
                )
            })
            .collect()
    }
}

/// Lua tables: `{ x = 1, y = 2 }` or `{ x = 1, y = 2, z = 3 }`
pub struct KeyedTable {
    re: Regex,
}

impl Default for KeyedTable {
    fn default() -> Self {
        let re = Regex::new(
            r"(?i)\{\s*x\s*=\s*([-0-9.]+)\s*,\s*y\s*=\s*([-0-9.]+)(?:\s*,\s*z\s*=\s*([-0-9.]+))?\s*\}",
        )
        .expect("keyed table regex");
        Self { re }
    }
}

impl CoordinateMatcher for KeyedTable {
    fn name(&self) -> &'static str {
        "keyed table"
    }

    fn find_points(&self, text: &str) -> Vec<ImportedPoint> {
        self.re
            .captures_iter(text)
            .filter_map(|caps| {
                point_from_parts(
                    caps.get(1).map(|m| m.as_str()),
                    caps.get(2).map(|m| m.as_str()),
                    caps.get(3).map(|m| m.as_str()),
                )
            })
            .collect()
    }
}

fn point_from_parts(x: Option<&str>, y: Option<&str>, z: Option<&str>) -> Option<ImportedPoint> {
    let x = lenient_number(x?)?;
    let y = lenient_number(y?)?;
    Some(ImportedPoint {
        position: WorldPoint::new(x, y).rounded(),
        z: z.and_then(lenient_number),
    })
}

/// The ordered matcher list plus the metadata patterns
pub struct CoordinateImporter {
    matchers: Vec<Box<dyn CoordinateMatcher>>,
    name: Regex,
    thickness: Regex,
    min_z: Regex,
    max_z: Regex,
}

impl Default for CoordinateImporter {
    fn default() -> Self {
        Self {
            matchers: vec![
                Box::new(VectorLiteral::default()),
                Box::new(BareNumbers::default()),
                Box::new(KeyedTable::default()),
            ],
            name: Regex::new(r#"name\s*=\s*['"]([^'"]+)['"]"#).expect("name regex"),
            thickness: Regex::new(r"thickness\s*=\s*([-0-9.]+)").expect("thickness regex"),
            min_z: Regex::new(r"minZ\s*=\s*([-0-9.]+)").expect("minZ regex"),
            max_z: Regex::new(r"maxZ\s*=\s*([-0-9.]+)").expect("maxZ regex"),
        }
    }
}

impl CoordinateImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recover points and metadata from `text`.
    pub fn parse(&self, text: &str) -> ImportedZone {
        let mut points = Vec::new();
        for matcher in &self.matchers {
            points = matcher.find_points(text);
            if !points.is_empty() {
                bevy::log::debug!("Import matched {} points as {}", points.len(), matcher.name());
                break;
            }
        }

        let ground_z = points.iter().find_map(|p| p.z);
        ImportedZone {
            points,
            name: self.capture(&self.name, text).map(str::to_string),
            thickness: self.parse_thickness(text),
            ground_z,
        }
    }

    fn parse_thickness(&self, text: &str) -> Option<f64> {
        if let Some(raw) = self.capture(&self.thickness, text) {
            return lenient_number(raw);
        }
        let min = self.capture(&self.min_z, text).and_then(lenient_number)?;
        let max = self.capture(&self.max_z, text).and_then(lenient_number)?;
        Some(max - min)
    }

    fn capture<'t>(&self, re: &Regex, text: &'t str) -> Option<&'t str> {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// The number at the start of `text`, after leading whitespace.
///
/// Trailing garbage is ignored, so `"12.5.3"` reads as 12.5 and `"40m"` as 40.
/// Returns `None` when the text does not start with a number or the number
/// overflows to infinity.
pub fn lenient_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    // Optional exponent, only taken when it has digits
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'-' | b'+')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end].parse::<f64>().ok().filter(|value| value.is_finite())
}
