//! The zone data model

pub mod zone;

pub use zone::{palette_color, FillPattern, IdAllocator, PointId, Zone, ZoneId, ZonePoint, ZONE_COLORS};
