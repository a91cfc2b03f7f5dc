//! Input/Output
//!
//! Everything that turns zones into text or text into zones:
//! - Importing outlines from pasted script snippets
//! - Exporting zones as script code
//! - The JSON payloads exchanged with the host process

pub mod export;
pub mod host;
pub mod import;

pub use export::ExportFormat;
pub use host::{GroundZResolved, HostMessage, HostRequest};
pub use import::{CoordinateImporter, ImportedZone};
