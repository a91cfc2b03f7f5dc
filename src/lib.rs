// A polygon zone editor for FiveM maps, built on the Bevy ECS.

pub mod core;
pub mod data;
pub mod editing;
pub mod geometry;
pub mod io;
pub mod systems;
pub mod utils;

pub use crate::core::{CliArgs, EditorError, EditorSettings};
pub use data::{Zone, ZoneId, ZonePoint};
pub use editing::ZoneEditor;
pub use systems::{ZoneCreatorPlugin, ZoneCreatorSession};
