//! Core application functionality
//!
//! This module contains the core application logic, including:
//! - Command line handling and the command runner
//! - Error types
//! - Editor settings

pub mod app;
pub mod cli;
pub mod errors;
pub mod settings;

// Re-export commonly used items
pub use app::run;
pub use cli::{CliArgs, CliCommand};
pub use errors::{EditorError, ZoneContext, ZoneResult};
pub use settings::EditorSettings;
