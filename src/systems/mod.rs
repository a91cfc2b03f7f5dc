//! Bevy Systems and Plugins
//!
//! This module wires the zone editor into a Bevy app:
//! - The session resource that owns all editing state
//! - Command events for user actions
//! - Host message, reply and request plumbing
//! - User-facing notifications

pub mod commands;
pub mod notifications;
pub mod plugins;
pub mod session;

// Re-export commonly used items
pub use commands::{CommandsPlugin, TextInputFocus};
pub use notifications::{Notification, NotificationKind, Notifications};
pub use plugins::{SessionPlugin, SessionSet, ZoneCreatorPlugin};
pub use session::{Gesture, KeyPress, StepperTarget, ZoneCreatorSession};
