//! Editing state: the zone editor, its history, selection, template
//! previews and numeric steppers

pub mod edit_type;
pub mod editor;
pub mod history;
pub mod preview;
pub mod selection;
pub mod stepper;
pub mod undo;

pub use edit_type::{CommitPolicy, EditType};
pub use editor::{EditResult, ZoneEditor};
pub use history::{History, HistoryEntry};
pub use preview::PreviewShape;
pub use selection::{PointSelection, SelectionRect};
pub use stepper::{NumberStepper, StepDirection};
