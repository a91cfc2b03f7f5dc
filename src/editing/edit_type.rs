//! Types of state modifications, for the purposes of history.

/// When a modification is written to history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitPolicy {
    /// Commit now, cancelling any pending debounced commit first.
    Immediate,
    /// (Re)start the debounce window; one commit follows once edits stop.
    Debounced,
}

/// Types of state modifications, for the purposes of history.
///
/// Continuous edits group together: while a point is dragged every pointer
/// move is an edit, but the whole drag should land in history as one entry.
/// The orchestrator tags each edit with an `EditType` and the type decides
/// the commit policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditType {
    /// Any discrete change that always gets its own history entry
    Normal,
    /// A drag of some kind is in progress
    Drag,
    /// The drag finished; its final state is committed right away
    DragUp,
    /// A numeric or text field is being typed into or stepped
    FieldEdit,
    /// The field lost focus or the stepper was released
    FieldBlur,
}

impl EditType {
    pub fn commit_policy(self) -> CommitPolicy {
        match self {
            EditType::Drag | EditType::FieldEdit => CommitPolicy::Debounced,
            EditType::Normal | EditType::DragUp | EditType::FieldBlur => CommitPolicy::Immediate,
        }
    }
}

impl From<EditType> for CommitPolicy {
    fn from(edit: EditType) -> Self {
        edit.commit_policy()
    }
}
