//! Session history: snapshots of the whole zone collection plus the
//! active-zone id, with immediate and debounced commits.

use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;
use serde::Serialize;

use super::edit_type::CommitPolicy;
use super::undo::UndoStack;
use crate::data::{Zone, ZoneId};

/// An immutable deep copy of the editable state at one moment.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HistoryEntry {
    pub zones: Vec<Zone>,
    pub active_zone: Option<ZoneId>,
}

/// The undo log and its debounce timer.
///
/// The history never reads the editor's state itself. A debounced request
/// only arms the timer; when [`History::tick`] reports it due, the owner
/// snapshots its state at that moment and hands it to [`History::commit`].
#[derive(Debug)]
pub struct History {
    entries: UndoStack<Arc<HistoryEntry>>,
    pending: Option<Timer>,
    debounce: Duration,
}

impl History {
    /// A history whose first entry is the empty state.
    pub fn new(limit: usize, debounce: Duration) -> Self {
        Self {
            entries: UndoStack::new(limit, Arc::new(HistoryEntry::default())),
            pending: None,
            debounce,
        }
    }

    /// Request a commit. Immediate requests cancel any pending debounced
    /// commit before writing, so nothing is committed out of order.
    pub fn request(&mut self, policy: CommitPolicy, snapshot: impl FnOnce() -> HistoryEntry) {
        match policy {
            CommitPolicy::Immediate => self.commit(snapshot()),
            CommitPolicy::Debounced => {
                self.pending = Some(Timer::new(self.debounce, TimerMode::Once));
            }
        }
    }

    /// Write `entry` as the new live state.
    pub fn commit(&mut self, entry: HistoryEntry) {
        self.pending = None;
        self.entries.push(Arc::new(entry));
        debug!(
            "Committed history entry {} of {}",
            self.entries.cursor(),
            self.entries.len()
        );
    }

    /// Advance the debounce timer. Returns true exactly once when a pending
    /// commit falls due; the caller must then [`commit`](Self::commit).
    pub fn tick(&mut self, delta: Duration) -> bool {
        let Some(timer) = self.pending.as_mut() else {
            return false;
        };
        timer.tick(delta);
        if timer.finished() {
            self.pending = None;
            return true;
        }
        false
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop a pending debounced commit without writing it.
    pub fn cancel_pending(&mut self) {
        if self.pending.take().is_some() {
            debug!("Cancelled pending history commit");
        }
    }

    pub fn undo(&mut self) -> Option<Arc<HistoryEntry>> {
        self.entries.undo().cloned()
    }

    pub fn redo(&mut self) -> Option<Arc<HistoryEntry>> {
        self.entries.redo().cloned()
    }

    pub fn can_undo(&self) -> bool {
        self.entries.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.entries.can_redo()
    }

    pub fn index(&self) -> usize {
        self.entries.cursor()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.current().map(Arc::as_ref)
    }
}
