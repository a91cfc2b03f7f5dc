//! Linear undo stack of whole-state snapshots

use std::collections::VecDeque;

/// An ordered run of snapshots with a cursor on the live one.
///
/// Pushing while the cursor is behind the tail throws away everything after
/// the cursor; there are no redo branches.
#[derive(Debug, Clone)]
pub struct UndoStack<T: Clone> {
    /// Maximum number of snapshots kept.
    limit: usize,
    snapshots: VecDeque<T>,
    /// Index in `snapshots` of the live state.
    cursor: usize,
}

impl<T: Clone> UndoStack<T> {
    /// Start a stack whose first entry is `initial`.
    pub fn new(limit: usize, initial: T) -> Self {
        let mut snapshots = VecDeque::new();
        snapshots.push_back(initial);
        UndoStack {
            limit: limit.max(1),
            snapshots,
            cursor: 0,
        }
    }

    /// Step back one entry, returning the state to restore.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.snapshots.get(self.cursor)
    }

    /// Step forward one entry, returning the state to restore.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.snapshots.get(self.cursor)
    }

    /// Record a new live state after the cursor.
    pub fn push(&mut self, item: T) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(item);
        self.cursor = self.snapshots.len() - 1;

        if self.snapshots.len() > self.limit {
            self.snapshots.pop_front();
            self.cursor -= 1;
        }
    }

    pub fn current(&self) -> Option<&T> {
        self.snapshots.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_are_no_ops() {
        let mut stack = UndoStack::new(16, 0);
        assert_eq!(stack.undo(), None);
        stack.push(1);
        assert_eq!(stack.redo(), None);
        assert_eq!(stack.undo(), Some(&0));
        assert_eq!(stack.undo(), None);
    }

    #[test]
    fn test_push_after_undo_discards_tail() {
        let mut stack = UndoStack::new(16, 0);
        stack.push(1);
        stack.push(2);
        stack.undo();
        stack.undo();
        stack.push(9);
        assert_eq!(stack.len(), 2);
        assert!(!stack.can_redo());
        assert_eq!(stack.current(), Some(&9));
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut stack = UndoStack::new(3, 0);
        for i in 1..=5 {
            stack.push(i);
        }
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.cursor(), 2);
        stack.undo();
        assert_eq!(stack.undo(), Some(&3));
        assert!(!stack.can_undo());
    }
}
