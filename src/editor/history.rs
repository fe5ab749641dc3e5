//! Linear undo/redo over full snapshots.

use std::collections::VecDeque;

/// Snapshot list with a read position.
///
/// Pushing after an undo discards every snapshot past the position.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: VecDeque<T>,
    position: usize,
    limit: usize,
}

impl<T: Clone> History<T> {
    /// Start a history whose only entry is `initial`. `limit` is clamped to at least 1.
    pub fn new(initial: T, limit: usize) -> Self {
        let mut entries = VecDeque::new();
        entries.push_back(initial);
        Self {
            entries,
            position: 0,
            limit: limit.max(1),
        }
    }

    /// Record a new snapshot at the current position.
    pub fn push(&mut self, snapshot: T) {
        self.entries.truncate(self.position + 1);
        self.entries.push_back(snapshot);

        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        self.position = self.entries.len() - 1;
    }

    /// Step back, returning the snapshot now current.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.position -= 1;
        self.entries.get(self.position)
    }

    /// Step forward, returning the snapshot now current.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.position += 1;
        self.entries.get(self.position)
    }

    pub fn can_undo(&self) -> bool {
        self.position > 0
    }

    pub fn can_redo(&self) -> bool {
        self.position + 1 < self.entries.len()
    }

    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_undo_redo_walk() {
        let mut history = History::new(0, 10);
        history.push(1);
        history.push(2);

        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.undo(), Some(&0));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), Some(&1));
        assert_eq!(history.redo(), Some(&2));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_push_after_undo_discards_branch() {
        let mut history = History::new("a", 10);
        history.push("b");
        history.push("c");
        history.undo();
        history.undo();
        history.push("d");

        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(history.current(), Some(&"d"));
        assert_eq!(history.undo(), Some(&"a"));
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::new(0, 3);
        for i in 1..=5 {
            history.push(i);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo(), Some(&4));
        assert_eq!(history.undo(), Some(&3));
        assert_eq!(history.undo(), None);
    }

    proptest! {
        #[test]
        fn prop_undo_returns_previous_snapshot(values in prop::collection::vec(any::<u32>(), 1..40)) {
            let mut history = History::new(u32::MAX, 100);
            for v in &values {
                history.push(*v);
            }
            let expected = if values.len() >= 2 { values[values.len() - 2] } else { u32::MAX };
            prop_assert_eq!(history.undo().copied(), Some(expected));
            prop_assert_eq!(history.redo().copied(), values.last().copied());
        }

        #[test]
        fn prop_position_stays_in_bounds(ops in prop::collection::vec(0u8..3, 0..60)) {
            let mut history = History::new(0u32, 8);
            for (i, op) in ops.iter().enumerate() {
                match op {
                    0 => history.push(i as u32),
                    1 => { history.undo(); }
                    _ => { history.redo(); }
                }
                prop_assert!(history.position() < history.len());
                prop_assert!(history.len() <= 8);
            }
        }
    }
}
