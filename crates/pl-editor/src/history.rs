//! Undo/Redo snapshot history.
//!
//! Every committed edit captures the whole scene. Undo and redo move a
//! cursor through the captured snapshots and hand back the one to display,
//! so replaying history never depends on inverting individual edits.
//!
//! The history is linear: capturing after an undo drops every snapshot past
//! the cursor before appending (the redo branch is discarded).

/// Linear, branch-discarding snapshot history.
#[derive(Debug, Clone)]
pub struct History<S> {
    entries: Vec<S>,
    /// Index of the snapshot currently displayed.
    cursor: usize,
    /// Maximum number of entries kept (`None` = unbounded).
    max_depth: Option<usize>,
}

impl<S> History<S> {
    /// Start a history whose only entry is `initial` (the empty scene).
    pub fn new(initial: S) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            max_depth: None,
        }
    }

    /// Like `new`, but keeps at most `max_depth` snapshots; the oldest is
    /// dropped when a capture would exceed it. Values below 1 act as 1.
    pub fn with_max_depth(initial: S, max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth.max(1)),
            ..Self::new(initial)
        }
    }

    /// Record a snapshot of a committed edit.
    ///
    /// Entries after the cursor are discarded, then `snapshot` is appended
    /// and becomes current.
    pub fn capture(&mut self, snapshot: S) {
        let discarded = self.entries.len() - (self.cursor + 1);
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);

        if let Some(max) = self.max_depth
            && self.entries.len() > max
        {
            let excess = self.entries.len() - max;
            self.entries.drain(..excess);
        }
        self.cursor = self.entries.len() - 1;

        log::debug!(
            "history capture: {} entries, cursor {}{}",
            self.entries.len(),
            self.cursor,
            if discarded > 0 {
                format!(", discarded {discarded} redo entries")
            } else {
                String::new()
            }
        );
    }

    /// Step back one snapshot. Returns the snapshot to display, or `None`
    /// when already at the oldest entry.
    pub fn undo(&mut self) -> Option<&S> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        log::debug!("undo → cursor {}", self.cursor);
        self.entries.get(self.cursor)
    }

    /// Step forward one snapshot. Returns the snapshot to display, or `None`
    /// when already at the newest entry.
    pub fn redo(&mut self) -> Option<&S> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        log::debug!("redo → cursor {}", self.cursor);
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Checked against the live entry count, never a cached length.
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a history holds at least its initial snapshot.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The snapshot at the cursor.
    pub fn current(&self) -> &S {
        &self.entries[self.cursor]
    }

    pub fn entries(&self) -> &[S] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn starts_with_single_entry() {
        let h = History::new("S0");
        assert_eq!(h.len(), 1);
        assert_eq!(h.cursor(), 0);
        assert!(!h.can_undo());
        assert!(!h.can_redo());
        assert_eq!(*h.current(), "S0");
    }

    #[test]
    fn undo_redo_on_single_entry_are_noops() {
        let mut h = History::new(0);
        assert_eq!(h.undo(), None);
        assert_eq!(h.redo(), None);
        assert_eq!(h.cursor(), 0);
        assert_eq!(h.entries(), &[0]);
    }

    #[test]
    fn cursor_tracks_top_after_every_capture() {
        let mut h = History::new(0);
        for i in 1..=10 {
            h.capture(i);
            assert_eq!(h.cursor(), h.len() - 1);
            assert_eq!(h.len(), i + 1);
        }
    }

    #[test]
    fn undo_then_redo_restores() {
        let mut h = History::new("S0");
        h.capture("S1");
        h.capture("S2");

        let before = (h.cursor(), *h.current());
        assert_eq!(h.undo(), Some(&"S1"));
        assert_eq!(h.redo(), Some(&"S2"));
        assert_eq!((h.cursor(), *h.current()), before);
    }

    #[test]
    fn capture_after_undo_discards_redo_branch() {
        let mut h = History::new("S0");
        h.capture("S1");
        h.capture("S2");

        assert_eq!(h.undo(), Some(&"S1"));
        assert_eq!(h.cursor(), 1);

        h.capture("S3");
        assert_eq!(h.entries(), &["S0", "S1", "S3"]);
        assert_eq!(h.cursor(), 2);
        assert_eq!(h.redo(), None);
    }

    #[test]
    fn double_undo_then_capture() {
        let mut h = History::new('a');
        for c in ['b', 'c', 'd'] {
            h.capture(c);
        }
        h.undo();
        h.undo();
        let keep: Vec<char> = h.entries()[..=h.cursor()].to_vec();
        h.capture('x');

        let mut expected = keep;
        expected.push('x');
        assert_eq!(h.entries(), expected.as_slice());
    }

    #[test]
    fn predicates_follow_cursor_bounds() {
        let mut h = History::new(0);
        h.capture(1);
        h.capture(2);
        assert!(h.can_undo() && !h.can_redo());
        h.undo();
        assert!(h.can_undo() && h.can_redo());
        h.undo();
        assert!(!h.can_undo() && h.can_redo());
    }

    #[test]
    fn max_depth_trims_oldest() {
        let mut h = History::with_max_depth(0, 3);
        for i in 1..=5 {
            h.capture(i);
        }
        assert_eq!(h.entries(), &[3, 4, 5]);
        assert_eq!(h.cursor(), 2);

        let mut undo_count = 0;
        while h.undo().is_some() {
            undo_count += 1;
        }
        assert_eq!(undo_count, 2);
        assert_eq!(*h.current(), 3);
    }

    #[test]
    fn max_depth_of_zero_keeps_current() {
        let mut h = History::with_max_depth("a", 0);
        h.capture("b");
        assert_eq!(h.entries(), &["b"]);
        assert!(!h.can_undo());
    }
}
