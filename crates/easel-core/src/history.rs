//! Linear undo/redo log of serialized scene snapshots.

/// Maximum number of snapshots kept by default.
pub const MAX_HISTORY: usize = 50;

/// Snapshot log with a cursor at the snapshot matching the live scene.
///
/// Recording is suppressed while a snapshot is being replayed, while a text
/// object is being edited and while a saved document is being restored.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
    limit: usize,
    replaying: bool,
    editing_text: bool,
    restoring: bool,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(MAX_HISTORY)
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// History retaining at most `limit` snapshots (at least one).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            limit: limit.max(1),
            replaying: false,
            editing_text: false,
            restoring: false,
        }
    }

    /// Append a snapshot after the cursor, discarding any redo entries.
    ///
    /// Returns false when recording is suppressed.
    pub fn record(&mut self, snapshot: String) -> bool {
        if self.is_suppressed() {
            log::trace!("History capture suppressed");
            return false;
        }
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(snapshot);
        if self.entries.len() > self.limit {
            self.entries.remove(0);
        }
        self.cursor = self.entries.len() - 1;
        true
    }

    /// Move the cursor back and return the snapshot to load.
    pub fn step_back(&mut self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).map(String::as_str)
    }

    /// Move the cursor forward and return the snapshot to load.
    pub fn step_forward(&mut self) -> Option<&str> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor).map(String::as_str)
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Snapshot at the cursor.
    pub fn current(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(String::as_str)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    pub fn is_suppressed(&self) -> bool {
        self.replaying || self.editing_text || self.restoring
    }

    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    pub fn set_replaying(&mut self, replaying: bool) {
        self.replaying = replaying;
    }

    pub fn is_editing_text(&self) -> bool {
        self.editing_text
    }

    pub fn set_editing_text(&mut self, editing: bool) {
        self.editing_text = editing;
    }

    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    pub fn set_restoring(&mut self, restoring: bool) {
        self.restoring = restoring;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(n: usize) -> History {
        let mut history = History::new();
        for i in 0..n {
            history.record(i.to_string());
        }
        history
    }

    #[test]
    fn test_cap_drops_oldest() {
        let history = filled(60);
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history.entries()[0], "10");
        assert_eq!(history.current(), Some("59"));
    }

    #[test]
    fn test_undo_redo_walks_cursor() {
        let mut history = filled(3);
        assert!(!history.can_redo());
        assert_eq!(history.step_back(), Some("1"));
        assert_eq!(history.step_back(), Some("0"));
        assert_eq!(history.step_back(), None);
        assert_eq!(history.cursor(), 0);
        assert_eq!(history.step_forward(), Some("1"));
        assert_eq!(history.step_forward(), Some("2"));
        assert_eq!(history.step_forward(), None);
    }

    #[test]
    fn test_record_after_undo_truncates_future() {
        let mut history = filled(3);
        history.step_back();
        history.step_back();
        history.record("x".into());
        assert_eq!(history.entries(), ["0", "x"]);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_history_is_inert() {
        let mut history = History::new();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.step_back(), None);
        assert_eq!(history.step_forward(), None);
        assert_eq!(history.current(), None);
    }

    #[test]
    fn test_each_flag_suppresses() {
        let mut history = History::new();
        history.set_replaying(true);
        assert!(!history.record("a".into()));
        history.set_replaying(false);
        history.set_editing_text(true);
        assert!(!history.record("b".into()));
        history.set_editing_text(false);
        history.set_restoring(true);
        assert!(!history.record("c".into()));
        history.set_restoring(false);
        assert!(history.record("d".into()));
        assert_eq!(history.entries(), ["d"]);
    }

    #[test]
    fn test_limit_is_at_least_one() {
        let mut history = History::with_limit(0);
        history.record("a".into());
        history.record("b".into());
        assert_eq!(history.entries(), ["b"]);
    }
}
