//! Note sequences: the per-player input buffer and the static pattern table.

use crate::models::unlocks::UnlockStore;
use serde::Deserialize;

pub const SEQUENCE_LEN: usize = 4;

/// One named melody. Loaded from static configuration, read-only afterwards.
#[derive(Clone, Debug, Deserialize)]
pub struct SequencePattern {
    pub name: String,
    pub notes: [u8; SEQUENCE_LEN],
    /// If set, the pattern is only honored once this unlock flag is true.
    #[serde(default)]
    pub unlock_key: Option<String>,
}

/// Ordered pattern list for one player. Duplicate note runs are a
/// configuration invariant, not enforced here.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct PatternTable {
    pub patterns: Vec<SequencePattern>,
}

impl PatternTable {
    pub fn new(patterns: Vec<SequencePattern>) -> Self {
        Self { patterns }
    }

    /// Scans in table order; first honored match wins. A matching pattern
    /// whose unlock flag is unset is skipped and scanning continues.
    pub fn find_match(&self, notes: &[u8; SEQUENCE_LEN], unlocks: &UnlockStore) -> Option<&SequencePattern> {
        self.patterns.iter().find(|p| {
            p.notes == *notes
                && p.unlock_key
                    .as_deref()
                    .is_none_or(|key| unlocks.is_unlocked(key))
        })
    }
}

/// Up to four note indices awaiting resolution. Owned exclusively by one
/// player's tracker.
#[derive(Clone, Debug, Default)]
pub struct NoteBuffer {
    notes: Vec<u8>,
    last_note_time: f64,
    locked: bool,
}

pub enum PushResult {
    /// Buffer locked, note dropped.
    Ignored,
    Added,
    /// Fourth note landed; snapshot ready for resolution.
    Complete([u8; SEQUENCE_LEN]),
}

impl NoteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, note: u8, now: f64) -> PushResult {
        if self.locked {
            return PushResult::Ignored;
        }

        self.last_note_time = now;
        self.notes.push(note);

        if self.notes.len() < SEQUENCE_LEN {
            return PushResult::Added;
        }

        self.locked = true;
        let mut snapshot = [0u8; SEQUENCE_LEN];
        snapshot.copy_from_slice(&self.notes);
        PushResult::Complete(snapshot)
    }

    /// True when a partially filled, unlocked buffer went stale.
    pub fn timed_out(&self, now: f64, timeout: f64) -> bool {
        !self.locked && !self.notes.is_empty() && now - self.last_note_time > timeout
    }

    pub fn clear(&mut self) {
        self.notes.clear();
        self.locked = false;
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PatternTable {
        PatternTable::new(vec![
            SequencePattern {
                name: "Jump".into(),
                notes: [0, 1, 2, 3],
                unlock_key: None,
            },
            SequencePattern {
                name: "Gravity".into(),
                notes: [3, 3, 1, 0],
                unlock_key: Some("Effect1Unlocked".into()),
            },
            SequencePattern {
                name: "GravityFallback".into(),
                notes: [3, 3, 1, 0],
                unlock_key: None,
            },
        ])
    }

    #[test]
    fn test_exact_ordered_match() {
        let unlocks = UnlockStore::in_memory();
        let t = table();
        assert_eq!(t.find_match(&[0, 1, 2, 3], &unlocks).unwrap().name, "Jump");
        assert!(t.find_match(&[0, 1, 2, 1], &unlocks).is_none());
        assert!(t.find_match(&[3, 2, 1, 0], &unlocks).is_none());
    }

    #[test]
    fn test_locked_pattern_is_skipped_scan_continues() {
        let mut unlocks = UnlockStore::in_memory();
        let t = table();

        // Gated entry comes first but is locked; scan falls through to the
        // later ungated entry with the same notes.
        let hit = t.find_match(&[3, 3, 1, 0], &unlocks).unwrap();
        assert_eq!(hit.name, "GravityFallback");

        unlocks.unlock("Effect1Unlocked");
        let hit = t.find_match(&[3, 3, 1, 0], &unlocks).unwrap();
        assert_eq!(hit.name, "Gravity");
    }

    #[test]
    fn test_buffer_locks_on_fourth_note() {
        let mut buf = NoteBuffer::new();
        assert!(matches!(buf.push(0, 0.0), PushResult::Added));
        assert!(matches!(buf.push(1, 0.1), PushResult::Added));
        assert!(matches!(buf.push(2, 0.2), PushResult::Added));
        match buf.push(3, 0.3) {
            PushResult::Complete(s) => assert_eq!(s, [0, 1, 2, 3]),
            _ => panic!("expected completion"),
        }
        assert!(buf.is_locked());
        assert!(matches!(buf.push(2, 0.4), PushResult::Ignored));
        assert_eq!(buf.len(), SEQUENCE_LEN);
    }

    #[test]
    fn test_timeout_only_for_partial_unlocked_buffers() {
        let mut buf = NoteBuffer::new();
        assert!(!buf.timed_out(100.0, 2.0)); // empty

        buf.push(1, 10.0);
        assert!(!buf.timed_out(11.9, 2.0));
        assert!(buf.timed_out(12.1, 2.0));

        buf.push(1, 12.0);
        buf.push(1, 12.1);
        buf.push(1, 12.2); // locks
        assert!(!buf.timed_out(100.0, 2.0));

        buf.clear();
        assert!(!buf.timed_out(100.0, 2.0));
        assert!(!buf.is_locked());
    }
}
