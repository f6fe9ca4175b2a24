//! Sequence tracking and resolution.
//!
//! Accumulates notes into the buffer, and on the fourth note matches the
//! snapshot against the pattern table. Exactly one outcome fires per
//! completed sequence; the buffer then stays locked until the bubble fade
//! finishes, at which point it unlocks and clears.

use crate::logic::bubbles::BubbleRow;
use crate::models::effects::{ALL_PENALTIES, PenaltyKind};
use crate::models::sequence::{NoteBuffer, PatternTable, PushResult};
use crate::models::unlocks::UnlockStore;
use crate::shared::services::Services;
use rand::Rng;

/// Outcome of one completed 4-note sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Honored match; carries the pattern name to dispatch to the partner.
    Matched(String),
    Missed,
}

pub struct SequenceTracker {
    buffer: NoteBuffer,
    pub bubbles: BubbleRow,
    pending_clear_at: Option<f64>,
    timeout: f64,
}

impl SequenceTracker {
    pub fn new(owner: &str, timeout: f64) -> Self {
        Self {
            buffer: NoteBuffer::new(),
            bubbles: BubbleRow::new(owner),
            pending_clear_at: None,
            timeout,
        }
    }

    /// Feeds one note. Returns the resolution when this note completed a
    /// sequence; no-op while a resolution is still fading out.
    pub fn record_note(
        &mut self,
        note: u8,
        now: f64,
        table: &PatternTable,
        unlocks: &UnlockStore,
        services: &mut Services,
    ) -> Option<Resolution> {
        match self.buffer.push(note, now) {
            PushResult::Ignored => None,
            PushResult::Added => {
                self.bubbles.add_bubble(note);
                None
            }
            PushResult::Complete(snapshot) => {
                self.bubbles.add_bubble(note);

                let resolution = match table.find_match(&snapshot, unlocks) {
                    Some(pattern) => Resolution::Matched(pattern.name.clone()),
                    None => Resolution::Missed,
                };

                let matched = matches!(resolution, Resolution::Matched(_));
                let fade = self.bubbles.resolve(matched, services);
                self.pending_clear_at = Some(now + fade);

                log::info!(
                    "SEQUENCE: {:?} resolved as {:?}",
                    snapshot,
                    resolution
                );
                Some(resolution)
            }
        }
    }

    /// Per-frame upkeep: bubble fades, the deferred clear, the stale-buffer
    /// timeout. Timeout clearing has no resolution side effects.
    pub fn update(&mut self, now: f64, dt: f32) {
        self.bubbles.update(dt);

        if let Some(clear_at) = self.pending_clear_at {
            if now >= clear_at {
                self.pending_clear_at = None;
                self.bubbles.clear_resolved();
                self.buffer.clear();
            }
            return;
        }

        if self.buffer.timed_out(now, self.timeout) {
            self.buffer.clear();
            self.bubbles.clear_immediate();
        }
    }

    /// Teardown: forget any in-flight resolution.
    pub fn reset(&mut self) {
        self.pending_clear_at = None;
        self.buffer.clear();
        self.bubbles.clear_immediate();
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_locked(&self) -> bool {
        self.buffer.is_locked()
    }
}

/// Uniform pick over the penalty set; independent across calls, no
/// avoid-repeat policy.
pub fn pick_penalty<R: Rng + ?Sized>(rng: &mut R) -> PenaltyKind {
    ALL_PENALTIES[rng.random_range(0..ALL_PENALTIES.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sequence::SequencePattern;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn jump_table() -> PatternTable {
        PatternTable::new(vec![SequencePattern {
            name: "Jump".into(),
            notes: [0, 1, 2, 3],
            unlock_key: None,
        }])
    }

    fn feed(tracker: &mut SequenceTracker, notes: &[u8], now: f64) -> Option<Resolution> {
        let table = jump_table();
        let unlocks = UnlockStore::in_memory();
        let mut services = Services::null();
        let mut last = None;
        for (i, &n) in notes.iter().enumerate() {
            last = tracker.record_note(n, now + i as f64 * 0.1, &table, &unlocks, &mut services);
        }
        last
    }

    #[test]
    fn test_match_fires_exactly_once_and_defers_clear() {
        let mut tracker = SequenceTracker::new("player1", 2.0);
        let res = feed(&mut tracker, &[0, 1, 2, 3], 0.0);
        assert_eq!(res, Some(Resolution::Matched("Jump".into())));
        assert!(tracker.is_locked());

        // Notes during the fade are dropped.
        let res = feed(&mut tracker, &[0], 0.5);
        assert_eq!(res, None);
        assert_eq!(tracker.buffer_len(), 4);

        // Matched fade is 1.2s from the last note (t=0.3).
        tracker.update(1.0, 0.016);
        assert!(tracker.is_locked());
        tracker.update(1.6, 0.016);
        assert!(!tracker.is_locked());
        assert_eq!(tracker.buffer_len(), 0);
        assert!(tracker.bubbles.is_empty());
    }

    #[test]
    fn test_mismatch_resolves_missed() {
        let mut tracker = SequenceTracker::new("player1", 2.0);
        let res = feed(&mut tracker, &[0, 1, 2, 1], 0.0);
        assert_eq!(res, Some(Resolution::Missed));
    }

    #[test]
    fn test_partial_buffer_times_out_without_resolution() {
        let mut tracker = SequenceTracker::new("player1", 2.0);
        let res = feed(&mut tracker, &[0, 1, 2], 0.0);
        assert_eq!(res, None);
        assert_eq!(tracker.buffer_len(), 3);

        tracker.update(1.0, 0.016);
        assert_eq!(tracker.buffer_len(), 3);

        // Last note at t=0.2; timeout is 2s sliding from there.
        tracker.update(2.3, 0.016);
        assert_eq!(tracker.buffer_len(), 0);
        assert!(tracker.bubbles.is_empty());
        assert!(!tracker.is_locked());
    }

    #[test]
    fn test_penalty_pick_covers_the_set() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = [false; ALL_PENALTIES.len()];
        for _ in 0..200 {
            let p = pick_penalty(&mut rng);
            let idx = ALL_PENALTIES.iter().position(|&x| x == p).unwrap();
            seen[idx] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
