//! Visual note bubbles mirroring the sequence buffer.
//!
//! The row is purely presentational: the host reads bubble offsets/alphas and
//! draws them. On resolution the bubbles fade out and survive the logical
//! decision until the delayed clear, which is deliberate.

use crate::shared::math::lerp;
use crate::shared::services::Services;

const MAX_BUBBLES: usize = 4;
const BUBBLE_SPACING: f32 = 0.45;

#[derive(Clone, Debug)]
pub struct NoteBubble {
    pub note: u8,
    pub offset_x: f32,
    pub alpha: f32,
    fade: Option<Fade>,
}

#[derive(Clone, Debug)]
struct Fade {
    duration: f32,
    elapsed: f32,
    start_alpha: f32,
}

#[derive(Clone, Debug, Default)]
pub struct BubbleRow {
    owner: String,
    bubbles: Vec<NoteBubble>,
}

impl BubbleRow {
    pub fn new(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            bubbles: Vec::new(),
        }
    }

    pub fn add_bubble(&mut self, note: u8) {
        if self.bubbles.len() >= MAX_BUBBLES {
            return;
        }
        self.bubbles.push(NoteBubble {
            note,
            offset_x: self.bubbles.len() as f32 * BUBBLE_SPACING,
            alpha: 1.0,
            fade: None,
        });
    }

    /// Plays the right/wrong row animation and starts the fade-outs.
    /// Returns the fade duration; the caller schedules the delayed clear.
    pub fn resolve(&mut self, matched: bool, services: &mut Services) -> f64 {
        let duration = if matched { 1.2 } else { 0.5 };

        let clip = if matched { "RightSequenceAnim" } else { "WrongSequenceAnim" };
        services.anim.play_clip(&self.owner, clip);

        for bubble in &mut self.bubbles {
            bubble.fade = Some(Fade {
                duration: duration as f32,
                elapsed: 0.0,
                start_alpha: bubble.alpha,
            });
        }
        duration
    }

    pub fn update(&mut self, dt: f32) {
        for bubble in &mut self.bubbles {
            if let Some(fade) = &mut bubble.fade {
                fade.elapsed += dt;
                bubble.alpha = lerp(fade.start_alpha, 0.0, fade.elapsed / fade.duration);
            }
        }
    }

    /// Timeout path: drop everything now, no fade.
    pub fn clear_immediate(&mut self) {
        self.bubbles.clear();
    }

    /// End of the deferred resolution fade.
    pub fn clear_resolved(&mut self) {
        self.bubbles.clear();
    }

    pub fn bubbles(&self) -> &[NoteBubble] {
        &self.bubbles
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_caps_at_four_and_spaces_evenly() {
        let mut row = BubbleRow::new("player1");
        for i in 0..6 {
            row.add_bubble(i % 4);
        }
        assert_eq!(row.bubbles().len(), 4);
        assert_eq!(row.bubbles()[0].offset_x, 0.0);
        assert!((row.bubbles()[3].offset_x - 3.0 * BUBBLE_SPACING).abs() < 1e-6);
    }

    #[test]
    fn test_resolve_fades_but_keeps_bubbles_until_clear() {
        let mut services = Services::null();
        let mut row = BubbleRow::new("player1");
        row.add_bubble(0);
        row.add_bubble(1);

        let duration = row.resolve(false, &mut services);
        assert_eq!(duration, 0.5);

        row.update(0.25);
        assert_eq!(row.bubbles().len(), 2);
        assert!((row.bubbles()[0].alpha - 0.5).abs() < 1e-5);

        row.update(0.5);
        assert_eq!(row.bubbles()[0].alpha, 0.0);
        assert_eq!(row.bubbles().len(), 2); // still visible slots

        row.clear_resolved();
        assert!(row.is_empty());
    }

    #[test]
    fn test_matched_fade_is_longer() {
        let mut services = Services::null();
        let mut row = BubbleRow::new("player2");
        row.add_bubble(2);
        assert_eq!(row.resolve(true, &mut services), 1.2);
    }
}
