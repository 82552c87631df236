//! Windowed verification of pending predictions.

use crate::extract::{
    count_symbols_in_first_section, extract_round_number, has_completion_indicator,
};
use crate::prediction::Status;
use crate::{Engine, MIN_CONFIRMING_SYMBOLS, VERIFICATION_WINDOW};
use tracing::{debug, info};

/// A prediction that just left the pending state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub round_number: u64,
    pub status: Status,
    pub new_rendered_text: String,
    pub old_rendered_text: String,
}

impl Engine {
    /// Resolve at most one pending prediction against `text`.
    ///
    /// Pending predictions are scanned in ascending round order. Inside the
    /// window an edited, finalized message with enough first-section symbols
    /// confirms the prediction; a near miss moves on to the next one. Past
    /// the window the prediction fails. Scanning stops at the first
    /// resolution.
    pub fn resolve(&mut self, text: &str, is_edited: bool) -> Option<Resolution> {
        let current = extract_round_number(text)?;
        let confirmable = is_edited && has_completion_indicator(text);
        let count = count_symbols_in_first_section(text);

        for round in self.store.pending_rounds() {
            let Some(offset) = current.checked_sub(round) else {
                continue;
            };

            let status = if offset <= VERIFICATION_WINDOW {
                if !confirmable || count < MIN_CONFIRMING_SYMBOLS {
                    debug!("round {round}: offset {offset} not confirmed (count={count})");
                    continue;
                }
                // offset <= 3, fits in u8
                Status::Correct { offset: offset as u8 }
            } else {
                Status::Failed
            };

            let prediction = self.store.get_mut(round)?;
            let old_rendered_text = prediction.conclude(status)?;
            info!(
                "round {round}: {} at round {current} (offset {offset})",
                status.label()
            );
            return Some(Resolution {
                round_number: round,
                status,
                new_rendered_text: prediction.rendered_text.clone(),
                old_rendered_text,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Combination, Suit};

    fn engine_with(source_rounds: &[u64]) -> Engine {
        let mut engine = Engine::new();
        for &r in source_rounds {
            let combo = Combination::from_iter([Suit::Spade, Suit::Heart, Suit::Diamond]);
            engine.make_prediction(r, combo).unwrap();
        }
        engine
    }

    #[test]
    fn test_resolve_no_round() {
        let mut engine = engine_with(&[744]);
        assert!(engine.resolve("(♠️♥️♦️) ✅", true).is_none());
    }

    #[test]
    fn test_resolve_before_window_skips() {
        let mut engine = engine_with(&[744]);
        assert!(engine.resolve("#n744 (♠️♥️♦️) ✅", true).is_none());
        assert!(engine.store().has_pending(745));
    }

    #[test]
    fn test_resolve_correct_at_each_offset() {
        for offset in 0..=3u64 {
            let mut engine = engine_with(&[744]);
            let text = format!("#n{} (♠️♣️♦️) ✅", 745 + offset);
            let res = engine.resolve(&text, true).unwrap();
            assert_eq!(res.round_number, 745);
            assert_eq!(res.status, Status::Correct { offset: offset as u8 });
            assert_eq!(
                engine.store().get(745).unwrap().verification_offset(),
                Some(offset as u8)
            );
        }
    }

    #[test]
    fn test_resolve_failed_past_window() {
        let mut engine = engine_with(&[744]);
        let res = engine.resolve("#n760", false).unwrap();
        assert_eq!(res.status, Status::Failed);
        assert_eq!(res.new_rendered_text, "🔵745 🔵3K: statut :⭕⭕");
        assert_eq!(res.old_rendered_text, "🔵745 🔵3K: statut :⏳");
    }

    #[test]
    fn test_resolve_needs_edit_and_completion() {
        let mut engine = engine_with(&[744]);
        assert!(engine.resolve("#n745 (♠️♣️♦️) ✅", false).is_none());
        assert!(engine.resolve("#n745 (♠️♣️♦️) ⏰", true).is_none());
        assert!(engine.store().has_pending(745));
    }

    #[test]
    fn test_near_miss_keeps_every_candidate_pending() {
        let mut engine = engine_with(&[744, 745]);
        assert!(engine.resolve("#n746 (♠️♦️) ✅", true).is_none());
        assert_eq!(engine.store().pending_rounds(), vec![745, 746]);
    }

    #[test]
    fn test_failure_resolves_lowest_first() {
        let mut engine = engine_with(&[740, 744]);
        let res = engine.resolve("#n745 (♠️♦️) ✅", true).unwrap();
        assert_eq!(res.round_number, 741);
        assert_eq!(res.status, Status::Failed);
        assert!(engine.store().has_pending(745));
    }
}
