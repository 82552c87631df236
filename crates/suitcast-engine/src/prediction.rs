//! The prediction record and its rendered status line.

use crate::generator::Combination;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Destination chat id → delivered message id.
pub type DeliveryMap = BTreeMap<i64, i64>;

/// Prediction lifecycle. `Pending` moves exactly once to a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Pending,
    /// Confirmed `offset` rounds after the predicted round (0..=3).
    Correct { offset: u8 },
    Failed,
}

impl Status {
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Status glyph as shown in the channel.
    pub fn glyph(self) -> String {
        match self {
            Self::Pending => "⏳".to_string(),
            // Digit + U+FE0F + U+20E3 renders as a keycap (0️⃣..3️⃣).
            Self::Correct { offset } => format!("✅{offset}\u{fe0f}\u{20e3}"),
            Self::Failed => "⭕⭕".to_string(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Correct { .. } => "correct",
            Self::Failed => "failed",
        }
    }
}

/// Render the status line for `round`.
pub fn render(round: u64, status: Status) -> String {
    format!("🔵{round} 🔵3K: statut :{}", status.glyph())
}

/// One outstanding or concluded prediction.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// The round being predicted (`source_round + 1`).
    pub round_number: u64,
    pub source_round: u64,
    pub combination: Combination,
    pub status: Status,
    pub rendered_text: String,
    pub destinations: DeliveryMap,
    pub created_at: DateTime<Utc>,
}

impl Prediction {
    /// A fresh pending prediction for the round after `source_round`.
    /// `None` when `source_round` has no successor.
    pub fn pending(source_round: u64, combination: Combination) -> Option<Self> {
        let round_number = source_round.checked_add(1)?;
        Some(Self {
            round_number,
            source_round,
            combination,
            status: Status::Pending,
            rendered_text: render(round_number, Status::Pending),
            destinations: DeliveryMap::new(),
            created_at: Utc::now(),
        })
    }

    /// Round delta at which this prediction was confirmed, if it was.
    pub fn verification_offset(&self) -> Option<u8> {
        match self.status {
            Status::Correct { offset } => Some(offset),
            _ => None,
        }
    }

    /// Move a pending prediction to a terminal status and re-render it.
    /// Returns the previous rendered text, or `None` if already concluded.
    pub(crate) fn conclude(&mut self, status: Status) -> Option<String> {
        if !self.status.is_pending() || status.is_pending() {
            return None;
        }
        self.status = status;
        let new_text = render(self.round_number, status);
        Some(std::mem::replace(&mut self.rendered_text, new_text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Suit;

    fn combo() -> Combination {
        Combination::from_iter([Suit::Spade, Suit::Heart, Suit::Diamond])
    }

    #[test]
    fn test_render_templates() {
        assert_eq!(render(745, Status::Pending), "🔵745 🔵3K: statut :⏳");
        assert_eq!(
            render(745, Status::Correct { offset: 0 }),
            "🔵745 🔵3K: statut :✅0️⃣"
        );
        assert_eq!(
            render(745, Status::Correct { offset: 3 }),
            "🔵745 🔵3K: statut :✅3️⃣"
        );
        assert_eq!(render(745, Status::Failed), "🔵745 🔵3K: statut :⭕⭕");
    }

    #[test]
    fn test_pending_prediction_targets_next_round() {
        let p = Prediction::pending(744, combo()).unwrap();
        assert_eq!(p.round_number, 745);
        assert_eq!(p.source_round, 744);
        assert!(p.status.is_pending());
        assert_eq!(p.rendered_text, "🔵745 🔵3K: statut :⏳");
        assert!(p.destinations.is_empty());
        assert_eq!(p.verification_offset(), None);
    }

    #[test]
    fn test_pending_prediction_after_last_round_is_none() {
        assert!(Prediction::pending(u64::MAX, combo()).is_none());
        let p = Prediction::pending(u64::MAX - 1, combo()).unwrap();
        assert_eq!(p.round_number, u64::MAX);
    }

    #[test]
    fn test_conclude_is_one_way() {
        let mut p = Prediction::pending(10, combo()).unwrap();
        let old = p.conclude(Status::Correct { offset: 2 });
        assert_eq!(old.as_deref(), Some("🔵11 🔵3K: statut :⏳"));
        assert_eq!(p.verification_offset(), Some(2));
        assert_eq!(p.rendered_text, "🔵11 🔵3K: statut :✅2️⃣");

        assert!(p.conclude(Status::Failed).is_none());
        assert_eq!(p.status, Status::Correct { offset: 2 });
    }

    #[test]
    fn test_conclude_rejects_pending_target() {
        let mut p = Prediction::pending(10, combo()).unwrap();
        assert!(p.conclude(Status::Pending).is_none());
        assert!(p.status.is_pending());
    }
}
