//! Predictive trigger: decide whether a round message yields a prediction
//! for the next round, then record it.

use crate::extract::{extract_parenthesized_sections, extract_round_number, Suit};
use crate::prediction::Prediction;
use crate::store::FINGERPRINT_RETENTION_ROUNDS;
use crate::Engine;
use std::collections::BTreeSet;
use std::fmt;
use suitcast_core::error::SuitcastError;
use tracing::{debug, info};

/// Number of distinct suits the first section must show to trigger.
pub const TRIGGER_DISTINCT_SUITS: usize = 3;

/// A set of distinct suits, displayed as glyphs in code point order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Combination(BTreeSet<Suit>);

impl Combination {
    pub fn new(suits: BTreeSet<Suit>) -> Self {
        Self(suits)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn suits(&self) -> impl Iterator<Item = Suit> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Suit> for Combination {
    fn from_iter<I: IntoIterator<Item = Suit>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for suit in &self.0 {
            f.write_str(suit.glyph())?;
        }
        Ok(())
    }
}

/// Why a message did not trigger a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No `#N<digits>` marker.
    NoRound,
    /// A pending prediction already targets the next round.
    DuplicateTarget,
    /// No parenthesized section.
    NoSections,
    /// First section lacks three distinct suits, or the second also has three.
    PatternMismatch,
    /// The exact text already triggered a prediction.
    AlreadySeen,
    /// The round marker is the largest representable round.
    NoNextRound,
    /// The target round lies behind the trigger history window.
    Stale,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoRound => "no round marker",
            Self::DuplicateTarget => "target round already pending",
            Self::NoSections => "no parenthesized section",
            Self::PatternMismatch => "suit pattern does not match",
            Self::AlreadySeen => "message already triggered",
            Self::NoNextRound => "round has no successor",
            Self::Stale => "target round already passed",
        };
        f.write_str(s)
    }
}

/// Outcome of [`Engine::should_predict`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Predict {
        source_round: u64,
        combination: Combination,
    },
    Skip(SkipReason),
}

impl Verdict {
    pub fn is_predict(&self) -> bool {
        matches!(self, Self::Predict { .. })
    }
}

impl Engine {
    /// Evaluate `text` against the trigger rule.
    ///
    /// Fires when the first section holds exactly three distinct suits and
    /// the second section (if any) does not. A positive verdict records the
    /// text's fingerprint, so the same text never fires twice.
    pub fn should_predict(&mut self, text: &str) -> Verdict {
        let Some(round) = extract_round_number(text) else {
            return Verdict::Skip(SkipReason::NoRound);
        };

        let Some(target) = round.checked_add(1) else {
            debug!("round {round}: no next round to predict");
            return Verdict::Skip(SkipReason::NoNextRound);
        };
        if target.saturating_add(FINGERPRINT_RETENTION_ROUNDS) < self.fingerprints.newest_round() {
            debug!("round {round}: target {target} is behind the trigger window");
            return Verdict::Skip(SkipReason::Stale);
        }
        if self.store.has_pending(target) {
            debug!("round {round}: prediction for {target} already pending");
            return Verdict::Skip(SkipReason::DuplicateTarget);
        }

        let mut sections = extract_parenthesized_sections(text).into_iter();
        let Some(first) = sections.next() else {
            return Verdict::Skip(SkipReason::NoSections);
        };
        let second_len = sections.next().map_or(0, |s| s.len());

        if first.len() != TRIGGER_DISTINCT_SUITS || second_len == TRIGGER_DISTINCT_SUITS {
            debug!(
                "round {round}: no trigger (first={}, second={second_len})",
                first.len()
            );
            return Verdict::Skip(SkipReason::PatternMismatch);
        }

        if !self.fingerprints.insert(text, round) {
            debug!("round {round}: duplicate trigger text suppressed");
            return Verdict::Skip(SkipReason::AlreadySeen);
        }

        let combination = Combination::new(first);
        info!("round {round}: trigger fired with {combination}");
        Verdict::Predict {
            source_round: round,
            combination,
        }
    }

    /// Store a pending prediction for the round after `source_round` and
    /// return the predicted round with its rendered text for dispatch.
    pub fn make_prediction(
        &mut self,
        source_round: u64,
        combination: Combination,
    ) -> Result<(u64, String), SuitcastError> {
        let prediction = Prediction::pending(source_round, combination).ok_or_else(|| {
            SuitcastError::Engine(format!("round {source_round} has no next round"))
        })?;
        let text = prediction.rendered_text.clone();
        let round = prediction.round_number;
        self.store.insert(prediction)?;
        info!("prediction stored for round {round}");
        Ok((round, text))
    }
}
