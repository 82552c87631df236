//! Text pattern extraction: round markers, suit sections, and indicators.
//!
//! All functions are pure. A suit counts only in its emoji presentation
//! (base glyph followed by U+FE0F, as in `♠️`); the heavy heart `❤️` is folded
//! into `♥️`.

use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

/// Glyphs marking a message the source will edit again.
pub const PENDING_INDICATORS: &[&str] = &["⏰", "▶", "🕐", "➡️"];

/// Glyphs marking a finalized round message.
pub const COMPLETION_INDICATORS: &[&str] = &["✅", "🔰"];

/// A card suit. Variant order follows code point order of the canonical
/// glyphs, so sorted sets render in code point order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Spade,
    Club,
    Heart,
    Diamond,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Club, Suit::Heart, Suit::Diamond];

    /// Map a base glyph to a suit, normalizing `❤` to hearts. Callers decide
    /// whether the emoji variation selector is required.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '\u{2660}' => Some(Self::Spade),
            '\u{2663}' => Some(Self::Club),
            '\u{2665}' | '\u{2764}' => Some(Self::Heart),
            '\u{2666}' => Some(Self::Diamond),
            _ => None,
        }
    }

    /// Canonical emoji glyph (base symbol + U+FE0F).
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Spade => "\u{2660}\u{fe0f}",
            Self::Club => "\u{2663}\u{fe0f}",
            Self::Heart => "\u{2665}\u{fe0f}",
            Self::Diamond => "\u{2666}\u{fe0f}",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

fn re_round() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)#n(\d+)").expect("round marker regex"))
}

fn re_section() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^)]+)\)").expect("section regex"))
}

/// Extract the round number from a `#N<digits>` marker (case-insensitive).
pub fn extract_round_number(text: &str) -> Option<u64> {
    re_round()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Raw contents of every non-empty `(...)` span, left to right.
fn section_bodies(text: &str) -> impl Iterator<Item = &str> {
    re_section()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Suits in emoji presentation, in order of appearance. A bare glyph without
/// U+FE0F is text, not a card.
fn suits_in(body: &str) -> impl Iterator<Item = Suit> + '_ {
    let mut chars = body.chars().peekable();
    std::iter::from_fn(move || {
        while let Some(c) = chars.next() {
            if let Some(suit) = Suit::from_char(c) {
                if chars.next_if_eq(&'\u{fe0f}').is_some() {
                    return Some(suit);
                }
            }
        }
        None
    })
}

/// Distinct suits of each parenthesized section, in section order.
pub fn extract_parenthesized_sections(text: &str) -> Vec<BTreeSet<Suit>> {
    section_bodies(text)
        .map(|body| suits_in(body).collect())
        .collect()
}

/// Count every suit occurrence (duplicates included) in the first section.
pub fn count_symbols_in_first_section(text: &str) -> usize {
    section_bodies(text)
        .next()
        .map(|body| suits_in(body).count())
        .unwrap_or(0)
}

/// Whether the message carries an "in progress" glyph.
pub fn has_pending_indicator(text: &str) -> bool {
    PENDING_INDICATORS.iter().any(|g| text.contains(g))
}

/// Whether the message carries a "finalized" glyph.
pub fn has_completion_indicator(text: &str) -> bool {
    COMPLETION_INDICATORS.iter().any(|g| text.contains(g))
}

/// Everything the extractor can say about one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFeatures {
    pub round: Option<u64>,
    pub sections: Vec<BTreeSet<Suit>>,
    pub first_section_count: usize,
    pub pending: bool,
    pub completed: bool,
}

pub fn extract_features(text: &str) -> MessageFeatures {
    MessageFeatures {
        round: extract_round_number(text),
        sections: extract_parenthesized_sections(text),
        first_section_count: count_symbols_in_first_section(text),
        pending: has_pending_indicator(text),
        completed: has_completion_indicator(text),
    }
}

impl fmt::Display for MessageFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.round {
            Some(r) => writeln!(f, "round: {r}")?,
            None => writeln!(f, "round: none")?,
        }
        for (i, section) in self.sections.iter().enumerate() {
            let glyphs: String = section.iter().map(|s| s.glyph()).collect();
            writeln!(f, "section {i}: {glyphs} ({} distinct)", section.len())?;
        }
        writeln!(f, "first section symbols: {}", self.first_section_count)?;
        writeln!(f, "pending indicator: {}", self.pending)?;
        write!(f, "completion indicator: {}", self.completed)
    }
}
