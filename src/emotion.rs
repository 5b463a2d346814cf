//! Heuristic emotional read of a user message.
//!
//! Keyword vocabularies are checked in a fixed order (urgent, negative,
//! stress, excited, positive) and the first category with a hit wins.
//! Energy comes from punctuation and shouting cues. No I/O, never fails.

use crate::model::{Emotion, EmotionalContext, EnergyLevel};

const URGENT: &[&str] = &[
    "emergency",
    "panic",
    "panicking",
    "can't cope",
    "cant cope",
    "can't breathe",
    "hopeless",
    "desperate",
    "help me",
    "breaking down",
    "falling apart",
];

const NEGATIVE: &[&str] = &[
    "sad",
    "depressed",
    "lonely",
    "alone",
    "crying",
    "cried",
    "upset",
    "hurt",
    "miserable",
    "heartbroken",
    "awful",
    "terrible",
    "lost my",
    "miss them",
];

const STRESS: &[&str] = &[
    "stressed",
    "stress",
    "anxious",
    "anxiety",
    "worried",
    "nervous",
    "overwhelmed",
    "struggling",
    "frustrated",
];

const EXCITED: &[&str] = &[
    "can't wait",
    "cant wait",
    "so excited",
    "excited",
    "thrilled",
    "omg",
    "amazing",
    "awesome",
];

const POSITIVE: &[&str] = &[
    "happy",
    "glad",
    "great",
    "good day",
    "love",
    "proud",
    "grateful",
    "fun",
    "yay",
    "nice",
];

const LOW_ENERGY: &[&str] = &[
    "tired",
    "exhausted",
    "sleepy",
    "drained",
    "meh",
    "bored",
    "worn out",
];

/// Classify `text` into an emotion/energy/support tuple.
pub fn extract(text: &str) -> EmotionalContext {
    let lowered = text.to_lowercase();

    let categories: [(&[&str], Emotion, bool); 5] = [
        (URGENT, Emotion::Distressed, true),
        (NEGATIVE, Emotion::Sad, true),
        (STRESS, Emotion::Stressed, true),
        (EXCITED, Emotion::Excited, false),
        (POSITIVE, Emotion::Happy, false),
    ];

    let mut ctx = EmotionalContext::default();
    for (vocabulary, emotion, support_needed) in categories {
        let hits = count_hits(&lowered, vocabulary);
        if hits > 0 {
            ctx.emotion = emotion;
            ctx.support_needed = support_needed;
            ctx.intensity = (0.4 + 0.2 * hits as f32).min(1.0);
            break;
        }
    }

    ctx.energy_level = energy(text, &lowered, ctx.emotion);
    if ctx.energy_level == EnergyLevel::High && ctx.emotion != Emotion::Neutral {
        ctx.intensity = (ctx.intensity + 0.2).min(1.0);
    }
    ctx
}

fn energy(text: &str, lowered: &str, emotion: Emotion) -> EnergyLevel {
    let exclamations = text.matches('!').count();
    let shouted_words = text
        .split_whitespace()
        .filter(|w| {
            let letters: Vec<char> = w.chars().filter(|c| c.is_alphabetic()).collect();
            letters.len() >= 3 && letters.iter().all(|c| c.is_uppercase())
        })
        .count();

    if exclamations >= 2 || shouted_words >= 2 || emotion == Emotion::Excited {
        EnergyLevel::High
    } else if count_hits(lowered, LOW_ENERGY) > 0 || lowered.trim_end().ends_with("...") {
        EnergyLevel::Low
    } else {
        EnergyLevel::Medium
    }
}

/// Number of vocabulary entries present as whole words/phrases.
pub(crate) fn count_hits(lowered: &str, vocabulary: &[&str]) -> usize {
    vocabulary
        .iter()
        .filter(|needle| contains_phrase(lowered, needle))
        .count()
}

/// Whole-word containment: "fun" matches "so fun!" but not "funeral".
pub(crate) fn contains_phrase(haystack: &str, needle: &str) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '\'';
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before_ok = haystack[..start].chars().next_back().is_none_or(|c| !is_word(c));
        let after_ok = haystack[end..].chars().next().is_none_or(|c| !is_word(c));
        before_ok && after_ok
    })
}
