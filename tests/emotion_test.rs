//! Tests for the heuristic emotional signal extractor.

use catbot_rs::emotion::extract;
use catbot_rs::model::{Emotion, EnergyLevel};

#[test]
fn greeting_is_neutral_medium_without_support() {
    let ctx = extract("hello");
    assert_eq!(ctx.emotion, Emotion::Neutral);
    assert_eq!(ctx.energy_level, EnergyLevel::Medium);
    assert!(!ctx.support_needed);
}

#[test]
fn urgent_vocabulary_wins_over_positive() {
    // "love" is positive, but urgent cues are checked first.
    let ctx = extract("I love my cat but I'm panicking, I can't cope anymore");
    assert_eq!(ctx.emotion, Emotion::Distressed);
    assert!(ctx.support_needed);
}

#[test]
fn negative_message_needs_support() {
    let ctx = extract("I've been feeling really lonely lately");
    assert_eq!(ctx.emotion, Emotion::Sad);
    assert!(ctx.support_needed);
}

#[test]
fn stress_is_detected() {
    let ctx = extract("I love painting and I'm stressed about work");
    assert_eq!(ctx.emotion, Emotion::Stressed);
    assert!(ctx.support_needed);
}

#[test]
fn excitement_means_high_energy() {
    let ctx = extract("I got the tickets, I'm so excited");
    assert_eq!(ctx.emotion, Emotion::Excited);
    assert_eq!(ctx.energy_level, EnergyLevel::High);
    assert!(!ctx.support_needed);
}

#[test]
fn exclamations_and_shouting_raise_energy() {
    assert_eq!(extract("guess what!! guess what!!").energy_level, EnergyLevel::High);
    assert_eq!(extract("THIS IS HUGE news").energy_level, EnergyLevel::High);
}

#[test]
fn tiredness_lowers_energy() {
    assert_eq!(extract("just so tired today").energy_level, EnergyLevel::Low);
    assert_eq!(extract("well...").energy_level, EnergyLevel::Low);
}

#[test]
fn keywords_match_whole_words_only() {
    // "fun" must not fire inside "funeral".
    let ctx = extract("we went to the funeral");
    assert_eq!(ctx.emotion, Emotion::Neutral);
}

#[test]
fn any_input_yields_a_well_formed_tuple() {
    let long = "a".repeat(10_000);
    let inputs = ["", "   ", "!!!", "😿😿😿", "ÀÉÎ ÕÜ", "...", long.as_str()];
    for input in inputs {
        let ctx = extract(input);
        assert!((0.0..=1.0).contains(&ctx.intensity), "intensity out of range for {input:?}");
        if ctx.emotion == Emotion::Neutral {
            assert!(!ctx.support_needed);
        }
    }
}
