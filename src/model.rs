//! Core data model.
//!
//! A user's relationship with one catbot is summarized by a memory profile
//! plus a handful of open conversation threads. Both are keyed by the
//! (user, catbot) pair.

pub mod character;
pub mod chat;
pub mod memory;
pub mod thought;
pub mod thread;

use serde::{Deserialize, Serialize};

pub use character::Character;
pub use chat::{ChatMessage, ChatRequest, ChatResponse, Role};
pub use memory::*;
pub use thought::SpontaneousThought;
pub use thread::*;

/// Identity of the memory row a turn reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryKey {
    pub user_id: String,
    pub catbot_id: String,
}

impl MemoryKey {
    pub fn new(user_id: impl Into<String>, catbot_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            catbot_id: catbot_id.into(),
        }
    }
}

impl std::fmt::Display for MemoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.user_id, self.catbot_id)
    }
}

// ---------------------------------------------------------------------------
// Emotional signal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Distressed,
    Sad,
    Stressed,
    Happy,
    Excited,
    Neutral,
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Emotion::Distressed => "distressed",
            Emotion::Sad => "sad",
            Emotion::Stressed => "stressed",
            Emotion::Happy => "happy",
            Emotion::Excited => "excited",
            Emotion::Neutral => "neutral",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for EnergyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EnergyLevel::Low => "low",
            EnergyLevel::Medium => "medium",
            EnergyLevel::High => "high",
        };
        write!(f, "{s}")
    }
}

/// Per-turn emotional read of the user's message. Never persisted on its
/// own; it is folded into the profile's emotional history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionalContext {
    pub emotion: Emotion,
    pub energy_level: EnergyLevel,
    pub support_needed: bool,
    /// 0.0..=1.0, grows with the number of matching cues.
    pub intensity: f32,
}

impl Default for EmotionalContext {
    fn default() -> Self {
        Self {
            emotion: Emotion::Neutral,
            energy_level: EnergyLevel::Medium,
            support_needed: false,
            intensity: 0.0,
        }
    }
}
