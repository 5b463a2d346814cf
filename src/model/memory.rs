//! Long-term relationship memory for one (user, catbot) pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Emotion, EmotionalContext, EnergyLevel, MemoryKey};

pub const MIN_RELATIONSHIP_DEPTH: i32 = 1;
pub const MAX_RELATIONSHIP_DEPTH: i32 = 10;
pub const EMOTIONAL_HISTORY_LIMIT: usize = 10;

/// Accumulated memory of a user, as seen by one catbot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMemoryProfile {
    pub key: MemoryKey,
    /// 1..=10, never decreases.
    pub relationship_depth: i32,
    /// Case-insensitively unique, append-only.
    pub interests: Vec<String>,
    /// Traits observed about the user. Same shape as `interests`.
    pub personality_traits: Vec<String>,
    pub mentioned_problems: Vec<MentionedProblem>,
    pub important_events: Vec<ImportantEvent>,
    pub current_emotional_state: Option<EmotionalState>,
    /// Oldest first, at most [`EMOTIONAL_HISTORY_LIMIT`] entries.
    pub emotional_history: Vec<EmotionalSnapshot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserMemoryProfile {
    pub fn new(key: MemoryKey, now: DateTime<Utc>) -> Self {
        Self {
            key,
            relationship_depth: MIN_RELATIONSHIP_DEPTH,
            interests: Vec::new(),
            personality_traits: Vec::new(),
            mentioned_problems: Vec::new(),
            important_events: Vec::new(),
            current_emotional_state: None,
            emotional_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Problems the user hasn't told us are resolved yet.
    pub fn open_problems(&self) -> impl Iterator<Item = &MentionedProblem> {
        self.mentioned_problems
            .iter()
            .filter(|p| p.status == ProblemStatus::Open)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemStatus {
    Open,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionedProblem {
    pub description: String,
    pub urgency: Urgency,
    pub status: ProblemStatus,
    pub mentioned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    Minor,
    Major,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportantEvent {
    pub event: String,
    pub significance: Significance,
    pub mentioned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionalState {
    pub emotion: Emotion,
    pub intensity: f32,
    pub energy: EnergyLevel,
}

/// One entry of the emotional history ring buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionalSnapshot {
    pub emotion: Emotion,
    pub energy: EnergyLevel,
    pub support_needed: bool,
    pub recorded_at: DateTime<Utc>,
}

impl EmotionalSnapshot {
    pub fn from_context(ctx: &EmotionalContext, now: DateTime<Utc>) -> Self {
        Self {
            emotion: ctx.emotion,
            energy: ctx.energy_level,
            support_needed: ctx.support_needed,
            recorded_at: now,
        }
    }
}
