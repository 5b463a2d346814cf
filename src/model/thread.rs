//! Conversation threads: open topics a catbot may follow up on later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MemoryKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextType {
    TopicThread,
    FollowUp,
}

impl ContextType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContextType::TopicThread => "topic_thread",
            ContextType::FollowUp => "follow_up",
        }
    }
}

impl std::str::FromStr for ContextType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "topic_thread" => Ok(ContextType::TopicThread),
            "follow_up" => Ok(ContextType::FollowUp),
            other => Err(format!("unknown context type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    Active,
    Resolved,
    Stale,
}

impl ThreadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ThreadStatus::Active => "active",
            ThreadStatus::Resolved => "resolved",
            ThreadStatus::Stale => "stale",
        }
    }
}

impl std::str::FromStr for ThreadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ThreadStatus::Active),
            "resolved" => Ok(ThreadStatus::Resolved),
            "stale" => Ok(ThreadStatus::Stale),
            other => Err(format!("unknown thread status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextData {
    pub description: String,
    /// The user utterance the thread was mined from.
    pub source_text: String,
}

/// A stored conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub id: Uuid,
    pub key: MemoryKey,
    pub context_type: ContextType,
    pub context_data: ContextData,
    /// Higher = more urgent.
    pub thread_priority: i32,
    /// Stored for future reactivation; nothing matches against these yet.
    pub revival_triggers: Vec<String>,
    pub status: ThreadStatus,
    pub last_referenced: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Parameters for creating a new thread.
#[derive(Debug, Clone)]
pub struct NewThread {
    pub key: MemoryKey,
    pub context_type: ContextType,
    pub context_data: ContextData,
    pub thread_priority: i32,
    pub revival_triggers: Vec<String>,
}

impl NewThread {
    /// Materialize as an active thread referenced `now`.
    pub fn into_thread(self, now: DateTime<Utc>) -> ConversationContext {
        ConversationContext {
            id: Uuid::new_v4(),
            key: self.key,
            context_type: self.context_type,
            context_data: self.context_data,
            thread_priority: self.thread_priority,
            revival_triggers: self.revival_triggers,
            status: ThreadStatus::Active,
            last_referenced: now,
            created_at: now,
        }
    }
}
