//! Process-local [`MemoryStore`] for tests and database-less runs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::model::*;

use super::MemoryStore;

#[derive(Default)]
pub struct InMemoryStore {
    profiles: RwLock<HashMap<MemoryKey, UserMemoryProfile>>,
    threads: RwLock<Vec<ConversationContext>>,
    thoughts: RwLock<Vec<SpontaneousThought>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored thread for `key`, in insertion order.
    pub async fn all_threads(&self, key: &MemoryKey) -> Vec<ConversationContext> {
        self.threads
            .read()
            .await
            .iter()
            .filter(|t| &t.key == key)
            .cloned()
            .collect()
    }

    pub async fn thoughts(&self) -> Vec<SpontaneousThought> {
        self.thoughts.read().await.clone()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn get_profile(&self, key: &MemoryKey) -> Result<Option<UserMemoryProfile>> {
        Ok(self.profiles.read().await.get(key).cloned())
    }

    async fn save_profile(&self, profile: &UserMemoryProfile) -> Result<()> {
        let mut profiles = self.profiles.write().await;
        let mut profile = profile.clone();
        // Mirror the SQL upsert: depth never moves down.
        if let Some(previous) = profiles.get(&profile.key) {
            profile.relationship_depth = profile.relationship_depth.max(previous.relationship_depth);
            profile.created_at = previous.created_at;
        }
        profiles.insert(profile.key.clone(), profile);
        Ok(())
    }

    async fn active_threads(
        &self,
        key: &MemoryKey,
        limit: i64,
    ) -> Result<Vec<ConversationContext>> {
        let mut active: Vec<ConversationContext> = self
            .threads
            .read()
            .await
            .iter()
            .filter(|t| &t.key == key && t.status == ThreadStatus::Active)
            .cloned()
            .collect();
        active.sort_by(|a, b| {
            b.thread_priority
                .cmp(&a.thread_priority)
                .then(b.last_referenced.cmp(&a.last_referenced))
        });
        active.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(active)
    }

    async fn insert_threads(&self, threads: &[NewThread]) -> Result<()> {
        let now = Utc::now();
        self.threads
            .write()
            .await
            .extend(threads.iter().cloned().map(|t| t.into_thread(now)));
        Ok(())
    }

    async fn thought_candidates(
        &self,
        personality: &str,
        usage_limit: i32,
    ) -> Result<Vec<SpontaneousThought>> {
        Ok(self
            .thoughts
            .read()
            .await
            .iter()
            .filter(|t| {
                t.personality_match.eq_ignore_ascii_case(personality) && t.usage_count < usage_limit
            })
            .cloned()
            .collect())
    }

    async fn record_thought_use(&self, id: Uuid) -> Result<()> {
        if let Some(thought) = self.thoughts.write().await.iter_mut().find(|t| t.id == id) {
            thought.usage_count += 1;
        }
        Ok(())
    }

    async fn insert_thought(&self, thought: &SpontaneousThought) -> Result<()> {
        self.thoughts.write().await.push(thought.clone());
        Ok(())
    }
}
