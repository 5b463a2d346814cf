//! Postgres-backed [`MemoryStore`]: profiles, threads, and thoughts.

use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use crate::db::Db;
use crate::error::{Error, Result};
use crate::model::*;

use super::MemoryStore;

#[async_trait]
impl MemoryStore for Db {
    async fn get_profile(&self, key: &MemoryKey) -> Result<Option<UserMemoryProfile>> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT user_id, catbot_id, relationship_depth, interests, personality_traits,
                    mentioned_problems, important_events, current_emotional_state,
                    emotional_history, created_at, updated_at
             FROM user_memory_profiles
             WHERE user_id = $1 AND catbot_id = $2",
        )
        .bind(&key.user_id)
        .bind(&key.catbot_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(UserMemoryProfile::from))
    }

    async fn save_profile(&self, profile: &UserMemoryProfile) -> Result<()> {
        // GREATEST keeps depth monotonic even if two merges race.
        sqlx::query(
            "INSERT INTO user_memory_profiles (user_id, catbot_id, relationship_depth, interests,
                    personality_traits, mentioned_problems, important_events,
                    current_emotional_state, emotional_history, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             ON CONFLICT (user_id, catbot_id) DO UPDATE SET
                relationship_depth = GREATEST(user_memory_profiles.relationship_depth,
                                              EXCLUDED.relationship_depth),
                interests = EXCLUDED.interests,
                personality_traits = EXCLUDED.personality_traits,
                mentioned_problems = EXCLUDED.mentioned_problems,
                important_events = EXCLUDED.important_events,
                current_emotional_state = EXCLUDED.current_emotional_state,
                emotional_history = EXCLUDED.emotional_history,
                updated_at = EXCLUDED.updated_at",
        )
        .bind(&profile.key.user_id)
        .bind(&profile.key.catbot_id)
        .bind(profile.relationship_depth)
        .bind(Json(&profile.interests))
        .bind(Json(&profile.personality_traits))
        .bind(Json(&profile.mentioned_problems))
        .bind(Json(&profile.important_events))
        .bind(profile.current_emotional_state.as_ref().map(Json))
        .bind(Json(&profile.emotional_history))
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn active_threads(
        &self,
        key: &MemoryKey,
        limit: i64,
    ) -> Result<Vec<ConversationContext>> {
        let rows: Vec<ThreadRow> = sqlx::query_as(
            "SELECT id, user_id, catbot_id, context_type, context_data, thread_priority,
                    revival_triggers, status, last_referenced, created_at
             FROM conversation_contexts
             WHERE user_id = $1 AND catbot_id = $2 AND status = 'active'
             ORDER BY thread_priority DESC, last_referenced DESC
             LIMIT $3",
        )
        .bind(&key.user_id)
        .bind(&key.catbot_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(ConversationContext::try_from).collect()
    }

    async fn insert_threads(&self, threads: &[NewThread]) -> Result<()> {
        let mut tx = self.pool().begin().await?;
        for thread in threads {
            sqlx::query(
                "INSERT INTO conversation_contexts (id, user_id, catbot_id, context_type,
                        context_data, thread_priority, revival_triggers, status)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, 'active')",
            )
            .bind(Uuid::new_v4())
            .bind(&thread.key.user_id)
            .bind(&thread.key.catbot_id)
            .bind(thread.context_type.as_str())
            .bind(Json(&thread.context_data))
            .bind(thread.thread_priority)
            .bind(Json(&thread.revival_triggers))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn thought_candidates(
        &self,
        personality: &str,
        usage_limit: i32,
    ) -> Result<Vec<SpontaneousThought>> {
        let rows: Vec<ThoughtRow> = sqlx::query_as(
            "SELECT id, thought_content, personality_match, thought_category, usage_count
             FROM spontaneous_thoughts
             WHERE lower(personality_match) = lower($1) AND usage_count < $2",
        )
        .bind(personality)
        .bind(usage_limit)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(SpontaneousThought::from).collect())
    }

    async fn record_thought_use(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE spontaneous_thoughts SET usage_count = usage_count + 1 WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn insert_thought(&self, thought: &SpontaneousThought) -> Result<()> {
        sqlx::query(
            "INSERT INTO spontaneous_thoughts (id, thought_content, personality_match,
                    thought_category, usage_count)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(thought.id)
        .bind(&thought.thought_content)
        .bind(&thought.personality_match)
        .bind(&thought.thought_category)
        .bind(thought.usage_count)
        .execute(self.pool())
        .await?;
        Ok(())
    }
}

impl Db {
    /// Whole thought catalog, optionally narrowed to one personality.
    pub async fn list_thoughts(&self, personality: Option<&str>) -> Result<Vec<SpontaneousThought>> {
        let rows: Vec<ThoughtRow> = sqlx::query_as(
            "SELECT id, thought_content, personality_match, thought_category, usage_count
             FROM spontaneous_thoughts
             WHERE ($1::text IS NULL OR lower(personality_match) = lower($1))
             ORDER BY personality_match, usage_count, created_at",
        )
        .bind(personality)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(SpontaneousThought::from).collect())
    }
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(sqlx::FromRow)]
struct ProfileRow {
    user_id: String,
    catbot_id: String,
    relationship_depth: i32,
    interests: Json<Vec<String>>,
    personality_traits: Json<Vec<String>>,
    mentioned_problems: Json<Vec<MentionedProblem>>,
    important_events: Json<Vec<ImportantEvent>>,
    current_emotional_state: Option<Json<EmotionalState>>,
    emotional_history: Json<Vec<EmotionalSnapshot>>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ProfileRow> for UserMemoryProfile {
    fn from(row: ProfileRow) -> Self {
        Self {
            key: MemoryKey::new(row.user_id, row.catbot_id),
            relationship_depth: row.relationship_depth,
            interests: row.interests.0,
            personality_traits: row.personality_traits.0,
            mentioned_problems: row.mentioned_problems.0,
            important_events: row.important_events.0,
            current_emotional_state: row.current_emotional_state.map(|j| j.0),
            emotional_history: row.emotional_history.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ThreadRow {
    id: Uuid,
    user_id: String,
    catbot_id: String,
    context_type: String,
    context_data: Json<ContextData>,
    thread_priority: i32,
    revival_triggers: Json<Vec<String>>,
    status: String,
    last_referenced: chrono::DateTime<chrono::Utc>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<ThreadRow> for ConversationContext {
    type Error = Error;

    fn try_from(row: ThreadRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            key: MemoryKey::new(row.user_id, row.catbot_id),
            context_type: row.context_type.parse().map_err(Error::Other)?,
            context_data: row.context_data.0,
            thread_priority: row.thread_priority,
            revival_triggers: row.revival_triggers.0,
            status: row.status.parse().map_err(Error::Other)?,
            last_referenced: row.last_referenced,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ThoughtRow {
    id: Uuid,
    thought_content: String,
    personality_match: String,
    thought_category: String,
    usage_count: i32,
}

impl From<ThoughtRow> for SpontaneousThought {
    fn from(row: ThoughtRow) -> Self {
        Self {
            id: row.id,
            thought_content: row.thought_content,
            personality_match: row.personality_match,
            thought_category: row.thought_category,
            usage_count: row.usage_count,
        }
    }
}
