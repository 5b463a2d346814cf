//! Relationship memory: storage seam, merge rules, and the gateway the
//! chat pipeline talks to.

pub mod gateway;
pub mod in_memory;
pub mod merge;
pub mod store;

pub use gateway::MemoryGateway;
pub use in_memory::InMemoryStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::model::{
    ConversationContext, MemoryKey, NewThread, SpontaneousThought, UserMemoryProfile,
};

/// Persistence for profiles, threads, and the spontaneous thought catalog.
///
/// Implemented by [`crate::db::Db`] for Postgres and by [`InMemoryStore`]
/// for tests and local runs.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    async fn get_profile(&self, key: &MemoryKey) -> Result<Option<UserMemoryProfile>>;

    /// Insert or replace the profile row for `profile.key`.
    async fn save_profile(&self, profile: &UserMemoryProfile) -> Result<()>;

    /// Active threads for `key`, highest priority first.
    async fn active_threads(&self, key: &MemoryKey, limit: i64)
    -> Result<Vec<ConversationContext>>;

    async fn insert_threads(&self, threads: &[NewThread]) -> Result<()>;

    /// Thoughts for `personality` (case-insensitive) used fewer than
    /// `usage_limit` times.
    async fn thought_candidates(
        &self,
        personality: &str,
        usage_limit: i32,
    ) -> Result<Vec<SpontaneousThought>>;

    async fn record_thought_use(&self, id: Uuid) -> Result<()>;

    async fn insert_thought(&self, thought: &SpontaneousThought) -> Result<()>;
}
