//! Shared fakes for integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use catbot_rs::character::InMemoryCharacterStore;
use catbot_rs::chat::{ChatDeps, ChatService};
use catbot_rs::config::{CompletionSettings, PipelineConfig};
use catbot_rs::error::{Error, Result};
use catbot_rs::insight::HeuristicInsightExtractor;
use catbot_rs::llm::{CompletionOutput, CompletionRequest, CompletionService};
use catbot_rs::memory::{InMemoryStore, MemoryStore};
use catbot_rs::model::*;
use tokio::sync::Mutex;
use uuid::Uuid;

/// How the fake completion service behaves.
#[derive(Clone)]
pub enum Behavior {
    Reply(String),
    /// Simulates a non-2xx response.
    Fail(String),
    Hang,
}

pub struct FakeCompletion {
    behavior: Behavior,
    pub calls: AtomicUsize,
    pub last_request: Mutex<Option<CompletionRequest>>,
}

impl FakeCompletion {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(Behavior::Reply(text.to_string()))
    }

    pub fn failing() -> Arc<Self> {
        Self::new(Behavior::Fail("HTTP 500 Internal Server Error".to_string()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionService for FakeCompletion {
    fn provider(&self) -> &'static str {
        "fake"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().await = Some(request);
        match &self.behavior {
            Behavior::Reply(text) => Ok(CompletionOutput {
                text: text.clone(),
                input_tokens: 120,
                output_tokens: 30,
            }),
            Behavior::Fail(message) => Err(Error::Completion(message.clone())),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                unreachable!("hung completion should have timed out")
            }
        }
    }
}

/// A memory store whose every operation fails, as if Postgres were down.
pub struct UnreachableStore;

fn down<T>() -> Result<T> {
    Err(Error::Other("connection refused".to_string()))
}

#[async_trait]
impl MemoryStore for UnreachableStore {
    async fn get_profile(&self, _key: &MemoryKey) -> Result<Option<UserMemoryProfile>> {
        down()
    }

    async fn save_profile(&self, _profile: &UserMemoryProfile) -> Result<()> {
        down()
    }

    async fn active_threads(
        &self,
        _key: &MemoryKey,
        _limit: i64,
    ) -> Result<Vec<ConversationContext>> {
        down()
    }

    async fn insert_threads(&self, _threads: &[NewThread]) -> Result<()> {
        down()
    }

    async fn thought_candidates(
        &self,
        _personality: &str,
        _usage_limit: i32,
    ) -> Result<Vec<SpontaneousThought>> {
        down()
    }

    async fn record_thought_use(&self, _id: Uuid) -> Result<()> {
        down()
    }

    async fn insert_thought(&self, _thought: &SpontaneousThought) -> Result<()> {
        down()
    }
}

/// A memory store whose every operation hangs, as if Postgres stopped
/// answering.
pub struct StalledStore;

async fn stall<T>() -> Result<T> {
    std::future::pending().await
}

#[async_trait]
impl MemoryStore for StalledStore {
    async fn get_profile(&self, _key: &MemoryKey) -> Result<Option<UserMemoryProfile>> {
        stall().await
    }

    async fn save_profile(&self, _profile: &UserMemoryProfile) -> Result<()> {
        stall().await
    }

    async fn active_threads(
        &self,
        _key: &MemoryKey,
        _limit: i64,
    ) -> Result<Vec<ConversationContext>> {
        stall().await
    }

    async fn insert_threads(&self, _threads: &[NewThread]) -> Result<()> {
        stall().await
    }

    async fn thought_candidates(
        &self,
        _personality: &str,
        _usage_limit: i32,
    ) -> Result<Vec<SpontaneousThought>> {
        stall().await
    }

    async fn record_thought_use(&self, _id: Uuid) -> Result<()> {
        stall().await
    }

    async fn insert_thought(&self, _thought: &SpontaneousThought) -> Result<()> {
        stall().await
    }
}

pub fn whiskers() -> Character {
    Character {
        id: "whiskers".to_string(),
        name: "Whiskers".to_string(),
        background: Some("A ginger tabby who lives in a bookshop.".to_string()),
        personality: Some("playful".to_string()),
    }
}

pub fn unnamed_personality_cat() -> Character {
    Character {
        id: "mochi".to_string(),
        name: "Mochi".to_string(),
        background: None,
        personality: None,
    }
}

/// Pipeline with every random knob pinned.
pub fn deterministic_pipeline() -> PipelineConfig {
    PipelineConfig {
        thought_selection_chance: 0.0,
        thought_inclusion_chance: 0.0,
        organic_growth_chance: 0.0,
        ..PipelineConfig::default()
    }
}

pub fn fast_settings() -> CompletionSettings {
    CompletionSettings {
        timeout: Duration::from_millis(200),
        ..CompletionSettings::default()
    }
}

pub fn start_service(
    memory: Arc<dyn MemoryStore>,
    completion: Arc<dyn CompletionService>,
    pipeline: PipelineConfig,
) -> Arc<ChatService> {
    ChatService::start(ChatDeps {
        characters: Arc::new(InMemoryCharacterStore::with_characters([
            whiskers(),
            unnamed_personality_cat(),
        ])),
        memory,
        completion,
        insights: Arc::new(HeuristicInsightExtractor),
        completion_settings: fast_settings(),
        pipeline,
    })
}

pub fn in_memory() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::new())
}
