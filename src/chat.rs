//! The chat service: one strictly linear pipeline per turn.
//!
//! fetch {profile, threads, thought} concurrently → fuse prompt → bounded
//! history window → completion → reply → detached extraction.
//!
//! Only an unresolvable character fails a turn. Every enrichment failure
//! degrades to "no memory" and the user still gets an in-character reply.
//! Anonymous turns skip memory reads and extraction entirely.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use opentelemetry::KeyValue;
use tokio::task::JoinHandle;
use tracing::{Instrument, info, warn};

use crate::character::CharacterStore;
use crate::config::{CompletionSettings, PipelineConfig};
use crate::emotion;
use crate::error::{Error, Result};
use crate::extract::{ExtractionJob, ExtractorHandle, MemoryExtractor, spawn_worker};
use crate::insight::InsightExtractor;
use crate::llm::{CompletionInvoker, CompletionService};
use crate::memory::{MemoryGateway, MemoryStore};
use crate::model::*;
use crate::prompt::{PromptInputs, PromptSynthesizer};
use crate::telemetry::{metrics, turn};
use crate::thought::ThoughtSelector;

/// Collaborators a [`ChatService`] is built from.
pub struct ChatDeps {
    pub characters: Arc<dyn CharacterStore>,
    pub memory: Arc<dyn MemoryStore>,
    pub completion: Arc<dyn CompletionService>,
    pub insights: Arc<dyn InsightExtractor>,
    pub completion_settings: CompletionSettings,
    pub pipeline: PipelineConfig,
}

pub struct ChatService {
    characters: Arc<dyn CharacterStore>,
    gateway: MemoryGateway,
    thoughts: ThoughtSelector,
    synthesizer: PromptSynthesizer,
    invoker: CompletionInvoker,
    thread_fetch_limit: i64,
    extractor: Mutex<Option<ExtractorHandle>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    ready: AtomicBool,
}

impl ChatService {
    /// Build the service and start its extraction worker.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(deps: ChatDeps) -> Arc<Self> {
        let pipeline = deps.pipeline.clamped();
        let gateway = MemoryGateway::new(Arc::clone(&deps.memory));

        let extractor = Arc::new(MemoryExtractor::new(
            gateway.clone(),
            deps.insights,
            pipeline.organic_growth_chance,
        ));
        let (handle, worker) = spawn_worker(extractor, pipeline.extraction_queue_capacity);

        let service = Self {
            characters: deps.characters,
            thoughts: ThoughtSelector::new(
                deps.memory,
                pipeline.thought_selection_chance,
                pipeline.thought_usage_limit,
            ),
            gateway,
            synthesizer: PromptSynthesizer::new(
                pipeline.thought_inclusion_chance,
                pipeline.history_window,
                pipeline.prompt_thread_limit,
            ),
            invoker: CompletionInvoker::new(deps.completion, deps.completion_settings),
            thread_fetch_limit: pipeline.thread_fetch_limit,
            extractor: Mutex::new(Some(handle)),
            worker: Mutex::new(Some(worker)),
            ready: AtomicBool::new(true),
        };
        info!(model = %service.invoker.settings().model, "chat service started");
        Arc::new(service)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Stop accepting turns, close the extraction queue, and wait for
    /// queued extractions to finish.
    pub async fn shutdown(&self) {
        self.ready.store(false, Ordering::Release);
        drop(lock(&self.extractor).take());
        let worker = lock(&self.worker).take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                warn!(error = %e, "extraction worker ended abnormally");
            }
        }
        info!("chat service stopped");
    }

    /// Run one turn.
    ///
    /// # Errors
    /// - [`Error::MalformedInput`] when `catbotId` or `userMessage` is blank
    /// - [`Error::NotFound`] when the catbot doesn't exist
    /// - [`Error::NotReady`] after [`shutdown`](Self::shutdown)
    /// - a storage error if the character store itself is unreachable
    pub async fn handle_turn(&self, request: ChatRequest) -> Result<ChatResponse> {
        let catbot_id = request.catbot_id.trim();
        if catbot_id.is_empty() {
            return Err(Error::MalformedInput("catbotId is required".to_string()));
        }
        let user_message = request.user_message.trim();
        if user_message.is_empty() {
            return Err(Error::MalformedInput("userMessage is required".to_string()));
        }
        if !self.is_ready() {
            return Err(Error::NotReady);
        }

        let key = request
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(|u| MemoryKey::new(u, catbot_id));
        let anonymous = key.is_none();

        let span = turn::start_turn_span(catbot_id, anonymous);
        let result = self
            .run_turn(catbot_id, user_message, &request.conversation_history, key)
            .instrument(span.clone())
            .await;

        let outcome = match &result {
            Ok(reply) => {
                turn::record_turn_outcome(&span, !reply.success);
                if reply.success { "ok" } else { "fallback" }
            }
            Err(_) => "error",
        };
        metrics::turns_handled().add(
            1,
            &[
                KeyValue::new("anonymous", anonymous.to_string()),
                KeyValue::new("result", outcome),
            ],
        );
        result
    }

    async fn run_turn(
        &self,
        catbot_id: &str,
        user_message: &str,
        history: &[ChatMessage],
        key: Option<MemoryKey>,
    ) -> Result<ChatResponse> {
        let span = tracing::Span::current();
        let character = self
            .characters
            .get(catbot_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("catbot {catbot_id}")))?;

        let emotion = emotion::extract(user_message);

        let fetch_start = Instant::now();
        let (profile, threads, thought) = tokio::join!(
            self.load_profile(key.as_ref()),
            self.load_threads(key.as_ref()),
            self.thoughts.select(character.personality_label()),
        );
        turn::record_stage(&span, "fetch", fetch_start.elapsed().as_millis() as u64);

        let include_thought = self.synthesizer.roll_thought(thought.is_some());
        let system = self.synthesizer.render(
            &PromptInputs {
                character: &character,
                emotion: &emotion,
                profile: profile.as_ref(),
                threads: &threads,
                thought: thought.as_ref(),
            },
            include_thought,
        );
        if let (true, Some(thought)) = (include_thought, &thought) {
            self.thoughts.record_use(thought).await;
        }
        let messages = self.synthesizer.conversation(history, user_message);

        let completion_start = Instant::now();
        let completion = self
            .invoker
            .invoke(system, messages, character.personality.as_deref())
            .await;
        turn::record_stage(
            &span,
            "completion",
            completion_start.elapsed().as_millis() as u64,
        );

        if let Some(key) = key {
            self.schedule_extraction(ExtractionJob {
                key,
                user_message: user_message.to_string(),
                emotion,
            });
        }

        Ok(ChatResponse {
            response: completion.text,
            success: completion.success,
        })
    }

    async fn load_profile(&self, key: Option<&MemoryKey>) -> Option<UserMemoryProfile> {
        let key = key?;
        match self.gateway.get_profile(key).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(%key, error = %e, "profile fetch failed, continuing without memory");
                None
            }
        }
    }

    async fn load_threads(&self, key: Option<&MemoryKey>) -> Vec<ConversationContext> {
        let Some(key) = key else {
            return Vec::new();
        };
        match self.gateway.active_threads(key, self.thread_fetch_limit).await {
            Ok(threads) => threads,
            Err(e) => {
                warn!(%key, error = %e, "thread fetch failed, continuing without threads");
                Vec::new()
            }
        }
    }

    fn schedule_extraction(&self, job: ExtractionJob) {
        let handle = lock(&self.extractor).clone();
        match handle {
            Some(handle) => {
                handle.schedule(job);
            }
            None => warn!(key = %job.key, "extraction skipped, worker stopped"),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
