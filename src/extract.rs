//! Background Memory Extractor.
//!
//! After a reply has gone out, the chat service hands the turn to an
//! [`ExtractorHandle`]. A spawned worker mines the user's utterance for
//! insights and merges them into memory. Jobs for the same (user, catbot)
//! key run one at a time, so read-modify-write merges never interleave;
//! different keys proceed concurrently. Failures are logged and dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use opentelemetry::KeyValue;
use rand::Rng;
use tokio::sync::{OwnedMutexGuard, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{Instrument, debug, info, warn};

use crate::error::Result;
use crate::insight::InsightExtractor;
use crate::memory::MemoryGateway;
use crate::memory::merge::threads_from_insights;
use crate::model::{EmotionalContext, MemoryKey};
use crate::telemetry::metrics;

/// One finished turn awaiting extraction.
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    pub key: MemoryKey,
    pub user_message: String,
    pub emotion: EmotionalContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// No profile yet and nothing worth creating one for.
    Skipped,
    Merged {
        relationship_depth: i32,
        threads_created: usize,
    },
}

/// Mines a turn and merges what it finds. Stateless apart from its deps.
pub struct MemoryExtractor {
    gateway: MemoryGateway,
    insights: Arc<dyn InsightExtractor>,
    organic_growth_chance: f64,
}

impl MemoryExtractor {
    pub fn new(
        gateway: MemoryGateway,
        insights: Arc<dyn InsightExtractor>,
        organic_growth_chance: f64,
    ) -> Self {
        Self {
            gateway,
            insights,
            organic_growth_chance: organic_growth_chance.clamp(0.0, 1.0),
        }
    }

    /// Extract, merge, and create threads for one job.
    pub async fn run(&self, job: &ExtractionJob) -> Result<ExtractionOutcome> {
        let insights = self.insights.extract_insights(&job.user_message);
        let existing = self.gateway.get_profile(&job.key).await?;

        if existing.is_none() && insights.is_empty() {
            return Ok(ExtractionOutcome::Skipped);
        }

        let grow = existing.is_some()
            && (insights.is_notable() || rand::rng().random_bool(self.organic_growth_chance));

        let threads =
            threads_from_insights(&job.key, existing.as_ref(), &insights, &job.user_message);
        let profile = self
            .gateway
            .upsert_profile(&job.key, &insights, &job.emotion, existing, grow)
            .await?;
        self.gateway.insert_threads(&threads).await?;

        Ok(ExtractionOutcome::Merged {
            relationship_depth: profile.relationship_depth,
            threads_created: threads.len(),
        })
    }
}

/// Cheap, cloneable submit side of the extraction queue.
#[derive(Clone)]
pub struct ExtractorHandle {
    tx: mpsc::Sender<ExtractionJob>,
}

impl ExtractorHandle {
    /// Queue a job without waiting. Returns false if it was dropped
    /// because the queue is full or the worker has stopped.
    pub fn schedule(&self, job: ExtractionJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "extraction job dropped");
                metrics::extractions().add(1, &[KeyValue::new("result", "dropped")]);
                false
            }
        }
    }
}

/// Spawn the extraction worker. It runs until every handle is dropped,
/// then drains in-flight jobs and exits.
///
/// At most `capacity` jobs run at once. While they are all busy the worker
/// holds one more job and stops reading, so the queue fills and
/// [`ExtractorHandle::schedule`] starts dropping after `capacity` more.
pub fn spawn_worker(
    extractor: Arc<MemoryExtractor>,
    capacity: usize,
) -> (ExtractorHandle, JoinHandle<()>) {
    let capacity = capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity);
    let worker = tokio::spawn(worker_loop(extractor, rx, capacity));
    (ExtractorHandle { tx }, worker)
}

async fn worker_loop(
    extractor: Arc<MemoryExtractor>,
    mut rx: mpsc::Receiver<ExtractionJob>,
    max_in_flight: usize,
) {
    let locks = Arc::new(KeyedLocks::default());
    let mut in_flight = JoinSet::new();

    info!(max_in_flight, "memory extraction worker started");
    while let Some(job) = rx.recv().await {
        while in_flight.try_join_next().is_some() {}
        // Backpressure: stop pulling from the queue until a slot frees up.
        while in_flight.len() >= max_in_flight {
            if let Some(Err(e)) = in_flight.join_next().await {
                warn!(error = %e, "extraction task aborted");
            }
        }

        let extractor = Arc::clone(&extractor);
        let locks = Arc::clone(&locks);
        let span = tracing::info_span!("memory.extract", key = %job.key);
        in_flight.spawn(
            async move {
                let _guard = locks.lock(&job.key).await;
                match extractor.run(&job).await {
                    Ok(outcome) => {
                        let result = match outcome {
                            ExtractionOutcome::Skipped => "skipped",
                            ExtractionOutcome::Merged { .. } => "merged",
                        };
                        debug!(?outcome, "extraction finished");
                        metrics::extractions().add(1, &[KeyValue::new("result", result)]);
                    }
                    Err(e) => {
                        warn!(error = %e, "extraction failed");
                        metrics::extractions().add(1, &[KeyValue::new("result", "error")]);
                    }
                }
            }
            .instrument(span),
        );
    }

    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            warn!(error = %e, "extraction task aborted");
        }
    }
    info!("memory extraction worker stopped");
}

/// One async mutex per memory key, released once nobody holds or waits on it.
#[derive(Default)]
struct KeyedLocks {
    locks: Mutex<HashMap<MemoryKey, Weak<tokio::sync::Mutex<()>>>>,
}

impl KeyedLocks {
    async fn lock(&self, key: &MemoryKey) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, weak| weak.strong_count() > 0);
            match locks.get(key).and_then(Weak::upgrade) {
                Some(existing) => existing,
                None => {
                    let fresh = Arc::new(tokio::sync::Mutex::new(()));
                    locks.insert(key.clone(), Arc::downgrade(&fresh));
                    fresh
                }
            }
        };
        mutex.lock_owned().await
    }
}
