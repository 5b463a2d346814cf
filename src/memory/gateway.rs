//! Memory Store Gateway: the read/write surface the chat pipeline and the
//! background extractor use. Applies merge rules on write and records
//! store metrics.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use opentelemetry::KeyValue;

use crate::error::Result;
use crate::insight::Insights;
use crate::model::*;
use crate::telemetry::metrics;

use super::MemoryStore;
use super::merge::merge_profile;

#[derive(Clone)]
pub struct MemoryGateway {
    store: Arc<dyn MemoryStore>,
}

impl MemoryGateway {
    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self { store }
    }

    pub async fn get_profile(&self, key: &MemoryKey) -> Result<Option<UserMemoryProfile>> {
        let start = Instant::now();
        let result = self.store.get_profile(key).await;
        record("get_profile", start, result.is_ok());
        result
    }

    /// Active threads, highest priority first.
    pub async fn active_threads(
        &self,
        key: &MemoryKey,
        limit: i64,
    ) -> Result<Vec<ConversationContext>> {
        let start = Instant::now();
        let result = self.store.active_threads(key, limit).await;
        record("active_threads", start, result.is_ok());
        result
    }

    /// Merge `insights` into `existing` (or a fresh profile) and persist.
    ///
    /// Returns the profile as written.
    pub async fn upsert_profile(
        &self,
        key: &MemoryKey,
        insights: &Insights,
        emotion: &EmotionalContext,
        existing: Option<UserMemoryProfile>,
        grow: bool,
    ) -> Result<UserMemoryProfile> {
        let start = Instant::now();
        let profile = merge_profile(key, existing, insights, emotion, grow, Utc::now());
        let result = self.store.save_profile(&profile).await;
        record("upsert_profile", start, result.is_ok());
        result.map(|()| profile)
    }

    pub async fn insert_threads(&self, threads: &[NewThread]) -> Result<()> {
        if threads.is_empty() {
            return Ok(());
        }
        let start = Instant::now();
        let result = self.store.insert_threads(threads).await;
        record("insert_threads", start, result.is_ok());
        result
    }
}

fn record(operation: &'static str, start: Instant, ok: bool) {
    metrics::memory_operations().add(
        1,
        &[
            KeyValue::new("operation", operation),
            KeyValue::new("result", if ok { "ok" } else { "error" }),
        ],
    );
    metrics::operation_duration_ms().record(
        start.elapsed().as_secs_f64() * 1000.0,
        &[KeyValue::new("operation", operation)],
    );
}
