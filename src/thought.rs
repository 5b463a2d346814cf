//! Spontaneous Thought Selector.
//!
//! Occasionally hands the prompt a pre-authored line that fits the
//! catbot's personality. Pure variety: a miss, an empty catalog, or a store
//! error all just mean "no thought this turn". Usage is counted only when
//! the prompt actually renders the thought.

use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, warn};

use crate::memory::MemoryStore;
use crate::model::SpontaneousThought;

pub struct ThoughtSelector {
    store: Arc<dyn MemoryStore>,
    selection_chance: f64,
    usage_limit: i32,
}

impl ThoughtSelector {
    pub fn new(store: Arc<dyn MemoryStore>, selection_chance: f64, usage_limit: i32) -> Self {
        Self {
            store,
            selection_chance: selection_chance.clamp(0.0, 1.0),
            usage_limit,
        }
    }

    /// Maybe pick a thought for `personality`. Never fails.
    pub async fn select(&self, personality: &str) -> Option<SpontaneousThought> {
        if !rand::rng().random_bool(self.selection_chance) {
            return None;
        }

        let candidates = match self
            .store
            .thought_candidates(personality, self.usage_limit)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(personality, error = %e, "thought lookup failed");
                return None;
            }
        };

        let thought = candidates.choose(&mut rand::rng())?.clone();
        debug!(personality, category = %thought.thought_category, "spontaneous thought selected");
        Some(thought)
    }

    /// Count a thought that was actually put in front of the model.
    /// Best-effort: a store error is logged and ignored.
    pub async fn record_use(&self, thought: &SpontaneousThought) {
        if let Err(e) = self.store.record_thought_use(thought.id).await {
            warn!(thought_id = %thought.id, error = %e, "failed to record thought usage");
        }
    }
}
