//! Tuning knobs for the per-turn pipeline, optionally loaded from TOML.
//!
//! ```toml
//! [pipeline]
//! thought_selection_chance = 0.1
//! history_window = 20
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Top-level TOML wrapper.
#[derive(Debug, Deserialize)]
struct PipelineFile {
    #[serde(default)]
    pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Chance per turn that a spontaneous thought is sampled at all.
    pub thought_selection_chance: f64,
    /// Thoughts used this many times or more are no longer eligible.
    pub thought_usage_limit: i32,
    /// Chance that a sampled thought actually makes it into the prompt.
    pub thought_inclusion_chance: f64,
    /// Most recent turns (a user message and its replies) forwarded to
    /// the completion service.
    pub history_window: usize,
    /// Active threads fetched per turn.
    pub thread_fetch_limit: i64,
    /// Threads rendered as hints in the prompt.
    pub prompt_thread_limit: usize,
    /// Chance of a relationship depth bump when nothing notable was said.
    pub organic_growth_chance: f64,
    /// Background extractions run at once, and queued behind them, before
    /// new ones are dropped.
    pub extraction_queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            thought_selection_chance: 0.10,
            thought_usage_limit: 5,
            thought_inclusion_chance: 0.30,
            history_window: 20,
            thread_fetch_limit: 3,
            prompt_thread_limit: 2,
            organic_growth_chance: 0.05,
            extraction_queue_capacity: 256,
        }
    }
}

impl PipelineConfig {
    /// Load from a TOML file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read pipeline config {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
            .map_err(|e| Error::Config(format!("bad pipeline config {}: {e}", path.display())))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: PipelineFile =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        Ok(file.pipeline.clamped())
    }

    /// Force probabilities into [0, 1] and windows to at least one entry.
    pub fn clamped(mut self) -> Self {
        self.thought_selection_chance = clamp_chance(self.thought_selection_chance);
        self.thought_inclusion_chance = clamp_chance(self.thought_inclusion_chance);
        self.organic_growth_chance = clamp_chance(self.organic_growth_chance);
        self.history_window = self.history_window.max(1);
        self.thread_fetch_limit = self.thread_fetch_limit.max(0);
        self.extraction_queue_capacity = self.extraction_queue_capacity.max(1);
        self
    }
}

fn clamp_chance(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}
