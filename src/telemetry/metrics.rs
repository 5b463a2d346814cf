//! Metric instrument factories for catbot-rs.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments are created lazily from the `"catbot-rs"` meter.

use opentelemetry::metrics::{Counter, Histogram, Meter};

/// Returns the shared meter for catbot-rs instruments.
fn meter() -> Meter {
    opentelemetry::global::meter(super::SCOPE)
}

/// Counter: chat turns handled.
/// Labels: `anonymous` ("true" | "false"), `result` ("ok" | "fallback" | "error").
pub fn turns_handled() -> Counter<u64> {
    meter()
        .u64_counter("catbot.turns")
        .with_description("Number of chat turns handled")
        .build()
}

/// Counter: replies served from the fallback bucket.
/// Labels: `personality`.
pub fn completion_fallbacks() -> Counter<u64> {
    meter()
        .u64_counter("catbot.completion.fallbacks")
        .with_description("Completion failures answered with a canned reply")
        .build()
}

/// Counter: memory store operations.
/// Labels: `operation`, `result` ("ok" | "error").
pub fn memory_operations() -> Counter<u64> {
    meter()
        .u64_counter("catbot.memory.operations")
        .with_description("Number of memory store operations")
        .build()
}

/// Counter: background extraction jobs.
/// Labels: `result` ("merged" | "skipped" | "error" | "dropped").
pub fn extractions() -> Counter<u64> {
    meter()
        .u64_counter("catbot.extractions")
        .with_description("Background memory extraction jobs")
        .build()
}

/// Histogram: operation duration in milliseconds.
/// Labels: `operation`.
pub fn operation_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("catbot.operation.duration_ms")
        .with_description("Operation duration in milliseconds")
        .with_unit("ms")
        .build()
}

/// Counter: LLM token usage.
/// Labels: `model`, `direction` ("input" | "output").
pub fn llm_tokens() -> Counter<u64> {
    meter()
        .u64_counter("catbot.llm.tokens")
        .with_description("LLM token usage")
        .build()
}
