//! Chat turn span helpers.

use tracing::Span;

/// Start a span covering one chat turn.
///
/// `turn.fallback` is declared empty and filled by [`record_turn_outcome`].
pub fn start_turn_span(catbot_id: &str, anonymous: bool) -> Span {
    tracing::info_span!(
        "chat.turn",
        "turn.catbot_id" = catbot_id,
        "turn.anonymous" = anonymous,
        "turn.fallback" = tracing::field::Empty,
    )
}

/// Record whether the reply came from the fallback bucket.
pub fn record_turn_outcome(span: &Span, fallback: bool) {
    span.record("turn.fallback", fallback);
}

/// Emit a stage marker scoped to the given span.
pub fn record_stage(span: &Span, stage: &str, duration_ms: u64) {
    span.in_scope(|| {
        tracing::debug!(stage, duration_ms, "turn_stage");
    });
}
