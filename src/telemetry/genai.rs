//! `gen_ai.chat` spans for completion calls, following the OpenTelemetry
//! GenAI semantic conventions.

use tracing::Span;

/// Span around one completion round trip. Usage and error fields start
/// empty.
pub fn start_chat_span(model: &str, provider: &str) -> Span {
    tracing::info_span!(
        "gen_ai.chat",
        "gen_ai.operation.name" = "chat",
        "gen_ai.request.model" = model,
        "gen_ai.provider.name" = provider,
        "gen_ai.usage.input_tokens" = tracing::field::Empty,
        "gen_ai.usage.output_tokens" = tracing::field::Empty,
        "error.type" = tracing::field::Empty,
    )
}

pub fn record_token_usage(span: &Span, input: u64, output: u64) {
    span.record("gen_ai.usage.input_tokens", input);
    span.record("gen_ai.usage.output_tokens", output);
}

/// Mark the call failed ("timeout", "empty", "upstream").
pub fn record_error(span: &Span, kind: &str) {
    span.record("error.type", kind);
}
