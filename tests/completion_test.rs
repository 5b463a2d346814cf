//! Tests for the completion invoker and its fallback path.

mod common;

use common::{Behavior, FakeCompletion};

use catbot_rs::llm::{CompletionInvoker, fallback};
use catbot_rs::model::ChatMessage;
use catbot_rs::model::character::Personality;

fn messages() -> Vec<ChatMessage> {
    vec![ChatMessage::user("hi there")]
}

#[tokio::test]
async fn success_returns_text_verbatim() {
    let service = FakeCompletion::replying("  Mrrow! How was your day?\n");
    let invoker = CompletionInvoker::new(service.clone(), common::fast_settings());

    let completion = invoker
        .invoke("system".to_string(), messages(), Some("playful"))
        .await;
    assert!(completion.success);
    assert_eq!(completion.text, "  Mrrow! How was your day?\n");

    let request = service.last_request.lock().await.clone().unwrap();
    assert_eq!(request.system, "system");
    assert_eq!(request.model, common::fast_settings().model);
    assert_eq!(request.max_tokens, common::fast_settings().max_tokens);
    assert_eq!(request.messages, messages());
}

#[tokio::test]
async fn server_error_falls_back_to_personality_bucket() {
    let invoker = CompletionInvoker::new(FakeCompletion::failing(), common::fast_settings());

    for _ in 0..20 {
        let completion = invoker
            .invoke("system".to_string(), messages(), Some("grumpy"))
            .await;
        assert!(!completion.success);
        assert!(!completion.text.is_empty());
        assert!(fallback::bucket(Personality::Grumpy).contains(&completion.text.as_str()));
    }
}

#[tokio::test]
async fn unknown_or_missing_personality_uses_friendly_bucket() {
    let invoker = CompletionInvoker::new(FakeCompletion::failing(), common::fast_settings());
    let friendly = fallback::bucket(Personality::Friendly);

    for personality in [None, Some("mysterious"), Some("")] {
        let completion = invoker
            .invoke("system".to_string(), messages(), personality)
            .await;
        assert!(friendly.contains(&completion.text.as_str()));
    }
}

#[tokio::test]
async fn blank_completion_is_treated_as_failure() {
    let invoker = CompletionInvoker::new(FakeCompletion::replying("   "), common::fast_settings());
    let completion = invoker
        .invoke("system".to_string(), messages(), Some("shy"))
        .await;
    assert!(!completion.success);
    assert!(fallback::bucket(Personality::Shy).contains(&completion.text.as_str()));
}

#[tokio::test]
async fn timeout_feeds_the_fallback() {
    let service = FakeCompletion::new(Behavior::Hang);
    let invoker = CompletionInvoker::new(service.clone(), common::fast_settings());

    let completion = invoker
        .invoke("system".to_string(), messages(), Some("wise"))
        .await;
    assert!(!completion.success);
    assert!(fallback::bucket(Personality::Wise).contains(&completion.text.as_str()));
    assert_eq!(service.call_count(), 1, "no retry");
}

#[test]
fn every_bucket_is_non_empty_and_in_character() {
    for personality in [
        Personality::Friendly,
        Personality::Playful,
        Personality::Sassy,
        Personality::Shy,
        Personality::Wise,
        Personality::Grumpy,
    ] {
        let bucket = fallback::bucket(personality);
        assert!(!bucket.is_empty());
        for reply in bucket {
            assert!(!reply.trim().is_empty());
            assert!(reply.trim_end().ends_with('?'), "{personality}: {reply}");
        }
    }
}
