//! Tests for merge rules, the memory gateway, and background extraction.

mod common;

use std::sync::Arc;

use catbot_rs::emotion;
use catbot_rs::extract::{ExtractionJob, ExtractionOutcome, MemoryExtractor, spawn_worker};
use catbot_rs::insight::{HeuristicInsightExtractor, InsightExtractor, Insights};
use catbot_rs::memory::merge::{merge_profile, push_unique};
use catbot_rs::memory::{InMemoryStore, MemoryGateway, MemoryStore};
use catbot_rs::model::*;
use chrono::Utc;

fn key() -> MemoryKey {
    MemoryKey::new("user-1", "whiskers")
}

fn job(text: &str) -> ExtractionJob {
    ExtractionJob {
        key: key(),
        user_message: text.to_string(),
        emotion: emotion::extract(text),
    }
}

fn extractor(store: Arc<InMemoryStore>, growth: f64) -> MemoryExtractor {
    MemoryExtractor::new(
        MemoryGateway::new(store),
        Arc::new(HeuristicInsightExtractor),
        growth,
    )
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fresh_user_gets_profile_from_first_insight() {
    let store = common::in_memory();
    let extractor = extractor(Arc::clone(&store), 1.0);

    let outcome = extractor
        .run(&job("I love painting and I'm stressed about work"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ExtractionOutcome::Merged {
            relationship_depth: 1,
            threads_created: 1,
        }
    );

    let profile = store.get_profile(&key()).await.unwrap().expect("profile created");
    assert!(profile.interests.contains(&"painting".to_string()));
    assert_eq!(profile.mentioned_problems.len(), 1);
    assert_eq!(profile.mentioned_problems[0].urgency, Urgency::Medium);
    assert_eq!(profile.mentioned_problems[0].status, ProblemStatus::Open);
    assert_eq!(profile.relationship_depth, 1);
    assert_eq!(profile.emotional_history.len(), 1);

    let threads = store.all_threads(&key()).await;
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].context_type, ContextType::FollowUp);
    assert_eq!(threads[0].status, ThreadStatus::Active);
    assert!(!threads[0].revival_triggers.is_empty());
}

#[tokio::test]
async fn new_interest_appends_and_depth_never_drops() {
    for growth in [0.0, 1.0] {
        let store = common::in_memory();
        let mut seeded = UserMemoryProfile::new(key(), Utc::now());
        seeded.relationship_depth = 8;
        seeded.interests = vec!["reading".to_string()];
        store.save_profile(&seeded).await.unwrap();

        extractor(Arc::clone(&store), growth)
            .run(&job("I've been getting into music lately"))
            .await
            .unwrap();

        let profile = store.get_profile(&key()).await.unwrap().unwrap();
        assert_eq!(profile.interests, vec!["reading".to_string(), "music".to_string()]);
        assert!(
            (8..=9).contains(&profile.relationship_depth),
            "depth {} outside 8..=9",
            profile.relationship_depth
        );
        if growth == 0.0 {
            assert_eq!(profile.relationship_depth, 8);
        } else {
            assert_eq!(profile.relationship_depth, 9);
        }
    }
}

#[tokio::test]
async fn small_talk_without_profile_is_skipped() {
    let store = common::in_memory();
    let outcome = extractor(Arc::clone(&store), 1.0)
        .run(&job("hello"))
        .await
        .unwrap();
    assert_eq!(outcome, ExtractionOutcome::Skipped);
    assert!(store.get_profile(&key()).await.unwrap().is_none());
}

#[tokio::test]
async fn notable_disclosure_deepens_existing_relationship() {
    let store = common::in_memory();
    let extractor = extractor(Arc::clone(&store), 0.0);

    extractor.run(&job("I love cooking")).await.unwrap();
    extractor
        .run(&job("My job interview is tomorrow and I'm nervous"))
        .await
        .unwrap();

    let profile = store.get_profile(&key()).await.unwrap().unwrap();
    assert_eq!(profile.relationship_depth, 2);
    assert_eq!(profile.important_events.len(), 1);

    let threads = store.active_threads(&key(), 3).await.unwrap();
    assert_eq!(threads.len(), 2);
    // Concern (medium, priority 5) outranks the event thread (priority 4).
    assert_eq!(threads[0].context_type, ContextType::FollowUp);
    assert!(threads[0].thread_priority > threads[1].thread_priority);
}

#[tokio::test]
async fn repeated_concern_keeps_a_single_thread() {
    let store = common::in_memory();
    let extractor = extractor(Arc::clone(&store), 0.0);

    let mut created = Vec::new();
    for _ in 0..3 {
        match extractor.run(&job("I'm stressed about work")).await.unwrap() {
            ExtractionOutcome::Merged {
                threads_created, ..
            } => created.push(threads_created),
            ExtractionOutcome::Skipped => panic!("concern should merge"),
        }
    }
    assert_eq!(created, vec![1, 0, 0]);

    let profile = store.get_profile(&key()).await.unwrap().unwrap();
    assert_eq!(profile.mentioned_problems.len(), 1);
    let threads = store.all_threads(&key()).await;
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].context_data.description, "feeling stressed about work");

    // A repeated event is threaded once as well.
    extractor.run(&job("My birthday is on Friday")).await.unwrap();
    extractor.run(&job("My birthday is on Friday")).await.unwrap();
    assert_eq!(store.all_threads(&key()).await.len(), 2);
}

#[tokio::test]
async fn stalled_store_fills_the_queue_and_drops_jobs() {
    let extractor = Arc::new(MemoryExtractor::new(
        MemoryGateway::new(Arc::new(common::StalledStore)),
        Arc::new(HeuristicInsightExtractor),
        0.0,
    ));
    let (handle, worker) = spawn_worker(extractor, 1);

    let mut accepted = 0;
    for i in 0..50 {
        let job = ExtractionJob {
            key: MemoryKey::new(format!("user-{i}"), "whiskers"),
            user_message: "I love painting".to_string(),
            emotion: emotion::extract("I love painting"),
        };
        if handle.schedule(job) {
            accepted += 1;
        }
        tokio::task::yield_now().await;
    }

    // One running, one held by the worker, one queued.
    assert!(accepted <= 3, "accepted {accepted} jobs with capacity 1");
    assert!(!handle.schedule(job("I love music")));

    drop(handle);
    worker.abort();
}

#[tokio::test]
async fn unreachable_store_surfaces_as_error() {
    let extractor = MemoryExtractor::new(
        MemoryGateway::new(Arc::new(common::UnreachableStore)),
        Arc::new(HeuristicInsightExtractor),
        0.0,
    );
    assert!(extractor.run(&job("I love painting")).await.is_err());
}

// ---------------------------------------------------------------------------
// Invariants across many merges
// ---------------------------------------------------------------------------

#[test]
fn repeated_merges_hold_invariants() {
    let messages = [
        "I love Painting",
        "painting again, and MUSIC",
        "music music music",
        "I'm stressed about school",
        "I'm stressed about school",
        "my birthday is soon!!",
        "I'm a night owl",
        "hello",
        "so tired...",
        "I love hiking and cooking",
        "I'm so excited",
        "panic, I can't cope",
    ];

    let mut profile: Option<UserMemoryProfile> = None;
    let mut last_depth = 1;
    for round in 0..3 {
        for (i, text) in messages.iter().enumerate() {
            let insights = HeuristicInsightExtractor.extract_insights(text);
            let grow = (i + round) % 2 == 0;
            let merged = merge_profile(
                &key(),
                profile.take(),
                &insights,
                &emotion::extract(text),
                grow,
                Utc::now(),
            );

            assert!(merged.emotional_history.len() <= EMOTIONAL_HISTORY_LIMIT);
            assert!((1..=10).contains(&merged.relationship_depth));
            assert!(merged.relationship_depth >= last_depth);
            assert_case_insensitive_unique(&merged.interests);
            assert_case_insensitive_unique(&merged.personality_traits);

            last_depth = merged.relationship_depth;
            profile = Some(merged);
        }
    }

    let profile = profile.unwrap();
    assert_eq!(profile.emotional_history.len(), EMOTIONAL_HISTORY_LIMIT);
    assert_eq!(profile.relationship_depth, MAX_RELATIONSHIP_DEPTH);
    // The same concern twice is one open problem, not two.
    assert_eq!(
        profile
            .mentioned_problems
            .iter()
            .filter(|p| p.description == "feeling stressed about school")
            .count(),
        1
    );
}

#[test]
fn emotional_history_is_fifo() {
    let mut profile = UserMemoryProfile::new(key(), Utc::now());
    let texts = ["hello"; 10]
        .into_iter()
        .chain(["I'm so excited", "so tired..."]);
    for text in texts {
        profile = merge_profile(
            &key(),
            Some(profile),
            &Insights::default(),
            &emotion::extract(text),
            false,
            Utc::now(),
        );
    }
    assert_eq!(profile.emotional_history.len(), 10);
    let last = profile.emotional_history.last().unwrap();
    assert_eq!(last.energy, EnergyLevel::Low);
    assert_eq!(profile.emotional_history[8].emotion, Emotion::Excited);
}

#[test]
fn push_unique_ignores_case_and_blanks() {
    let mut list = vec!["Reading".to_string()];
    push_unique(&mut list, "reading");
    push_unique(&mut list, "  ");
    push_unique(&mut list, " Music ");
    assert_eq!(list, vec!["Reading".to_string(), "Music".to_string()]);
}

#[test]
fn out_of_range_depth_is_clamped() {
    let mut stored = UserMemoryProfile::new(key(), Utc::now());
    stored.relationship_depth = 14;
    let merged = merge_profile(
        &key(),
        Some(stored),
        &Insights::default(),
        &emotion::extract("hi"),
        true,
        Utc::now(),
    );
    assert_eq!(merged.relationship_depth, MAX_RELATIONSHIP_DEPTH);
}

fn assert_case_insensitive_unique(items: &[String]) {
    let mut seen = std::collections::HashSet::new();
    for item in items {
        assert!(seen.insert(item.to_lowercase()), "duplicate entry {item:?} in {items:?}");
    }
}
