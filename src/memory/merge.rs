//! Pure merge rules for folding a turn's insights into memory.
//!
//! Invariants held by every function here:
//! - interests and traits stay case-insensitively unique, append-only
//! - emotional history keeps at most [`EMOTIONAL_HISTORY_LIMIT`] entries
//! - relationship depth stays in 1..=10 and never goes down

use chrono::{DateTime, Utc};

use crate::insight::Insights;
use crate::model::*;

/// Thread priority by concern urgency. Higher = more urgent.
pub fn urgency_priority(urgency: Urgency) -> i32 {
    match urgency {
        Urgency::Low => 2,
        Urgency::Medium => 5,
        Urgency::High => 8,
    }
}

const EVENT_THREAD_PRIORITY: i32 = 4;
const MINOR_EVENT_THREAD_PRIORITY: i32 = 3;

/// Fold `insights` and the turn's emotional read into a profile.
///
/// A missing `existing` profile starts at depth 1; `grow` is ignored for
/// it. An existing profile gains one depth level when `grow` is set.
pub fn merge_profile(
    key: &MemoryKey,
    existing: Option<UserMemoryProfile>,
    insights: &Insights,
    emotion: &EmotionalContext,
    grow: bool,
    now: DateTime<Utc>,
) -> UserMemoryProfile {
    let is_new = existing.is_none();
    let mut profile = existing.unwrap_or_else(|| UserMemoryProfile::new(key.clone(), now));

    profile.relationship_depth = profile
        .relationship_depth
        .clamp(MIN_RELATIONSHIP_DEPTH, MAX_RELATIONSHIP_DEPTH);
    if grow && !is_new {
        profile.relationship_depth = bump_depth(profile.relationship_depth);
    }

    for interest in &insights.interests {
        push_unique(&mut profile.interests, interest);
    }
    for trait_label in &insights.personality_traits {
        push_unique(&mut profile.personality_traits, trait_label);
    }

    for concern in &insights.concerns {
        let existing_problem = profile.mentioned_problems.iter_mut().find(|p| {
            p.status == ProblemStatus::Open && p.description.eq_ignore_ascii_case(&concern.description)
        });
        match existing_problem {
            Some(problem) => {
                problem.urgency = problem.urgency.max(concern.urgency);
                problem.mentioned_at = now;
            }
            None => profile.mentioned_problems.push(MentionedProblem {
                description: concern.description.clone(),
                urgency: concern.urgency,
                status: ProblemStatus::Open,
                mentioned_at: now,
            }),
        }
    }

    for event in &insights.events {
        if !profile
            .important_events
            .iter()
            .any(|e| e.event.eq_ignore_ascii_case(&event.event))
        {
            profile.important_events.push(ImportantEvent {
                event: event.event.clone(),
                significance: event.significance,
                mentioned_at: now,
            });
        }
    }

    profile.current_emotional_state = Some(EmotionalState {
        emotion: emotion.emotion,
        intensity: emotion.intensity,
        energy: emotion.energy_level,
    });
    push_bounded(
        &mut profile.emotional_history,
        EmotionalSnapshot::from_context(emotion, now),
        EMOTIONAL_HISTORY_LIMIT,
    );

    profile.updated_at = now;
    profile
}

/// One step up, saturating at the maximum.
pub fn bump_depth(depth: i32) -> i32 {
    (depth + 1).clamp(MIN_RELATIONSHIP_DEPTH, MAX_RELATIONSHIP_DEPTH)
}

/// Append unless an entry already matches case-insensitively.
pub fn push_unique(list: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }
    let lowered = value.to_lowercase();
    if !list.iter().any(|v| v.to_lowercase() == lowered) {
        list.push(value.to_string());
    }
}

/// FIFO append: drop the oldest entries beyond `limit`.
pub fn push_bounded<T>(list: &mut Vec<T>, value: T, limit: usize) {
    list.push(value);
    if list.len() > limit {
        let excess = list.len() - limit;
        list.drain(..excess);
    }
}

/// Threads worth following up on, derived from concerns and events.
///
/// Only what `existing` doesn't already track yields a thread: a concern
/// matching an open problem, or an event already recorded, was threaded
/// when it was first mentioned.
pub fn threads_from_insights(
    key: &MemoryKey,
    existing: Option<&UserMemoryProfile>,
    insights: &Insights,
    source_text: &str,
) -> Vec<NewThread> {
    let known_problem = |description: &str| {
        existing.is_some_and(|p| {
            p.open_problems()
                .any(|problem| problem.description.eq_ignore_ascii_case(description))
        })
    };
    let known_event = |event: &str| {
        existing.is_some_and(|p| {
            p.important_events
                .iter()
                .any(|e| e.event.eq_ignore_ascii_case(event))
        })
    };

    let concerns = insights
        .concerns
        .iter()
        .filter(|concern| !known_problem(&concern.description))
        .map(|concern| NewThread {
            key: key.clone(),
            context_type: ContextType::FollowUp,
            context_data: ContextData {
                description: concern.description.clone(),
                source_text: source_text.to_string(),
            },
            thread_priority: urgency_priority(concern.urgency),
            revival_triggers: concern.triggers.clone(),
        });

    let events = insights
        .events
        .iter()
        .filter(|event| !known_event(&event.event))
        .map(|event| NewThread {
            key: key.clone(),
            context_type: ContextType::TopicThread,
            context_data: ContextData {
                description: event.event.clone(),
                source_text: source_text.to_string(),
            },
            thread_priority: match event.significance {
                Significance::Major => EVENT_THREAD_PRIORITY,
                Significance::Minor => MINOR_EVENT_THREAD_PRIORITY,
            },
            revival_triggers: event.triggers.clone(),
        });

    concerns.chain(events).collect()
}
