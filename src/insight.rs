//! Insight extraction from a single user utterance.
//!
//! [`InsightExtractor`] is the seam between "what did the user reveal" and
//! the memory merge. The shipped [`HeuristicInsightExtractor`] is keyword
//! driven; a model-backed extractor can replace it without touching the
//! merge or prompt code.

use crate::emotion::contains_phrase;
use crate::model::{Significance, Urgency};

/// Everything worth remembering from one message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insights {
    pub interests: Vec<String>,
    pub personality_traits: Vec<String>,
    pub concerns: Vec<Concern>,
    pub events: Vec<EventMention>,
}

impl Insights {
    pub fn is_empty(&self) -> bool {
        self.interests.is_empty()
            && self.personality_traits.is_empty()
            && self.concerns.is_empty()
            && self.events.is_empty()
    }

    /// Disclosures that deepen a relationship on their own.
    pub fn is_notable(&self) -> bool {
        !self.concerns.is_empty() || !self.events.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Concern {
    pub description: String,
    pub urgency: Urgency,
    pub topic: Option<String>,
    pub triggers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventMention {
    pub event: String,
    pub significance: Significance,
    pub triggers: Vec<String>,
}

pub trait InsightExtractor: Send + Sync {
    fn extract_insights(&self, text: &str) -> Insights;
}

// ---------------------------------------------------------------------------
// Vocabularies
// ---------------------------------------------------------------------------

/// (phrase, interest label)
const INTERESTS: &[(&str, &str)] = &[
    ("painting", "painting"),
    ("paint", "painting"),
    ("drawing", "drawing"),
    ("sketching", "drawing"),
    ("music", "music"),
    ("guitar", "guitar"),
    ("piano", "piano"),
    ("singing", "singing"),
    ("reading", "reading"),
    ("books", "reading"),
    ("novels", "reading"),
    ("gaming", "gaming"),
    ("video games", "gaming"),
    ("cooking", "cooking"),
    ("baking", "baking"),
    ("hiking", "hiking"),
    ("running", "running"),
    ("yoga", "yoga"),
    ("photography", "photography"),
    ("movies", "movies"),
    ("films", "movies"),
    ("anime", "anime"),
    ("writing", "writing"),
    ("poetry", "poetry"),
    ("gardening", "gardening"),
    ("dancing", "dancing"),
    ("traveling", "travel"),
    ("travelling", "travel"),
    ("travel", "travel"),
    ("football", "football"),
    ("soccer", "football"),
    ("basketball", "basketball"),
    ("coding", "programming"),
    ("programming", "programming"),
    ("knitting", "knitting"),
    ("cats", "cats"),
];

/// (phrase, trait label). Only counted when the user talks about themselves.
const TRAITS: &[(&str, &str)] = &[
    ("introvert", "introverted"),
    ("introverted", "introverted"),
    ("shy", "shy"),
    ("extrovert", "outgoing"),
    ("outgoing", "outgoing"),
    ("creative", "creative"),
    ("night owl", "night owl"),
    ("early bird", "early bird"),
    ("perfectionist", "perfectionist"),
    ("curious", "curious"),
    ("competitive", "competitive"),
    ("organized", "organized"),
    ("messy", "messy"),
    ("impatient", "impatient"),
];

const FIRST_PERSON: &[&str] = &["i'm", "im", "i am", "i've always been", "i tend to be"];

const HIGH_URGENCY: &[&str] = &[
    "emergency",
    "panic",
    "panicking",
    "can't cope",
    "cant cope",
    "hopeless",
    "desperate",
    "breaking down",
    "falling apart",
];

const MEDIUM_URGENCY: &[&str] = &[
    "stressed",
    "worried",
    "anxious",
    "struggling",
    "overwhelmed",
    "scared",
    "afraid",
    "nervous",
    "problem",
    "trouble",
];

const LOW_URGENCY: &[&str] = &["annoyed", "frustrated", "bothering me", "bugging me", "tired of"];

/// (phrase, topic label) for concerns.
const TOPICS: &[(&str, &str)] = &[
    ("work", "work"),
    ("job", "work"),
    ("boss", "work"),
    ("coworker", "work"),
    ("school", "school"),
    ("class", "school"),
    ("homework", "school"),
    ("exam", "school"),
    ("exams", "school"),
    ("family", "family"),
    ("parents", "family"),
    ("mom", "family"),
    ("dad", "family"),
    ("relationship", "relationship"),
    ("partner", "relationship"),
    ("boyfriend", "relationship"),
    ("girlfriend", "relationship"),
    ("health", "health"),
    ("doctor", "health"),
    ("money", "money"),
    ("rent", "money"),
    ("bills", "money"),
    ("friends", "friends"),
    ("friend", "friends"),
];

const EVENTS: &[(&str, Significance)] = &[
    ("birthday", Significance::Major),
    ("wedding", Significance::Major),
    ("graduation", Significance::Major),
    ("graduating", Significance::Major),
    ("new job", Significance::Major),
    ("job interview", Significance::Major),
    ("interview", Significance::Major),
    ("moving", Significance::Major),
    ("exam", Significance::Minor),
    ("vacation", Significance::Minor),
    ("holiday", Significance::Minor),
    ("trip", Significance::Minor),
    ("concert", Significance::Minor),
];

const STOPWORDS: &[&str] = &[
    "about", "after", "again", "also", "been", "being", "could", "from", "have", "just",
    "like", "really", "that", "there", "they", "this", "very", "what", "when", "with",
    "would", "your", "feel", "feeling", "today", "going",
];

const MAX_DESCRIPTION_CHARS: usize = 160;
const MAX_TRIGGERS: usize = 5;

// ---------------------------------------------------------------------------
// Heuristic extractor
// ---------------------------------------------------------------------------

/// Keyword-list extractor. Looks at the user's utterance only.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicInsightExtractor;

impl InsightExtractor for HeuristicInsightExtractor {
    fn extract_insights(&self, text: &str) -> Insights {
        let lowered = text.to_lowercase();

        let interests = labels_for(&lowered, INTERESTS);

        let personality_traits = if FIRST_PERSON.iter().any(|p| contains_phrase(&lowered, p)) {
            labels_for(&lowered, TRAITS)
        } else {
            Vec::new()
        };

        let concerns = strongest_concern(text, &lowered).into_iter().collect();

        let mut events = Vec::new();
        for (phrase, significance) in EVENTS {
            if !contains_phrase(&lowered, phrase) {
                continue;
            }
            let clause = clause_containing(text, phrase);
            if events.iter().any(|e: &EventMention| e.event == clause) {
                continue;
            }
            events.push(EventMention {
                triggers: triggers_for(&clause, Some(phrase)),
                event: clause,
                significance: *significance,
            });
        }

        Insights {
            interests,
            personality_traits,
            concerns,
            events,
        }
    }
}

/// Unique labels whose phrase appears in `lowered`, in vocabulary order.
fn labels_for(lowered: &str, vocabulary: &[(&str, &str)]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for (phrase, label) in vocabulary {
        if contains_phrase(lowered, phrase) && !labels.iter().any(|l| l == label) {
            labels.push((*label).to_string());
        }
    }
    labels
}

/// At most one concern per utterance: the most urgent cue wins.
fn strongest_concern(text: &str, lowered: &str) -> Option<Concern> {
    let tiers: [(&[&str], Urgency); 3] = [
        (HIGH_URGENCY, Urgency::High),
        (MEDIUM_URGENCY, Urgency::Medium),
        (LOW_URGENCY, Urgency::Low),
    ];
    let (cue, urgency) = tiers.iter().find_map(|(vocabulary, urgency)| {
        vocabulary
            .iter()
            .find(|cue| contains_phrase(lowered, cue))
            .map(|cue| (*cue, *urgency))
    })?;

    let clause = clause_containing(text, cue);
    let clause_lower = clause.to_lowercase();
    let topic = TOPICS
        .iter()
        .find(|(phrase, _)| contains_phrase(&clause_lower, phrase))
        .map(|(_, label)| (*label).to_string());

    let description = match &topic {
        Some(topic) => format!("feeling {cue} about {topic}"),
        None => clause.clone(),
    };

    Some(Concern {
        triggers: triggers_for(&clause, topic.as_deref()),
        description,
        urgency,
        topic,
    })
}

/// The sentence or clause of `text` containing `phrase`, trimmed and capped.
fn clause_containing(text: &str, phrase: &str) -> String {
    let clause = text
        .split(['.', '!', '?', ';', '\n'])
        .find(|part| contains_phrase(&part.to_lowercase(), phrase))
        .unwrap_or(text)
        .trim();
    truncate_chars(clause, MAX_DESCRIPTION_CHARS)
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].trim_end().to_string(),
        None => s.to_string(),
    }
}

/// Keywords that could later bring a thread back up.
fn triggers_for(clause: &str, anchor: Option<&str>) -> Vec<String> {
    let mut triggers: Vec<String> = anchor.map(|a| vec![a.to_string()]).unwrap_or_default();
    for word in clause
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(str::to_lowercase)
    {
        if triggers.len() >= MAX_TRIGGERS {
            break;
        }
        if word.chars().count() > 3 && !STOPWORDS.contains(&word.as_str()) && !triggers.contains(&word)
        {
            triggers.push(word);
        }
    }
    triggers
}
