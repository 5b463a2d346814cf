//! Context Fusion: turns character identity, the turn's emotional read,
//! relationship memory, open threads, and an optional spontaneous thought
//! into one bounded system instruction.
//!
//! Sections are emitted in a fixed order:
//! 1. identity, personality, operator background (verbatim)
//! 2. emotional context, with threshold-gated guidance
//! 3. relationship memory
//! 4. open threads
//! 5. spontaneous thought (stochastic)
//! 6. fixed behavioral rules
//!
//! Missing data never fails rendering; the section is simply left out.

use std::fmt::Write as _;

use rand::Rng;

use crate::model::*;

pub const SUPPORT_GUIDANCE: &str = "They may be going through something difficult. Lead with warmth and gentle support before anything playful.";
pub const HIGH_ENERGY_GUIDANCE: &str =
    "They are full of energy right now. Match their enthusiasm.";
pub const LOW_ENERGY_GUIDANCE: &str = "They seem low on energy. Keep it soft and easy.";

const INTEREST_SLICE: usize = 3;
const TRAIT_SLICE: usize = 3;
const PROBLEM_SLICE: usize = 2;

const RULES: &str = "\
Rules:
- Stay in character as a cat. Speak casually, with the occasional cat mannerism.
- Keep replies under 3 short sentences.
- Always end your reply with a question for them.
- Never describe yourself as an AI, a language model, or a bot, and never narrate your own personality.";

/// Relationship band for a depth in 1..=10.
pub fn relationship_label(depth: i32) -> &'static str {
    match depth {
        ..=2 => "getting acquainted",
        3..=4 => "becoming friends",
        5..=6 => "good friends",
        7..=8 => "close friends",
        _ => "very close bond",
    }
}

/// What the synthesizer reads for one turn.
#[derive(Debug, Clone, Copy)]
pub struct PromptInputs<'a> {
    pub character: &'a Character,
    pub emotion: &'a EmotionalContext,
    pub profile: Option<&'a UserMemoryProfile>,
    pub threads: &'a [ConversationContext],
    pub thought: Option<&'a SpontaneousThought>,
}

#[derive(Debug, Clone)]
pub struct PromptSynthesizer {
    thought_inclusion_chance: f64,
    history_window: usize,
    thread_limit: usize,
}

impl Default for PromptSynthesizer {
    fn default() -> Self {
        Self::new(0.30, 20, 2)
    }
}

impl PromptSynthesizer {
    pub fn new(thought_inclusion_chance: f64, history_window: usize, thread_limit: usize) -> Self {
        Self {
            thought_inclusion_chance: thought_inclusion_chance.clamp(0.0, 1.0),
            history_window,
            thread_limit,
        }
    }

    /// Build the system instruction. A supplied thought is included with
    /// the configured chance.
    pub fn synthesize(&self, inputs: &PromptInputs<'_>) -> String {
        self.render(inputs, self.roll_thought(inputs.thought.is_some()))
    }

    /// Decide whether a selected thought makes it into this turn's prompt.
    pub fn roll_thought(&self, have_thought: bool) -> bool {
        have_thought && rand::rng().random_bool(self.thought_inclusion_chance)
    }

    /// Deterministic rendering with the thought decision made by the caller.
    pub fn render(&self, inputs: &PromptInputs<'_>, include_thought: bool) -> String {
        let mut prompt = String::new();

        render_identity(&mut prompt, inputs.character);
        render_emotion(&mut prompt, inputs.emotion);
        if let Some(profile) = inputs.profile {
            render_memory(&mut prompt, profile);
        }
        self.render_threads(&mut prompt, inputs.threads);
        if let (true, Some(thought)) = (include_thought, inputs.thought) {
            let _ = writeln!(
                prompt,
                "A passing thought you might weave in if it fits: \"{}\"\n",
                thought.thought_content.trim()
            );
        }
        prompt.push_str(RULES);
        prompt
    }

    /// Last `history_window` turns plus the new user message.
    ///
    /// A turn opens at a user message and runs through the replies that
    /// follow it, so the window always starts on a user message. Empty
    /// entries are dropped.
    pub fn conversation(&self, history: &[ChatMessage], user_message: &str) -> Vec<ChatMessage> {
        let usable: Vec<&ChatMessage> = history
            .iter()
            .filter(|m| !m.content.trim().is_empty())
            .collect();

        let mut turn_starts = usable
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, m)| m.role == Role::User)
            .map(|(i, _)| i);
        let start = match self.history_window.checked_sub(1) {
            Some(nth) => turn_starts
                .nth(nth)
                .or_else(|| usable.iter().position(|m| m.role == Role::User)),
            None => None,
        }
        .unwrap_or(usable.len());

        let mut messages: Vec<ChatMessage> =
            usable[start..].iter().map(|m| (*m).clone()).collect();
        messages.push(ChatMessage::user(user_message.trim()));
        messages
    }

    fn render_threads(&self, prompt: &mut String, threads: &[ConversationContext]) {
        let mut active: Vec<&ConversationContext> = threads
            .iter()
            .filter(|t| t.status == ThreadStatus::Active)
            .collect();
        active.sort_by(|a, b| b.thread_priority.cmp(&a.thread_priority));
        active.truncate(self.thread_limit);
        if active.is_empty() {
            return;
        }

        prompt.push_str("Open threads you could gently follow up on:\n");
        for thread in active {
            let _ = writeln!(prompt, "- {}", thread.context_data.description.trim());
        }
        prompt.push('\n');
    }
}

fn render_identity(prompt: &mut String, character: &Character) {
    let name = character.name.trim();
    let name = if name.is_empty() { "Catbot" } else { name };
    let _ = writeln!(
        prompt,
        "You are {name}, a cat with a {} personality, chatting with a human friend.",
        character.personality_label()
    );
    if let Some(background) = character.background.as_deref().filter(|b| !b.trim().is_empty()) {
        let _ = writeln!(prompt, "Background: {background}");
    }
    prompt.push('\n');
}

fn render_emotion(prompt: &mut String, emotion: &EmotionalContext) {
    let _ = writeln!(
        prompt,
        "Emotional context: they seem {} with {} energy.",
        emotion.emotion, emotion.energy_level
    );
    if emotion.support_needed {
        let _ = writeln!(prompt, "{SUPPORT_GUIDANCE}");
    }
    match emotion.energy_level {
        EnergyLevel::High => {
            let _ = writeln!(prompt, "{HIGH_ENERGY_GUIDANCE}");
        }
        EnergyLevel::Low => {
            let _ = writeln!(prompt, "{LOW_ENERGY_GUIDANCE}");
        }
        EnergyLevel::Medium => {}
    }
    prompt.push('\n');
}

fn render_memory(prompt: &mut String, profile: &UserMemoryProfile) {
    let _ = writeln!(
        prompt,
        "What you remember about them (relationship: {}).",
        relationship_label(profile.relationship_depth)
    );
    if !profile.interests.is_empty() {
        let _ = writeln!(
            prompt,
            "- They enjoy: {}",
            join_slice(&profile.interests, INTEREST_SLICE)
        );
    }
    if !profile.personality_traits.is_empty() {
        let _ = writeln!(
            prompt,
            "- They come across as: {}",
            join_slice(&profile.personality_traits, TRAIT_SLICE)
        );
    }
    let open: Vec<&str> = profile
        .open_problems()
        .map(|p| p.description.as_str())
        .collect();
    if !open.is_empty() {
        let recent = &open[open.len().saturating_sub(PROBLEM_SLICE)..];
        let _ = writeln!(prompt, "- On their mind lately: {}", recent.join("; "));
    }
    prompt.push('\n');
}

fn join_slice(items: &[String], n: usize) -> String {
    items.iter().take(n).map(String::as_str).collect::<Vec<_>>().join(", ")
}
