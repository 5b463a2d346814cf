//! Pre-authored flavor lines a catbot may drop into conversation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpontaneousThought {
    pub id: Uuid,
    pub thought_content: String,
    /// Personality label this thought suits (e.g. "playful").
    pub personality_match: String,
    pub thought_category: String,
    pub usage_count: i32,
}

impl SpontaneousThought {
    pub fn new(
        thought_content: impl Into<String>,
        personality_match: impl Into<String>,
        thought_category: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            thought_content: thought_content.into(),
            personality_match: personality_match.into(),
            thought_category: thought_category.into(),
            usage_count: 0,
        }
    }
}
