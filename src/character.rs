//! Read-only access to catbot identities.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::Character;

#[async_trait]
pub trait CharacterStore: Send + Sync {
    /// Look up a catbot. `Ok(None)` means it doesn't exist.
    async fn get(&self, catbot_id: &str) -> Result<Option<Character>>;
}

/// Fixed set of characters held in memory.
#[derive(Default)]
pub struct InMemoryCharacterStore {
    characters: HashMap<String, Character>,
}

impl InMemoryCharacterStore {
    pub fn with_characters(characters: impl IntoIterator<Item = Character>) -> Self {
        Self {
            characters: characters.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }
}

#[async_trait]
impl CharacterStore for InMemoryCharacterStore {
    async fn get(&self, catbot_id: &str) -> Result<Option<Character>> {
        Ok(self.characters.get(catbot_id).cloned())
    }
}
