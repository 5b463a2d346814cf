//! Character lookups against the `catbots` table.

use async_trait::async_trait;

use crate::character::CharacterStore;
use crate::error::Result;
use crate::model::Character;

#[derive(sqlx::FromRow)]
struct CharacterRow {
    id: String,
    name: String,
    background: Option<String>,
    personality: Option<String>,
}

impl From<CharacterRow> for Character {
    fn from(row: CharacterRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            background: row.background,
            personality: row.personality,
        }
    }
}

#[async_trait]
impl CharacterStore for super::Db {
    async fn get(&self, catbot_id: &str) -> Result<Option<Character>> {
        let row: Option<CharacterRow> = sqlx::query_as(
            "SELECT id, name, background, personality FROM catbots WHERE id = $1",
        )
        .bind(catbot_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Character::from))
    }
}
