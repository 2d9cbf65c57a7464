//! Session-wide read-only registry: the catalog plus both derived indices.
//! Built once, in construction order (catalog, then character index, then
//! skill index), then shared via Arc across concurrent optimizer runs.

use std::sync::Arc;

use super::catalog::{CatalogError, GameCatalog};
use super::character_index::CharacterIndex;
use super::skill_index::SkillIndex;

#[derive(Debug)]
pub struct GameDataRegistry {
    catalog: GameCatalog,
    characters: CharacterIndex,
    skills: SkillIndex,
}

impl GameDataRegistry {
    /// Parse the game-data document and build the derived indices. Returns an
    /// Arc so the registry can be shared across worker threads; nothing is
    /// mutated after this returns.
    pub fn load(game_data_json: &str) -> Result<Arc<Self>, CatalogError> {
        let catalog = GameCatalog::parse(game_data_json)?;
        let characters = CharacterIndex::build(&catalog);
        let skills = SkillIndex::build(&catalog, &characters);
        Ok(Arc::new(GameDataRegistry {
            catalog,
            characters,
            skills,
        }))
    }

    pub fn catalog(&self) -> &GameCatalog {
        &self.catalog
    }

    pub fn characters(&self) -> &CharacterIndex {
        &self.characters
    }

    pub fn skills(&self) -> &SkillIndex {
        &self.skills
    }
}
