//! Character use-case service.

use crate::model::character::Character;
use crate::repo::character_repo::CharacterRepository;
use crate::service::error::ServiceResult;
use log::info;

/// Use-case service for user-owned characters.
pub struct CharacterService<R: CharacterRepository> {
    repo: R,
}

impl<R: CharacterRepository> CharacterService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Attaches a character to a user. The stored name is trimmed.
    pub fn add_character_to_user(
        &self,
        user_id: &str,
        character_name: &str,
    ) -> ServiceResult<Character> {
        let character = self.repo.add_character_to_user(user_id, character_name)?;
        info!(
            "event=character_add module=character_service status=ok user_id={}",
            character.user_id
        );
        Ok(character)
    }

    /// Lists characters of one user; empty when the user has none.
    pub fn get_characters_for_user(&self, user_id: &str) -> ServiceResult<Vec<Character>> {
        Ok(self.repo.get_characters_for_user(user_id)?)
    }
}
