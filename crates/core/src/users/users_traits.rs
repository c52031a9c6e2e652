//! User repository trait.

use async_trait::async_trait;

use super::{NewUser, User};
use crate::errors::Result;

#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Creates a user row. Used by onboarding glue and seeding.
    async fn create(&self, new_user: NewUser) -> Result<User>;

    fn get_by_id(&self, user_id: &str) -> Result<Option<User>>;

    /// Resolves a bearer token to its user, or `None` for unknown tokens.
    fn get_by_token(&self, token: &str) -> Result<Option<User>>;

    /// All user ids, for the risk sweep.
    fn list_ids(&self) -> Result<Vec<String>>;
}
