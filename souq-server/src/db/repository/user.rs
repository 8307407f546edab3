//! User Directory Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::User;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_key(&self, key: &str) -> RepoResult<Option<User>> {
        let user: Option<User> = self.base.db().select((TABLE, key)).await?;
        Ok(user)
    }

    pub async fn create(&self, key: &str, mut user: User) -> RepoResult<User> {
        user.id = None;
        let created: Option<User> = self.base.db().create((TABLE, key)).content(user).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".into()))
    }
}
