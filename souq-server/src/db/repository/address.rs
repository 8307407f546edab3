//! Address Directory Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Address;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "address";

#[derive(Clone)]
pub struct AddressRepository {
    base: BaseRepository,
}

impl AddressRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_key(&self, key: &str) -> RepoResult<Option<Address>> {
        let address: Option<Address> = self.base.db().select((TABLE, key)).await?;
        Ok(address)
    }

    pub async fn create(&self, key: &str, mut address: Address) -> RepoResult<Address> {
        address.id = None;
        let created: Option<Address> =
            self.base.db().create((TABLE, key)).content(address).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create address".into()))
    }
}
