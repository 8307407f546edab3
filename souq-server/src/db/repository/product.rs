//! Product Directory Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Product;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_key(&self, key: &str) -> RepoResult<Option<Product>> {
        let product: Option<Product> = self.base.db().select((TABLE, key)).await?;
        Ok(product)
    }

    pub async fn create(&self, key: &str, mut product: Product) -> RepoResult<Product> {
        product.id = None;
        let created: Option<Product> =
            self.base.db().create((TABLE, key)).content(product).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".into()))
    }
}
