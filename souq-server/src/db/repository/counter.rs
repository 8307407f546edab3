//! Day Counter Repository
//!
//! One record per calendar day (`day_counter:<YYMMDD>`). The sequence value
//! advances through a single atomic increment-and-fetch statement; counting
//! existing orders and adding one would race between concurrent creations.

use super::{BaseRepository, RepoError, RepoResult};
use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "day_counter";

/// Bounded retries for optimistic write conflicts on the same day key.
const MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Deserialize)]
struct CounterRow {
    value: i64,
}

#[derive(Clone)]
pub struct DayCounterRepository {
    base: BaseRepository,
}

impl DayCounterRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Increment the counter for `day_key` and return the new value (1-based).
    ///
    /// The embedded engine can report an optimistic write conflict when two
    /// increments land on the same key at once; those are retried here so
    /// callers always see a plain monotonic value.
    pub async fn increment(&self, day_key: &str) -> RepoResult<i64> {
        let mut last_error = None;
        for _ in 0..MAX_ATTEMPTS {
            match self.try_increment(day_key).await {
                Ok(value) => return Ok(value),
                Err(RepoError::Database(msg)) if msg.to_lowercase().contains("conflict") => {
                    last_error = Some(RepoError::Database(msg));
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_error
            .unwrap_or_else(|| RepoError::Database("Day counter increment failed".into())))
    }

    async fn try_increment(&self, day_key: &str) -> RepoResult<i64> {
        let record = RecordId::from_table_key(TABLE, day_key);
        let mut result = self
            .base
            .db()
            .query("UPSERT $record SET value = (value ?? 0) + 1 RETURN AFTER")
            .bind(("record", record))
            .await?;
        let rows: Vec<CounterRow> = result.take(0)?;
        rows.first()
            .map(|row| row.value)
            .ok_or_else(|| RepoError::Database("Day counter upsert returned no row".into()))
    }

    /// Current value without advancing; 0 when the day has no orders yet.
    pub async fn current(&self, day_key: &str) -> RepoResult<i64> {
        let row: Option<CounterRow> = self.base.db().select((TABLE, day_key)).await?;
        Ok(row.map(|r| r.value).unwrap_or(0))
    }
}
