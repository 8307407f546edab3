//! Sequence Number Generation
//!
//! Order numbers are day-scoped (`YYMMDD-NNNN`, UTC calendar date) and come
//! from an atomic per-day counter. Tracking numbers are opaque UUIDs.
//! Uniqueness of both is additionally enforced by unique indexes at the
//! storage layer; intake regenerates and retries when an insert collides.

use crate::db::repository::DayCounterRepository;
use crate::orders::error::OrderResult;
use chrono::{DateTime, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

#[derive(Clone)]
pub struct SequenceNumberGenerator {
    counters: DayCounterRepository,
}

impl SequenceNumberGenerator {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            counters: DayCounterRepository::new(db),
        }
    }

    /// Day bucket for `now`: the UTC calendar date as `YYMMDD`.
    pub fn day_key(now: DateTime<Utc>) -> String {
        now.format("%y%m%d").to_string()
    }

    /// Next order number for the day containing `now`.
    ///
    /// The counter guarantees uniqueness, not gap-free numbering: a retried
    /// insert leaves a hole in the sequence, which is acceptable.
    pub async fn next_order_number(&self, now: DateTime<Utc>) -> OrderResult<String> {
        let day = Self::day_key(now);
        let sequence = self.counters.increment(&day).await?;
        Ok(format!("{day}-{sequence:04}"))
    }

    /// Opaque globally unique tracking token.
    pub fn next_tracking_number(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// Storage key for a new order record.
    pub fn next_order_key(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use chrono::TimeZone;

    async fn generator() -> SequenceNumberGenerator {
        let db = DbService::open_in_memory().await.unwrap();
        SequenceNumberGenerator::new(db.db)
    }

    #[tokio::test]
    async fn numbers_are_sequential_within_a_day() {
        let generator = generator().await;
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap();
        assert_eq!(
            generator.next_order_number(now).await.unwrap(),
            "260805-0001"
        );
        assert_eq!(
            generator.next_order_number(now).await.unwrap(),
            "260805-0002"
        );
    }

    #[tokio::test]
    async fn day_buckets_are_independent() {
        let generator = generator().await;
        let monday = Utc.with_ymd_and_hms(2026, 8, 3, 23, 59, 59).unwrap();
        let tuesday = Utc.with_ymd_and_hms(2026, 8, 4, 0, 0, 0).unwrap();
        assert_eq!(
            generator.next_order_number(monday).await.unwrap(),
            "260803-0001"
        );
        assert_eq!(
            generator.next_order_number(tuesday).await.unwrap(),
            "260804-0001"
        );
        assert_eq!(
            generator.next_order_number(monday).await.unwrap(),
            "260803-0002"
        );
    }

    #[tokio::test]
    async fn concurrent_increments_never_collide() {
        let db = DbService::open_in_memory().await.unwrap();
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 9, 30, 0).unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let generator = SequenceNumberGenerator::new(db.db.clone());
            handles.push(tokio::spawn(async move {
                generator.next_order_number(now).await.unwrap()
            }));
        }

        let mut numbers = std::collections::HashSet::new();
        for handle in handles {
            assert!(
                numbers.insert(handle.await.unwrap()),
                "duplicate order number"
            );
        }
        assert_eq!(numbers.len(), 16);
    }

    #[tokio::test]
    async fn tracking_numbers_are_distinct() {
        let generator = generator().await;
        assert_ne!(
            generator.next_tracking_number(),
            generator.next_tracking_number()
        );
    }
}
