//! Repository for the `buyer_history` table.
//!
//! History is append-only: this module exposes inserts and reads only.
//! Listing order is `changed_at` descending with ties broken by insertion
//! order (`id` descending), so the newest entry is always first.

use sqlx::PgPool;

use leadbook_core::types::DbId;

use crate::models::history::{BuyerHistory, CreateBuyerHistory};

/// Column list for `buyer_history` SELECT queries.
const COLUMNS: &str = "id, buyer_id, changed_by, changed_at, diff";

/// Column list for INSERT (excludes auto-generated `id` and `changed_at`).
const INSERT_COLUMNS: &str = "buyer_id, changed_by, diff";

/// Provides append and query operations for buyer change history.
pub struct HistoryRepo;

impl HistoryRepo {
    /// Append a single history entry, returning the created row.
    pub async fn insert(
        pool: &PgPool,
        entry: &CreateBuyerHistory,
    ) -> Result<BuyerHistory, sqlx::Error> {
        let query = format!(
            "INSERT INTO buyer_history ({INSERT_COLUMNS}) VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BuyerHistory>(&query)
            .bind(entry.buyer_id)
            .bind(entry.changed_by)
            .bind(&entry.diff)
            .fetch_one(pool)
            .await
    }

    /// Batch append multiple entries (one statement, multiple value rows).
    ///
    /// Used by the import pipeline to write one creation sentinel per
    /// created buyer.
    pub async fn batch_insert(
        pool: &PgPool,
        entries: &[CreateBuyerHistory],
    ) -> Result<Vec<BuyerHistory>, sqlx::Error> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = format!("INSERT INTO buyer_history ({INSERT_COLUMNS}) VALUES ");
        let mut param_idx = 1u32;
        for i in 0..entries.len() {
            if i > 0 {
                query.push_str(", ");
            }
            query.push_str(&format!(
                "(${}, ${}, ${})",
                param_idx,
                param_idx + 1,
                param_idx + 2
            ));
            param_idx += 3;
        }
        query.push_str(&format!(" RETURNING {COLUMNS}"));

        let mut q = sqlx::query_as::<_, BuyerHistory>(&query);
        for entry in entries {
            q = q
                .bind(entry.buyer_id)
                .bind(entry.changed_by)
                .bind(&entry.diff);
        }

        q.fetch_all(pool).await
    }

    /// List history entries for one buyer, newest first.
    pub async fn list_by_buyer(
        pool: &PgPool,
        buyer_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BuyerHistory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM buyer_history
             WHERE buyer_id = $1
             ORDER BY changed_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, BuyerHistory>(&query)
            .bind(buyer_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count history entries for one buyer (for pagination metadata).
    pub async fn count_by_buyer(pool: &PgPool, buyer_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM buyer_history WHERE buyer_id = $1",
        )
        .bind(buyer_id)
        .fetch_one(pool)
        .await
    }
}
