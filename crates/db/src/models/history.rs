//! Buyer change-history models.
//!
//! History rows are append-only: created once per successful mutation with
//! a non-empty diff (plus one creation sentinel per new buyer), never
//! updated, never deleted.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use leadbook_core::types::{DbId, Timestamp};

/// A single history entry. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BuyerHistory {
    pub id: DbId,
    pub buyer_id: DbId,
    pub changed_by: DbId,
    pub changed_at: Timestamp,
    /// Field name -> `{old, new}` pairs, or the creation sentinel
    /// `{"created": {"old": null, "new": true}}`.
    pub diff: serde_json::Value,
}

/// DTO for inserting a new history entry. Batch-friendly: the import
/// pipeline writes one creation sentinel per created row in one statement.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBuyerHistory {
    pub buyer_id: DbId,
    pub changed_by: DbId,
    pub diff: serde_json::Value,
}

/// Paginated response for history listings.
#[derive(Debug, Clone, Serialize)]
pub struct BuyerHistoryPage {
    pub items: Vec<BuyerHistory>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}
