//! Buyer row model and list query parameters.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use leadbook_core::buyer::{
    Bhk, BuyerRecord, BuyerStatus, City, LeadSource, PropertyType, Purpose, Timeline,
};
use leadbook_core::types::{DbId, Timestamp};

/// A buyer row from the `buyers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Buyer {
    pub id: DbId,
    pub owner_id: DbId,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub city: City,
    pub property_type: PropertyType,
    pub bhk: Option<Bhk>,
    pub purpose: Purpose,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub timeline: Timeline,
    pub source: LeadSource,
    pub status: BuyerStatus,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    /// Bumped on every successful mutation; doubles as the
    /// optimistic-concurrency token.
    pub updated_at: Timestamp,
}

impl Buyer {
    /// The domain snapshot of this row, as the validator and diff engine
    /// consume it.
    pub fn record(&self) -> BuyerRecord {
        BuyerRecord {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            city: self.city,
            property_type: self.property_type,
            bhk: self.bhk,
            purpose: self.purpose,
            budget_min: self.budget_min,
            budget_max: self.budget_max,
            timeline: self.timeline,
            source: self.source,
            status: self.status,
            notes: self.notes.clone(),
            tags: self.tags.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// List query parameters
// ---------------------------------------------------------------------------

/// Sortable columns for buyer listings. A closed set so the ORDER BY clause
/// is never built from caller-supplied text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuyerSortField {
    FullName,
    City,
    Status,
    BudgetMin,
    BudgetMax,
    CreatedAt,
    UpdatedAt,
}

impl BuyerSortField {
    /// The column name for the ORDER BY clause.
    pub fn column(self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::City => "city",
            Self::Status => "status",
            Self::BudgetMin => "budget_min",
            Self::BudgetMax => "budget_max",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Filter, sort, and pagination parameters for buyer listings.
///
/// The exact-match filters are ANDed together; `search` matches
/// case-insensitively as a substring of full_name, email, or phone (OR
/// among those three) and is ANDed with the exact filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuyerQuery {
    pub status: Option<BuyerStatus>,
    pub city: Option<City>,
    pub property_type: Option<PropertyType>,
    pub timeline: Option<Timeline>,
    pub search: Option<String>,
    pub sort: Option<BuyerSortField>,
    pub order: Option<SortOrder>,
    /// 1-based page number.
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Default page size for buyer listings.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size for buyer listings.
pub const MAX_PAGE_SIZE: i64 = 100;

impl BuyerQuery {
    /// 1-based page number with the default applied.
    pub fn page_number(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size with default and bounds applied.
    pub fn page_size_clamped(&self) -> i64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

/// Paginated response for buyer listings.
#[derive(Debug, Clone, Serialize)]
pub struct BuyerPage {
    pub items: Vec<Buyer>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}
