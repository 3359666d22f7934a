//! Repository for the `buyers` table.

use sqlx::PgPool;

use leadbook_core::buyer::BuyerRecord;
use leadbook_core::types::{DbId, Timestamp};

use crate::models::buyer::{Buyer, BuyerQuery, BuyerSortField, SortOrder};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, owner_id, full_name, email, phone, city, property_type, bhk, \
    purpose, budget_min, budget_max, timeline, source, status, notes, \
    tags, created_at, updated_at";

/// Record-field column list for INSERT (excludes auto-generated columns).
const INSERT_COLUMNS: &str = "\
    owner_id, full_name, email, phone, city, property_type, bhk, purpose, \
    budget_min, budget_max, timeline, source, status, notes, tags";

/// Provides CRUD, optimistic-concurrency update, and list operations for
/// buyer leads.
pub struct BuyerRepo;

impl BuyerRepo {
    /// Insert a new buyer owned by `owner_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        record: &BuyerRecord,
    ) -> Result<Buyer, sqlx::Error> {
        let query = format!(
            "INSERT INTO buyers ({INSERT_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {COLUMNS}"
        );
        bind_record(sqlx::query_as::<_, Buyer>(&query).bind(owner_id), record)
            .fetch_one(pool)
            .await
    }

    /// Find a buyer by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Buyer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM buyers WHERE id = $1");
        sqlx::query_as::<_, Buyer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Persist the merged effective record, guarded by the caller's
    /// `updated_at` snapshot (compare-and-swap).
    ///
    /// Returns `None` when no row matched: either the ID does not exist or
    /// the stored `updated_at` no longer equals `expected_updated_at`.
    /// Since buyers are never deleted, a caller that just fetched the row
    /// can read `None` as a concurrency conflict.
    ///
    /// The new `updated_at` is strictly greater than the old one even
    /// within a single clock tick, so the token always moves forward.
    pub async fn update_guarded(
        pool: &PgPool,
        id: DbId,
        record: &BuyerRecord,
        expected_updated_at: Timestamp,
    ) -> Result<Option<Buyer>, sqlx::Error> {
        let query = format!(
            "UPDATE buyers SET
                full_name = $3, email = $4, phone = $5, city = $6,
                property_type = $7, bhk = $8, purpose = $9, budget_min = $10,
                budget_max = $11, timeline = $12, source = $13, status = $14,
                notes = $15, tags = $16,
                updated_at = GREATEST(NOW(), updated_at + interval '1 microsecond')
             WHERE id = $1 AND updated_at = $2
             RETURNING {COLUMNS}"
        );
        bind_record(
            sqlx::query_as::<_, Buyer>(&query)
                .bind(id)
                .bind(expected_updated_at),
            record,
        )
        .fetch_optional(pool)
        .await
    }

    /// List buyers with filtering, sorting, and offset pagination.
    ///
    /// Returns the page of rows plus the total count matching the filter.
    /// Sorting always tie-breaks on `id ASC` so pages are stable.
    pub async fn list(
        pool: &PgPool,
        params: &BuyerQuery,
    ) -> Result<(Vec<Buyer>, i64), sqlx::Error> {
        let page = params.page_number();
        let page_size = params.page_size_clamped();
        let offset = (page - 1) * page_size;

        let (where_clause, bind_values, bind_idx) = build_filter(params);

        // Unspecified sort means "most recently touched first".
        let sort = params.sort.unwrap_or(BuyerSortField::UpdatedAt);
        let order = params.order.unwrap_or(if params.sort.is_none() {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        });

        let query = format!(
            "SELECT {COLUMNS} FROM buyers {where_clause} \
             ORDER BY {} {}, id ASC \
             LIMIT ${bind_idx} OFFSET ${}",
            sort.column(),
            order.as_sql(),
            bind_idx + 1
        );

        let mut q = sqlx::query_as::<_, Buyer>(&query);
        for value in &bind_values {
            q = q.bind(value.as_str());
        }
        let items = q.bind(page_size).bind(offset).fetch_all(pool).await?;

        let count_query = format!("SELECT COUNT(*)::BIGINT FROM buyers {where_clause}");
        let mut q = sqlx::query_scalar::<_, i64>(&count_query);
        for value in &bind_values {
            q = q.bind(value.as_str());
        }
        let total = q.fetch_one(pool).await?;

        Ok((items, total))
    }

    /// List every buyer matching the exact filters, most recently updated
    /// first, without pagination. Used by the CSV export.
    pub async fn list_for_export(
        pool: &PgPool,
        params: &BuyerQuery,
    ) -> Result<Vec<Buyer>, sqlx::Error> {
        let (where_clause, bind_values, _) = build_filter(params);

        let query = format!(
            "SELECT {COLUMNS} FROM buyers {where_clause} ORDER BY updated_at DESC, id ASC"
        );

        let mut q = sqlx::query_as::<_, Buyer>(&query);
        for value in &bind_values {
            q = q.bind(value.as_str());
        }
        q.fetch_all(pool).await
    }

    /// Insert a batch of validated records in a single transaction.
    ///
    /// All-or-nothing: any failure rolls the whole batch back and zero rows
    /// remain inserted.
    pub async fn insert_batch(
        pool: &PgPool,
        owner_id: DbId,
        records: &[BuyerRecord],
    ) -> Result<Vec<Buyer>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut created = Vec::with_capacity(records.len());

        let query = format!(
            "INSERT INTO buyers ({INSERT_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {COLUMNS}"
        );
        for record in records {
            let buyer = bind_record(sqlx::query_as::<_, Buyer>(&query).bind(owner_id), record)
                .fetch_one(&mut *tx)
                .await?;
            created.push(buyer);
        }

        tx.commit().await?;
        Ok(created)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Bind the fourteen record fields, in `INSERT_COLUMNS` order, after
/// whatever leading binds the statement already has.
fn bind_record<'q>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, Buyer, sqlx::postgres::PgArguments>,
    record: &'q BuyerRecord,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, Buyer, sqlx::postgres::PgArguments> {
    q.bind(&record.full_name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(record.city)
        .bind(record.property_type)
        .bind(record.bhk)
        .bind(record.purpose)
        .bind(record.budget_min)
        .bind(record.budget_max)
        .bind(record.timeline)
        .bind(record.source)
        .bind(record.status)
        .bind(&record.notes)
        .bind(&record.tags)
}

/// Build a WHERE clause and bind values from the list filters.
///
/// Returns `(where_clause, bind_values, next_bind_index)`. All filter
/// values bind as text: the enum filters bind their wire strings and the
/// search term binds a single `%term%` pattern shared by the three ILIKE
/// comparisons.
fn build_filter(params: &BuyerQuery) -> (String, Vec<String>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<String> = Vec::new();

    if let Some(status) = params.status {
        conditions.push(format!("status = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(status.as_str().to_string());
    }

    if let Some(city) = params.city {
        conditions.push(format!("city = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(city.as_str().to_string());
    }

    if let Some(property_type) = params.property_type {
        conditions.push(format!("property_type = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(property_type.as_str().to_string());
    }

    if let Some(timeline) = params.timeline {
        conditions.push(format!("timeline = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(timeline.as_str().to_string());
    }

    if let Some(search) = params.search.as_deref().filter(|s| !s.trim().is_empty()) {
        conditions.push(format!(
            "(full_name ILIKE ${bind_idx} OR email ILIKE ${bind_idx} OR phone ILIKE ${bind_idx})"
        ));
        bind_idx += 1;
        bind_values.push(format!("%{}%", search.trim()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}
