//! Bulk CSV import pipeline.
//!
//! Policy is all-or-nothing: every row is validated first and ALL row
//! errors are reported together; only a fully clean batch reaches the
//! database, where the rows land in a single transaction. A storage
//! failure mid-batch therefore leaves zero rows inserted. Creation
//! sentinels are appended after the insert transaction commits (records
//! first, history second, never the other way around).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use leadbook_core::csv;
use leadbook_core::diff::creation_sentinel;
use leadbook_core::error::CoreError;
use leadbook_core::validation::{validate_new, ValidationErrors};
use leadbook_db::models::history::CreateBuyerHistory;
use leadbook_db::repositories::{BuyerRepo, HistoryRepo};

use crate::actor::Actor;
use crate::error::{AppError, AppResult};
use crate::handlers::check_rate_limit;
use crate::ratelimit::RateLimitScope;
use crate::state::AppState;

/// Hard cap on rows per import request.
pub const MAX_IMPORT_ROWS: usize = 200;

/// One failed rule on one row. `row` is 1-based (header excluded), the
/// numbering users see in their spreadsheet tool minus the header line.
#[derive(Debug, Clone, Serialize)]
pub struct ImportRowError {
    pub row: usize,
    pub message: String,
}

/// Import response: either everything was inserted or nothing was.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ImportOutcome {
    Inserted { inserted_count: usize },
    Failed { errors: Vec<ImportRowError> },
}

fn flatten_row_errors(row: usize, errors: ValidationErrors, out: &mut Vec<ImportRowError>) {
    for error in errors.0 {
        out.push(ImportRowError {
            row,
            message: error.message,
        });
    }
}

/// POST /api/v1/buyers/import
///
/// Body is the raw CSV document (`text/csv`), first line the header.
pub async fn import_csv(
    State(state): State<AppState>,
    actor: Actor,
    body: String,
) -> AppResult<(StatusCode, Json<ImportOutcome>)> {
    check_rate_limit(&state, &actor, RateLimitScope::Import)?;

    // The cap is checked before any row is decoded or validated: an
    // oversized batch fails with a single batch-level error.
    let data_rows = body
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .count();
    if data_rows > MAX_IMPORT_ROWS {
        return Err(CoreError::BatchLimit {
            max: MAX_IMPORT_ROWS,
            got: data_rows,
        }
        .into());
    }

    let rows = csv::decode(&body).map_err(AppError::BadRequest)?;

    let mut records = Vec::with_capacity(rows.len());
    let mut errors: Vec<ImportRowError> = Vec::new();

    for (index, candidate) in rows.into_iter().enumerate() {
        let row = index + 1;
        match candidate {
            Ok(input) => match validate_new(&input) {
                Ok(record) => records.push(record),
                Err(row_errors) => flatten_row_errors(row, row_errors, &mut errors),
            },
            Err(row_errors) => flatten_row_errors(row, row_errors, &mut errors),
        }
    }

    if !errors.is_empty() {
        tracing::info!(
            actor_id = actor.id,
            failed_rows = errors.len(),
            "CSV import rejected by validation"
        );
        return Ok((StatusCode::BAD_REQUEST, Json(ImportOutcome::Failed { errors })));
    }

    let created = BuyerRepo::insert_batch(&state.pool, actor.id, &records).await?;

    let sentinel = serde_json::to_value(creation_sentinel())
        .map_err(|e| CoreError::Internal(e.to_string()))?;
    let entries: Vec<CreateBuyerHistory> = created
        .iter()
        .map(|buyer| CreateBuyerHistory {
            buyer_id: buyer.id,
            changed_by: actor.id,
            diff: sentinel.clone(),
        })
        .collect();
    HistoryRepo::batch_insert(&state.pool, &entries).await?;

    tracing::info!(
        actor_id = actor.id,
        inserted = created.len(),
        "CSV import committed"
    );

    Ok((
        StatusCode::OK,
        Json(ImportOutcome::Inserted {
            inserted_count: created.len(),
        }),
    ))
}
