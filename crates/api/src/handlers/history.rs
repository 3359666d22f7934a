//! Handlers for the `/buyers/{id}/history` sub-resource.
//!
//! History is read-only over HTTP: entries are appended internally by the
//! create/update/import flows and never edited or removed.

use axum::extract::{Path, Query, State};
use axum::Json;

use leadbook_core::error::CoreError;
use leadbook_core::types::DbId;
use leadbook_db::models::history::BuyerHistoryPage;
use leadbook_db::repositories::{BuyerRepo, HistoryRepo};

use crate::actor::Actor;
use crate::error::{AppError, AppResult};
use crate::handlers::check_rate_limit;
use crate::query::PaginationParams;
use crate::ratelimit::RateLimitScope;
use crate::state::AppState;

/// Default page size for history listings.
const DEFAULT_LIMIT: i64 = 5;

/// Maximum page size for history listings.
const MAX_LIMIT: i64 = 100;

/// GET /api/v1/buyers/{id}/history
pub async fn list_by_buyer(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<BuyerHistoryPage>> {
    check_rate_limit(&state, &actor, RateLimitScope::General)?;

    // Existence check so an unknown buyer is a 404, not an empty page.
    if BuyerRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Buyer",
            id,
        }));
    }

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = (page - 1) * limit;

    let items = HistoryRepo::list_by_buyer(&state.pool, id, limit, offset).await?;
    let total = HistoryRepo::count_by_buyer(&state.pool, id).await?;

    Ok(Json(BuyerHistoryPage {
        items,
        total,
        page,
        page_size: limit,
    }))
}
