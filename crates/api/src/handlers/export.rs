//! CSV export of buyer leads.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;

use leadbook_core::csv;
use leadbook_db::models::buyer::BuyerQuery;
use leadbook_db::repositories::BuyerRepo;

use crate::actor::Actor;
use crate::error::AppResult;
use crate::handlers::check_rate_limit;
use crate::ratelimit::RateLimitScope;
use crate::state::AppState;

/// GET /api/v1/buyers/export.csv
///
/// Accepts the same filters as the list endpoint; rows come back most
/// recently updated first, unpaginated.
pub async fn export_csv(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<BuyerQuery>,
) -> AppResult<impl IntoResponse> {
    check_rate_limit(&state, &actor, RateLimitScope::General)?;

    let buyers = BuyerRepo::list_for_export(&state.pool, &params).await?;
    let records: Vec<_> = buyers.iter().map(|b| b.record()).collect();
    let body = csv::encode(&records);

    tracing::info!(actor_id = actor.id, rows = buyers.len(), "CSV export");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"buyers.csv\"",
            ),
        ],
        body,
    ))
}
