//! Handlers for the `/buyers` resource.
//!
//! The update flow is the heart of the service: fetch the stored snapshot,
//! authorize, validate the patch in isolation, merge and re-validate the
//! effective record, persist behind the optimistic-concurrency guard, then
//! append the field diff to the history trail. The record write always
//! lands before the history write; the two are deliberately not atomic
//! (losing a history entry to a crash is acceptable, corrupting the record
//! is not).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use leadbook_core::buyer::{BuyerPatch, CreateBuyer};
use leadbook_core::diff::{compute_diff, creation_sentinel};
use leadbook_core::error::CoreError;
use leadbook_core::types::{DbId, Timestamp};
use leadbook_core::validation::{validate_new, validate_patch, validate_record};
use leadbook_db::models::buyer::{Buyer, BuyerPage, BuyerQuery};
use leadbook_db::models::history::{BuyerHistory, CreateBuyerHistory};
use leadbook_db::repositories::{BuyerRepo, HistoryRepo};

use crate::actor::Actor;
use crate::error::{AppError, AppResult};
use crate::handlers::check_rate_limit;
use crate::ratelimit::RateLimitScope;
use crate::state::AppState;

/// How many recent history entries ride along on a buyer detail response.
const DETAIL_HISTORY_LIMIT: i64 = 5;

/// POST /api/v1/buyers
///
/// Validates the candidate, inserts it owned by the calling actor, then
/// appends the creation sentinel to the history trail.
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<CreateBuyer>,
) -> AppResult<(StatusCode, Json<Buyer>)> {
    check_rate_limit(&state, &actor, RateLimitScope::Mutation)?;

    let record = validate_new(&input)?;
    let buyer = BuyerRepo::create(&state.pool, actor.id, &record).await?;

    HistoryRepo::insert(
        &state.pool,
        &CreateBuyerHistory {
            buyer_id: buyer.id,
            changed_by: actor.id,
            diff: serde_json::to_value(creation_sentinel())
                .map_err(|e| CoreError::Internal(e.to_string()))?,
        },
    )
    .await?;

    tracing::info!(buyer_id = buyer.id, actor_id = actor.id, "Buyer created");
    Ok((StatusCode::CREATED, Json(buyer)))
}

/// Buyer detail response: the record plus its most recent history entries.
#[derive(Debug, Serialize)]
pub struct BuyerDetail {
    #[serde(flatten)]
    pub buyer: Buyer,
    pub history: Vec<BuyerHistory>,
}

/// GET /api/v1/buyers/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
) -> AppResult<Json<BuyerDetail>> {
    check_rate_limit(&state, &actor, RateLimitScope::General)?;

    let buyer = BuyerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Buyer",
            id,
        }))?;

    let history = HistoryRepo::list_by_buyer(&state.pool, id, DETAIL_HISTORY_LIMIT, 0).await?;

    Ok(Json(BuyerDetail { buyer, history }))
}

/// Partial update payload. `expected_updated_at` is the `updated_at` value
/// the client read; a mismatch against the stored row is a 409 and nothing
/// is written.
#[derive(Debug, Deserialize)]
pub struct UpdateBuyerRequest {
    pub expected_updated_at: Timestamp,
    #[serde(flatten)]
    pub patch: BuyerPatch,
}

/// PATCH /api/v1/buyers/{id}
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
    Json(request): Json<UpdateBuyerRequest>,
) -> AppResult<Json<Buyer>> {
    check_rate_limit(&state, &actor, RateLimitScope::Mutation)?;

    let stored = BuyerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Buyer",
            id,
        }))?;

    if !actor.may_edit(stored.owner_id) {
        return Err(CoreError::Forbidden(
            "Only the owner or an admin may edit this buyer".to_string(),
        )
        .into());
    }

    let patch = request.patch;
    if patch.is_empty() {
        // Nothing to change; return the stored row without bumping the
        // concurrency token.
        return Ok(Json(stored));
    }

    validate_patch(&patch)?;
    let old_record = stored.record();
    let merged = patch.apply(&old_record);
    validate_record(&merged)?;

    let updated =
        BuyerRepo::update_guarded(&state.pool, id, &merged, request.expected_updated_at)
            .await?
            .ok_or_else(|| {
                // The row existed a moment ago and buyers are never
                // deleted, so a missed guard means a concurrent writer won.
                AppError::Core(CoreError::Conflict(format!(
                    "Buyer {id} was modified concurrently; re-fetch and retry"
                )))
            })?;

    let diff = compute_diff(&old_record, &merged, &patch);
    if !diff.is_empty() {
        HistoryRepo::insert(
            &state.pool,
            &CreateBuyerHistory {
                buyer_id: id,
                changed_by: actor.id,
                diff: serde_json::to_value(&diff)
                    .map_err(|e| CoreError::Internal(e.to_string()))?,
            },
        )
        .await?;
        tracing::info!(
            buyer_id = id,
            actor_id = actor.id,
            changed_fields = diff.len(),
            "Buyer updated"
        );
    }

    Ok(Json(updated))
}

/// GET /api/v1/buyers
pub async fn list(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<BuyerQuery>,
) -> AppResult<Json<BuyerPage>> {
    check_rate_limit(&state, &actor, RateLimitScope::General)?;

    let page = params.page_number();
    let page_size = params.page_size_clamped();
    let (items, total) = BuyerRepo::list(&state.pool, &params).await?;

    Ok(Json(BuyerPage {
        items,
        total,
        page,
        page_size,
    }))
}
