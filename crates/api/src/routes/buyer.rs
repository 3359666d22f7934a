//! Route definitions for the `/buyers` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{buyer, export, history, import};
use crate::state::AppState;

/// Routes mounted at `/buyers`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(buyer::list).post(buyer::create))
        .route("/export.csv", get(export::export_csv))
        .route("/import", post(import::import_csv))
        .route("/{id}", get(buyer::get_by_id).patch(buyer::update))
        .route("/{id}/history", get(history::list_by_buyer))
}
