pub mod buyer;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /buyers                      GET list, POST create
/// /buyers/export.csv           GET filtered CSV download
/// /buyers/import               POST CSV bulk import
/// /buyers/{id}                 GET detail (+recent history), PATCH update
/// /buyers/{id}/history         GET paginated history
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/buyers", buyer::router())
}
