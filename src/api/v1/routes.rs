/*
 * Responsibility
 * - URL layout of v1
 * - Authentication is per handler (CurrentUser extractor), not a route layer
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::users::me;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/users/me", get(me))
}
