/*
 * Responsibility
 * - /users/me: the user behind the bearer token
 */
use axum::Json;

use crate::api::v1::{dto::users::UserResponse, extractors::CurrentUser};

pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}
