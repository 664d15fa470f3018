use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::repos::user_repo::UserRow;
use crate::state::AppState;

use super::BearerToken;

/// The user the request's access token was issued for.
///
/// Order: bearer header -> token validation -> user lookup. The session only
/// checks out a connection for the lookup, so bad tokens never touch the pool,
/// and it is dropped (returned to the pool) before the handler runs.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRow);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let mut session = state.db.acquire_session();

        let user = state.users.resolve(&token, &mut session).await?;
        Ok(CurrentUser(user))
    }
}
