use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::repos::user_repo::{UserLookup, UserRow};
use crate::services::auth::{AuthError, TokenCodec};

/// Turns a bearer token into the user it was issued for.
///
/// A missing user after a valid token is reported exactly like a bad
/// credential (`Unauthorized`), so callers cannot probe which ids exist.
#[derive(Clone, Debug)]
pub struct UserResolver {
    tokens: Arc<TokenCodec>,
}

impl UserResolver {
    pub fn new(tokens: Arc<TokenCodec>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &TokenCodec {
        &self.tokens
    }

    pub async fn resolve<S>(&self, token: &str, session: &mut S) -> Result<UserRow, AuthError>
    where
        S: UserLookup + ?Sized,
    {
        let claims = self.tokens.validate(token).inspect_err(|err| {
            warn!(error = %err, "access token verification failed");
        })?;
        let user_id = claims.user_id()?;

        let user = session
            .find_user_by_id(user_id)
            .await
            .map_err(|e| {
                error!(user_id, error = %e, "failed to load user for access token");
                AuthError::Internal(format!("failed to load user: {e}"))
            })?
            .ok_or_else(|| {
                warn!(user_id, "access token subject does not exist");
                AuthError::Unauthorized
            })?;

        if user.id != user_id {
            warn!(user_id, found = user.id, "user lookup returned a different id");
            return Err(AuthError::Unauthorized);
        }

        debug!(user_id, "access token resolved to user");
        Ok(user)
    }
}
