/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 * - Cheap to clone (PgPool / Arc inside)
 */
use std::sync::Arc;

use crate::db::Database;
use crate::services::auth::{TokenCodec, UserResolver};

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: Database,
    pub users: UserResolver,
}

impl AppState {
    pub fn new(db: Database, tokens: Arc<TokenCodec>) -> Self {
        Self {
            db,
            users: UserResolver::new(tokens),
        }
    }

    pub fn tokens(&self) -> &TokenCodec {
        self.users.tokens()
    }
}
