/*
 * Responsibility
 * - Own the process-wide PgPool (built once from DatabaseConfig)
 * - Hand out one DbSession per request
 * - A DbSession checks out a connection on first use and returns it when dropped,
 *   whatever the exit path
 */
use std::convert::Infallible;
use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sqlx::Postgres;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::repos::error::RepoResult;
use crate::state::AppState;

#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
    }

    /// Open the pool and establish the first connection.
    pub async fn connect(config: &DatabaseConfig) -> RepoResult<Self> {
        info!(url = %config.redacted_url(), "connecting to database");

        let pool = Self::pool_options(config)
            .connect_with(config.connect_options())
            .await?;

        info!("database connection established");
        Ok(Self { pool })
    }

    /// Build the pool without connecting. The first session query connects.
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        let pool = Self::pool_options(config).connect_lazy_with(config.connect_options());
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// A new request-scoped session. No connection is taken until it is used.
    pub fn acquire_session(&self) -> DbSession {
        DbSession {
            pool: self.pool.clone(),
            conn: None,
        }
    }
}

/// A request-scoped database session.
///
/// Holds at most one pooled connection; dropping the session returns it to the pool.
pub struct DbSession {
    pool: PgPool,
    conn: Option<PoolConnection<Postgres>>,
}

impl DbSession {
    /// The session's connection, checked out from the pool on first call.
    ///
    /// Fails with `RepoError::Db` when the pool cannot hand out a connection
    /// within its acquire timeout.
    pub async fn connection(&mut self) -> RepoResult<&mut PgConnection> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => {
                let conn = self.pool.acquire().await?;
                debug!("db connection checked out");
                conn
            }
        };

        Ok(&mut **self.conn.insert(conn))
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }
}

impl Drop for DbSession {
    fn drop(&mut self) {
        if self.conn.is_some() {
            debug!("db session released");
        }
    }
}

impl FromRequestParts<AppState> for DbSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(state.db.acquire_session())
    }
}
