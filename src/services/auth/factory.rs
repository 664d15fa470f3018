/// Factory: build the shared `TokenCodec` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::TokenCodec;

pub fn build_token_codec(config: &Config) -> Result<Arc<TokenCodec>, AppError> {
    let codec = TokenCodec::new(&config.token).map_err(|e| {
        tracing::error!(error = %e, "invalid token signing configuration");
        AppError::Internal
    })?;

    Ok(Arc::new(codec))
}
