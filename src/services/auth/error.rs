use thiserror::Error;

/// Why a token or the user behind it was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("{detail}")]
    ExpiredToken { detail: String },

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("internal error: {0}")]
    Internal(String),
}
