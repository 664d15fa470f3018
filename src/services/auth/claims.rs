use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::services::auth::AuthError;

/// Access token payload.
///
/// Free-form key/value pairs. Tokens this service accepts always carry
/// `exp` (epoch seconds) and `user_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub const EXP: &'static str = "exp";
    pub const USER_ID: &'static str = "user_id";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_user(user_id: i64) -> Self {
        let mut claims = Self::new();
        claims.insert(Self::USER_ID, user_id);
        claims
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn exp(&self) -> Option<i64> {
        self.0.get(Self::EXP).and_then(Value::as_i64)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp().and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// The subject. Accepts a JSON integer or a decimal string.
    pub fn user_id(&self) -> Result<i64, AuthError> {
        match self.0.get(Self::USER_ID) {
            None | Some(Value::Null) => Err(AuthError::InvalidToken(format!(
                "missing required claim: {}",
                Self::USER_ID
            ))),
            Some(Value::Number(n)) => n.as_i64().ok_or_else(Self::bad_user_id),
            Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| Self::bad_user_id()),
            Some(_) => Err(Self::bad_user_id()),
        }
    }

    fn bad_user_id() -> AuthError {
        AuthError::InvalidToken(format!("claim {} is not a valid user id", Self::USER_ID))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
