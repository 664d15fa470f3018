use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::config::TokenConfig;
use crate::services::auth::{AuthError, Claims};

/// Issues and validates HMAC-signed access tokens.
///
/// - `exp` is always set by `issue` and always required by `validate`.
/// - Expiry is checked with zero leeway.
/// - Key material is not printable via Debug.
#[derive(Clone)]
pub struct TokenCodec {
    algorithm: Algorithm,
    ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    // Same as `validation` minus the expiry check. Only used to describe expired tokens.
    expired_validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(config: &TokenConfig) -> Result<Self, AuthError> {
        if !matches!(
            config.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            warn!(algorithm = ?config.algorithm, "shared-secret tokens need an HMAC algorithm");
            return Err(AuthError::Internal(format!(
                "unsupported signing algorithm {:?}",
                config.algorithm
            )));
        }

        let ttl = Duration::try_minutes(config.access_token_expire_minutes)
            .filter(|ttl| *ttl > Duration::zero())
            .ok_or_else(|| {
                AuthError::Internal(format!(
                    "token lifetime of {} minutes is out of range",
                    config.access_token_expire_minutes
                ))
            })?;

        let secret = config.secret_key.as_bytes();

        let mut validation = Validation::new(config.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&[Claims::EXP]);

        let mut expired_validation = validation.clone();
        expired_validation.validate_exp = false;

        Ok(Self {
            algorithm: config.algorithm,
            ttl,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            expired_validation,
        })
    }

    /// Token lifetime in seconds.
    pub fn expires_in_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Sign `claims` with `exp = now + ttl`.
    ///
    /// `claims` must serialize to a JSON object. A caller-supplied `exp` is overwritten.
    pub fn issue<T: Serialize + ?Sized>(&self, claims: &T) -> Result<String, AuthError> {
        self.issue_at(claims, Utc::now())
    }

    /// Same as `issue`, with the issuance instant given explicitly.
    pub fn issue_at<T: Serialize + ?Sized>(
        &self,
        claims: &T,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let mut payload: Map<String, Value> = match serde_json::to_value(claims) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                error!(kind = json_kind(&other), "token claims are not a JSON object");
                return Err(AuthError::Internal(
                    "token claims must be a JSON object".to_string(),
                ));
            }
            Err(e) => {
                error!(error = %e, "failed to serialize token claims");
                return Err(AuthError::Internal(format!(
                    "failed to serialize token claims: {e}"
                )));
            }
        };

        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| {
                error!(ttl = ?self.ttl, "token expiry overflows the calendar");
                AuthError::Internal("token expiry is out of range".to_string())
            })?
            .timestamp();
        payload.insert(Claims::EXP.to_string(), Value::from(exp));

        let token = jsonwebtoken::encode(&Header::new(self.algorithm), &payload, &self.encoding_key)
            .map_err(|e| {
                error!(error = %e, "failed to sign JWT");
                AuthError::Internal(format!("failed to sign token: {e}"))
            })?;

        debug!(exp, "access token issued");
        Ok(token)
    }

    pub fn issue_for_user(&self, user_id: i64) -> Result<String, AuthError> {
        self.issue(&Claims::for_user(user_id))
    }

    /// Verify signature, algorithm and expiry, then require a usable `user_id`.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = match jsonwebtoken::decode::<Map<String, Value>>(
            token,
            &self.decoding_key,
            &self.validation,
        ) {
            Ok(data) => Claims::from(data.claims),
            Err(e) => return Err(self.classify(token, e)),
        };

        claims.user_id()?;
        Ok(claims)
    }

    fn classify(&self, token: &str, e: JwtError) -> AuthError {
        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken {
                detail: self.describe_expired(token),
            },
            ErrorKind::InvalidEcdsaKey | ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
                error!(error = %e, "token key failure");
                AuthError::Internal(format!("unexpected error during token verification: {e}"))
            }
            _ => AuthError::InvalidToken(e.to_string()),
        }
    }

    fn describe_expired(&self, token: &str) -> String {
        let decoded = jsonwebtoken::decode::<Map<String, Value>>(
            token,
            &self.decoding_key,
            &self.expired_validation,
        );

        match decoded {
            Ok(data) => match Claims::from(data.claims).expires_at() {
                Some(at) => format!("Token expired at {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
                None => "Token expired (decode error: exp is not a valid timestamp)".to_string(),
            },
            Err(e) => format!("Token expired (decode error: {e})"),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
