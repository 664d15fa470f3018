use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};

use crate::error::AppError;

/// The bearer credential of the request. Rejects with 401 `Not authenticated`
/// when the header is missing or uses another scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let (scheme, token) = value.trim().split_once(' ')?;
        let token = token.trim();

        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return None;
        }
        Some(Self(token.to_string()))
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers).ok_or_else(AppError::not_authenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn reads_bearer_token() {
        assert_eq!(
            BearerToken::from_headers(&headers("Bearer abc.def.ghi")),
            Some(BearerToken("abc.def.ghi".into()))
        );
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert_eq!(
            BearerToken::from_headers(&headers("bearer abc")),
            Some(BearerToken("abc".into()))
        );
    }

    #[test]
    fn other_schemes_and_empty_tokens_are_ignored() {
        for value in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer    ", "abc.def.ghi"] {
            assert_eq!(BearerToken::from_headers(&headers(value)), None, "{value}");
        }
        assert_eq!(BearerToken::from_headers(&HeaderMap::new()), None);
    }
}
