// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated principals and login credentials.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(principal): Auth) -> impl IntoResponse {
//!     // principal is a grantor or a trustee
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
};
use base64ct::{Base64, Encoding};

use super::{AuthError, Principal};
use crate::state::AppState;

/// Name of the cookie that may carry `Bearer <token>` for browser clients.
pub const AUTH_COOKIE: &str = "Authorization";

/// Extractor for authenticated principals.
///
/// The bearer token is read from the `Authorization` header, falling back to
/// the `Authorization` cookie. The verified subject is resolved against
/// grantors first, then trustees.
///
/// # Example
///
/// ```rust,ignore
/// async fn list_beneficiaries(
///     Auth(principal): Auth,
///     State(state): State<AppState>,
///     Path(grantor_id): Path<String>,
/// ) -> Result<Json<Vec<BeneficiaryResponse>>, ApiError> {
///     let grantor_id = authorize_owner(&principal, &grantor_id)?;
///     // ...
/// }
/// ```
pub struct Auth(pub Principal);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let subject_id = state.tokens.verify(&token)?;
        let principal = Principal::resolve(&state.db, subject_id)?;
        tracing::debug!(
            principal_id = %principal.id(),
            username = principal.username(),
            account_type = ?principal.account_type(),
            "Request authenticated"
        );
        Ok(Auth(principal))
    }
}

/// Pull the bearer token from the header, or from the cookie if no header
/// is present.
fn bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let value = value.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
        return strip_bearer(value);
    }

    match cookie_value(headers, AUTH_COOKIE) {
        Some(value) => strip_bearer(&value),
        None => Err(AuthError::MissingAuthHeader),
    }
}

fn strip_bearer(value: &str) -> Result<String, AuthError> {
    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token.trim().to_string())
}

/// Find a cookie by name and percent-decode its value.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| {
            let value = value.trim().trim_matches('"');
            url::form_urlencoded::parse(value.as_bytes())
                .map(|(key, _)| key.into_owned())
                .next()
                .unwrap_or_default()
        })
}

/// HTTP Basic credentials, used only by the token-exchange login route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl<S: Send + Sync> FromRequestParts<S> for BasicCredentials {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let (scheme, encoded) = value
            .trim()
            .split_once(' ')
            .ok_or(AuthError::InvalidAuthHeader)?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(AuthError::InvalidAuthHeader);
        }

        let decoded = Base64::decode_vec(encoded.trim()).map_err(|_| AuthError::InvalidAuthHeader)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::InvalidAuthHeader)?;
        let (username, password) = decoded
            .split_once(':')
            .ok_or(AuthError::InvalidAuthHeader)?;

        Ok(BasicCredentials {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::test_state;
    use crate::storage::repository::grantors::tests::sample_grantor;
    use crate::storage::GrantorRepository;
    use axum::http::Request;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use uuid::Uuid;

    fn parts_with(header: Option<(&str, String)>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_credentials() {
        let (state, _dir) = test_state();
        let mut parts = parts_with(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_resolves_grantor_from_header() {
        let (state, _dir) = test_state();
        let grantor = sample_grantor("eBolton", "e@bolton.com", "0803");
        GrantorRepository::new(&state.db).create(&grantor).unwrap();
        let token = state.tokens.issue(grantor.id, "eBolton").unwrap();

        let mut parts = parts_with(Some(("Authorization", format!("Bearer {token}"))));
        let Auth(principal) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(principal.id(), grantor.id);
    }

    #[tokio::test]
    async fn auth_extractor_falls_back_to_cookie() {
        let (state, _dir) = test_state();
        let grantor = sample_grantor("eBolton", "e@bolton.com", "0803");
        GrantorRepository::new(&state.db).create(&grantor).unwrap();
        let token = state.tokens.issue(grantor.id, "eBolton").unwrap();

        let mut parts = parts_with(Some((
            "Cookie",
            format!("theme=dark; Authorization=\"Bearer%20{token}\""),
        )));
        let Auth(principal) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(principal.id(), grantor.id);
    }

    #[tokio::test]
    async fn token_for_deleted_account_is_rejected() {
        let (state, _dir) = test_state();
        let token = state.tokens.issue(Uuid::new_v4(), "ghost").unwrap();

        let mut parts = parts_with(Some(("Authorization", format!("Bearer {token}"))));
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::UnknownPrincipal)));
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let (state, _dir) = test_state();
        let mut parts = parts_with(Some(("Authorization", "Token abc".to_string())));
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn basic_credentials_are_decoded() {
        let encoded = STANDARD.encode("eBolton:07067Oliver:with-colon");
        let mut parts = parts_with(Some(("Authorization", format!("Basic {encoded}"))));

        let creds = BasicCredentials::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(creds.username, "eBolton");
        assert_eq!(creds.password, "07067Oliver:with-colon");
    }

    #[tokio::test]
    async fn basic_credentials_reject_bad_input() {
        let no_colon = format!("Basic {}", STANDARD.encode("nocolon"));
        for value in ["Bearer abc", "Basic !!!", no_colon.as_str()] {
            let mut parts = parts_with(Some(("Authorization", value.to_string())));
            let result = BasicCredentials::from_request_parts(&mut parts, &()).await;
            assert!(matches!(result, Err(AuthError::InvalidAuthHeader)), "{value}");
        }
    }
}
