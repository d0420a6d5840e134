// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login routes.
//!
//! Both routes exchange a username and password for a bearer token. The JSON
//! route checks the table selected by `account_type`; the Basic route is for
//! grantors only.

use axum::{extract::State, Json};
use uuid::Uuid;

use super::payload::JsonBody;
use crate::{
    auth::{verify_password, verify_unknown_account, AuthError, BasicCredentials},
    models::{AccessTokenResponse, AccountType, LoginRequest},
    state::AppState,
    storage::{GrantorRepository, StorageError, TrusteeRepository},
};

fn storage_failure(err: StorageError) -> AuthError {
    AuthError::InternalError(err.to_string())
}

/// Check credentials and return the account id and canonical username.
fn authenticate(
    state: &AppState,
    username: &str,
    password: &str,
    account_type: AccountType,
) -> Result<(Uuid, String), AuthError> {
    let account = match account_type {
        AccountType::Grantor => GrantorRepository::new(&state.db)
            .find_by_username(username)
            .map_err(storage_failure)?
            .map(|g| (g.id, g.username, g.password_hash)),
        AccountType::Trustee => TrusteeRepository::new(&state.db)
            .find_by_username(username)
            .map_err(storage_failure)?
            .map(|t| (t.id, t.username, t.password_hash)),
    };

    let verified = match &account {
        Some((_, _, hash)) => verify_password(password, hash),
        None => verify_unknown_account(password),
    };

    match account {
        Some((id, username, _)) if verified => Ok((id, username)),
        _ => {
            tracing::warn!(username = %username, account_type = ?account_type, "Login failed");
            Err(AuthError::InvalidCredentials)
        }
    }
}

fn issue(state: &AppState, id: Uuid, username: &str) -> Result<Json<AccessTokenResponse>, AuthError> {
    let token = state.tokens.issue(id, username)?;
    tracing::info!(subject_id = %id, "Access token issued");
    Ok(Json(AccessTokenResponse::bearer(token, id)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auths/account/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, body = AccessTokenResponse),
        (status = 401, description = "Incorrect username or password"),
        (status = 422, description = "Malformed body")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<AccessTokenResponse>, AuthError> {
    let (id, username) = authenticate(
        &state,
        &request.username,
        &request.password,
        request.account_type,
    )?;
    issue(&state, id, &username)
}

#[utoipa::path(
    post,
    path = "/api/v1/auths/account/token",
    tag = "Auth",
    security(("basic_auth" = [])),
    responses(
        (status = 200, body = AccessTokenResponse),
        (status = 401, description = "Missing or incorrect credentials")
    )
)]
pub async fn token(
    State(state): State<AppState>,
    credentials: BasicCredentials,
) -> Result<Json<AccessTokenResponse>, AuthError> {
    let (id, username) = authenticate(
        &state,
        &credentials.username,
        &credentials.password,
        AccountType::Grantor,
    )?;
    issue(&state, id, &username)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::state::tests::test_state;
    use crate::storage::repository::grantors::tests::sample_grantor;
    use crate::storage::repository::trustees::tests::sample_trustee;

    fn seed(state: &AppState) -> (Uuid, Uuid) {
        let mut grantor = sample_grantor("eBolton", "e@bolton.com", "0803");
        grantor.password_hash = hash_password("07067Oliver").unwrap();
        GrantorRepository::new(&state.db).create(&grantor).unwrap();

        let mut trustee = sample_trustee(grantor.id, "ada");
        trustee.password_hash = hash_password("lovelace").unwrap();
        TrusteeRepository::new(&state.db).create(&trustee).unwrap();
        (grantor.id, trustee.id)
    }

    fn login_request(username: &str, password: &str, account_type: AccountType) -> LoginRequest {
        LoginRequest {
            username: username.into(),
            password: password.into(),
            account_type,
        }
    }

    #[tokio::test]
    async fn grantor_login_issues_token_for_subject() {
        let (state, _dir) = test_state();
        let (grantor_id, _) = seed(&state);

        let Json(body) = login(
            State(state.clone()),
            JsonBody(login_request("eBolton", "07067Oliver", AccountType::Grantor)),
        )
        .await
        .expect("login succeeds");

        assert_eq!(body.token_type, "bearer");
        assert_eq!(body.id, grantor_id);
        assert_eq!(state.tokens.verify(&body.access_token).unwrap(), grantor_id);
    }

    #[tokio::test]
    async fn trustee_login_uses_trustee_table() {
        let (state, _dir) = test_state();
        let (_, trustee_id) = seed(&state);

        let Json(body) = login(
            State(state.clone()),
            JsonBody(login_request("ada", "lovelace", AccountType::Trustee)),
        )
        .await
        .unwrap();
        assert_eq!(body.id, trustee_id);

        let err = login(
            State(state),
            JsonBody(login_request("ada", "lovelace", AccountType::Grantor)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn wrong_password_or_unknown_user_is_rejected() {
        let (state, _dir) = test_state();
        seed(&state);

        for (username, password) in [("eBolton", "wrong"), ("nobody", "07067Oliver")] {
            let err = login(
                State(state.clone()),
                JsonBody(login_request(username, password, AccountType::Grantor)),
            )
            .await
            .unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials), "{username}");
        }
    }

    #[tokio::test]
    async fn basic_token_route_is_for_grantors() {
        let (state, _dir) = test_state();
        let (grantor_id, _) = seed(&state);

        let Json(body) = token(
            State(state.clone()),
            BasicCredentials {
                username: "eBolton".into(),
                password: "07067Oliver".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(body.id, grantor_id);

        let err = token(
            State(state),
            BasicCredentials {
                username: "ada".into(),
                password: "lovelace".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }
}
