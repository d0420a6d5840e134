// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use super::payload::JsonBody;
use crate::{
    auth::{hash_password, Auth},
    error::ApiError,
    models::{
        is_valid_email, DashboardResponse, GrantorResponse, MessageResponse,
        RegisterGrantorRequest, UpdateGrantorRequest,
    },
    state::AppState,
    storage::{GrantorRepository, OwnershipEnforcer, StoredGrantor},
};

#[utoipa::path(
    post,
    path = "/api/v1/grantors/account/create",
    request_body = RegisterGrantorRequest,
    tag = "Grantors",
    responses(
        (status = 201, body = MessageResponse),
        (status = 422, description = "Invalid input or username, email or phone number taken")
    )
)]
pub async fn create_grantor(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterGrantorRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::unprocessable("Username and password are required"));
    }
    if !is_valid_email(&request.email) {
        return Err(ApiError::unprocessable("Invalid email address"));
    }

    let password_hash = hash_password(&request.password).map_err(ApiError::internal)?;
    let grantor = StoredGrantor {
        id: Uuid::new_v4(),
        username: request.username.trim().to_string(),
        first_name: request.first_name,
        middle_name: request.middle_name,
        last_name: request.last_name,
        email: request.email.trim().to_string(),
        phone_number: request.phone_number.trim().to_string(),
        password_hash,
        date_of_birth: request.date_of_birth,
        gender: request.gender,
        created_at: Utc::now(),
        updated_at: None,
    };
    GrantorRepository::new(&state.db).create(&grantor)?;

    tracing::info!(grantor_id = %grantor.id, username = %grantor.username, "Grantor registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Account created successfully")),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/grantors/account/dashboard/{grantor_id}",
    params(("grantor_id" = String, Path, description = "Grantor identifier")),
    tag = "Grantors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = DashboardResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not this grantor")
    )
)]
pub async fn dashboard(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path(grantor_id): Path<String>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let dashboard = GrantorRepository::new(&state.db).dashboard(grantor_id)?;
    Ok(Json(dashboard.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/grantors/account/dashboard/{grantor_id}/update",
    params(("grantor_id" = String, Path, description = "Grantor identifier")),
    request_body = UpdateGrantorRequest,
    tag = "Grantors",
    security(("bearer_auth" = [])),
    responses((status = 200, body = GrantorResponse))
)]
pub async fn update_grantor(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path(grantor_id): Path<String>,
    JsonBody(request): JsonBody<UpdateGrantorRequest>,
) -> Result<Json<GrantorResponse>, ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let grantor = GrantorRepository::new(&state.db).update(grantor_id, &request)?;
    Ok(Json(grantor.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/grantors/account/dashboard/{grantor_id}/delete",
    params(("grantor_id" = String, Path, description = "Grantor identifier")),
    tag = "Grantors",
    security(("bearer_auth" = [])),
    responses((status = 204, description = "Grantor and all owned records removed"))
)]
pub async fn delete_grantor(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path(grantor_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    GrantorRepository::new(&state.db).delete(grantor_id)?;
    tracing::info!(grantor_id = %grantor_id, "Grantor deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Principal;
    use crate::models::Gender;
    use crate::state::tests::test_state;
    use chrono::NaiveDate;

    fn registration(username: &str, email: &str, phone: &str) -> RegisterGrantorRequest {
        RegisterGrantorRequest {
            username: username.into(),
            first_name: "Ebuka".into(),
            middle_name: "Chi".into(),
            last_name: "Bolton".into(),
            email: email.into(),
            phone_number: phone.into(),
            password: "07067Oliver".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1980, 5, 17).unwrap(),
            gender: Gender::Male,
        }
    }

    #[tokio::test]
    async fn create_grantor_hashes_password() {
        let (state, _dir) = test_state();

        let (status, Json(body)) = create_grantor(
            State(state.clone()),
            JsonBody(registration("eBolton", "e@bolton.com", "0803")),
        )
        .await
        .expect("registration succeeds");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.message, "Account created successfully");

        let stored = GrantorRepository::new(&state.db)
            .find_by_username("eBolton")
            .unwrap()
            .unwrap();
        assert_ne!(stored.password_hash, "07067Oliver");
        assert!(stored.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn duplicate_username_is_unprocessable() {
        let (state, _dir) = test_state();
        create_grantor(
            State(state.clone()),
            JsonBody(registration("eBolton", "e@bolton.com", "0803")),
        )
        .await
        .unwrap();

        let err = create_grantor(
            State(state.clone()),
            JsonBody(registration("eBolton", "other@bolton.com", "0804")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn invalid_email_is_unprocessable() {
        let (state, _dir) = test_state();
        let err = create_grantor(
            State(state),
            JsonBody(registration("eBolton", "not-an-email", "0803")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn dashboard_of_another_grantor_is_forbidden() {
        let (state, _dir) = test_state();
        create_grantor(
            State(state.clone()),
            JsonBody(registration("eBolton", "e@bolton.com", "0803")),
        )
        .await
        .unwrap();
        let grantor = GrantorRepository::new(&state.db)
            .find_by_username("eBolton")
            .unwrap()
            .unwrap();

        let err = dashboard(
            Auth(Principal::Grantor(grantor.clone())),
            State(state.clone()),
            Path(Uuid::new_v4().to_string()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let Json(own) = dashboard(
            Auth(Principal::Grantor(grantor.clone())),
            State(state),
            Path(grantor.id.to_string()),
        )
        .await
        .unwrap();
        assert_eq!(own.grantor.id, grantor.id);
        assert!(own.beneficiaries.is_empty());
    }
}
