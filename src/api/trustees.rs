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
    auth::{hash_password, Auth, Principal},
    error::ApiError,
    models::{
        is_valid_email, CreateTrusteeRequest, MessageResponse, TrusteeResponse,
        UpdateTrusteeRequest,
    },
    state::AppState,
    storage::{parse_id, OwnershipEnforcer, StoredTrustee, TrusteeRepository},
};

#[utoipa::path(
    post,
    path = "/api/v1/trustees/account/{grantor_id}/create/trustee",
    params(("grantor_id" = String, Path, description = "Grantor identifier")),
    request_body = CreateTrusteeRequest,
    tag = "Trustees",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = MessageResponse),
        (status = 403, description = "Not this grantor"),
        (status = 422, description = "Invalid input or username taken")
    )
)]
pub async fn create_trustee(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path(grantor_id): Path<String>,
    JsonBody(request): JsonBody<CreateTrusteeRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::unprocessable("Username and password are required"));
    }
    if !is_valid_email(&request.email) {
        return Err(ApiError::unprocessable("Invalid email address"));
    }

    let password_hash = hash_password(&request.password).map_err(ApiError::internal)?;
    let trustee = StoredTrustee {
        id: Uuid::new_v4(),
        username: request.username.trim().to_string(),
        first_name: request.first_name,
        middle_name: request.middle_name,
        last_name: request.last_name,
        email: request.email.trim().to_string(),
        phone_number: request.phone_number.trim().to_string(),
        password_hash,
        relation: request.relation,
        note: request.note,
        added_by: grantor_id,
        created_at: Utc::now(),
        updated_at: None,
    };
    TrusteeRepository::new(&state.db).create(&trustee)?;

    tracing::info!(grantor_id = %grantor_id, trustee_id = %trustee.id, "Trustee added");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Trustee added successfully")),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/trustees/account/{grantor_id}/trustees",
    params(("grantor_id" = String, Path, description = "Grantor identifier")),
    tag = "Trustees",
    security(("bearer_auth" = [])),
    responses((status = 200, body = [TrusteeResponse]))
)]
pub async fn list_trustees(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path(grantor_id): Path<String>,
) -> Result<Json<Vec<TrusteeResponse>>, ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let trustees = TrusteeRepository::new(&state.db).list_by_grantor(grantor_id)?;
    Ok(Json(trustees.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/trustees/account/{grantor_id}/trustees/{trustee_id}",
    params(
        ("grantor_id" = String, Path, description = "Grantor identifier"),
        ("trustee_id" = String, Path, description = "Trustee identifier")
    ),
    tag = "Trustees",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = TrusteeResponse),
        (status = 404, description = "No such trustee for this grantor")
    )
)]
pub async fn get_trustee(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path((grantor_id, trustee_id)): Path<(String, String)>,
) -> Result<Json<TrusteeResponse>, ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let trustee = TrusteeRepository::new(&state.db).get(grantor_id, parse_id(&trustee_id)?)?;
    Ok(Json(trustee.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/trustees/account/{grantor_id}/trustees/{trustee_id}/update",
    params(
        ("grantor_id" = String, Path, description = "Grantor identifier"),
        ("trustee_id" = String, Path, description = "Trustee identifier")
    ),
    request_body = UpdateTrusteeRequest,
    tag = "Trustees",
    security(("bearer_auth" = [])),
    responses((status = 200, body = TrusteeResponse))
)]
pub async fn update_trustee(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path((grantor_id, trustee_id)): Path<(String, String)>,
    JsonBody(request): JsonBody<UpdateTrusteeRequest>,
) -> Result<Json<TrusteeResponse>, ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let trustee =
        TrusteeRepository::new(&state.db).update(grantor_id, parse_id(&trustee_id)?, &request)?;
    Ok(Json(trustee.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/trustees/account/{grantor_id}/trustees/{trustee_id}/delete",
    params(
        ("grantor_id" = String, Path, description = "Grantor identifier"),
        ("trustee_id" = String, Path, description = "Trustee identifier")
    ),
    tag = "Trustees",
    security(("bearer_auth" = [])),
    responses((status = 204))
)]
pub async fn delete_trustee(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path((grantor_id, trustee_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let trustee_id = parse_id(&trustee_id)?;
    TrusteeRepository::new(&state.db).delete(grantor_id, trustee_id)?;
    tracing::info!(grantor_id = %grantor_id, trustee_id = %trustee_id, "Trustee removed");
    Ok(StatusCode::NO_CONTENT)
}

/// A trustee's own view of their record. The appointing grantor may read it
/// too.
#[utoipa::path(
    get,
    path = "/api/v1/trustees/account/trustee/{trustee_id}/dashboard",
    params(("trustee_id" = String, Path, description = "Trustee identifier")),
    tag = "Trustees",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = TrusteeResponse),
        (status = 403, description = "Neither this trustee nor their grantor")
    )
)]
pub async fn trustee_dashboard(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path(trustee_id): Path<String>,
) -> Result<Json<TrusteeResponse>, ApiError> {
    let trustee_id = parse_id(&trustee_id)?;
    match &principal {
        Principal::Trustee(trustee) if trustee.id == trustee_id => {
            Ok(Json(trustee.clone().into()))
        }
        Principal::Trustee(_) => Err(ApiError::forbidden()),
        Principal::Grantor(_) => {
            let trustee = TrusteeRepository::new(&state.db)
                .find(trustee_id)?
                .ok_or_else(|| ApiError::not_found(format!("Trustee {trustee_id} not found")))?;
            principal.verify_ownership(&trustee)?;
            Ok(Json(trustee.into()))
        }
    }
}
