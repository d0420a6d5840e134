// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use super::{
    beneficiaries::{authorize_beneficiary, ensure_will_to},
    documents::{download, store_upload},
    payload::WithDocument,
};
use crate::{
    auth::Auth,
    error::ApiError,
    models::{AssetResponse, CreateAssetRequest, MessageResponse, UpdateAssetRequest},
    state::AppState,
    storage::{parse_id, AssetRepository, OwnershipEnforcer, StoredAsset},
};

/// Accepts `application/json`, or `multipart/form-data` with a `data` part
/// holding the JSON body and an optional `document` file part.
#[utoipa::path(
    post,
    path = "/api/v1/assets/{grantor_id}/create/asset",
    params(("grantor_id" = String, Path, description = "Grantor identifier")),
    request_body = CreateAssetRequest,
    tag = "Assets",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = MessageResponse),
        (status = 403, description = "Not this grantor"),
        (status = 422, description = "Beneficiary does not exist")
    )
)]
pub async fn create_asset(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path(grantor_id): Path<String>,
    payload: WithDocument<CreateAssetRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let request = payload.data;
    if payload.document.is_some() {
        ensure_will_to(&state, grantor_id, request.will_to)?;
    }
    let document = store_upload(&state, grantor_id, payload.document).await?;

    let asset = StoredAsset {
        id: Uuid::new_v4(),
        name: request.name,
        location: request.location,
        document,
        note: request.note,
        owner_id: grantor_id,
        will_to: request.will_to,
        created_at: Utc::now(),
        updated_at: None,
    };
    AssetRepository::new(&state.db).create(&asset)?;

    tracing::info!(grantor_id = %grantor_id, asset_id = %asset.id, "Asset added");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("asset added successfully")),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/grantor/{grantor_id}/assets",
    params(("grantor_id" = String, Path, description = "Grantor identifier")),
    tag = "Assets",
    security(("bearer_auth" = [])),
    responses((status = 200, body = [AssetResponse]))
)]
pub async fn list_assets(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path(grantor_id): Path<String>,
) -> Result<Json<Vec<AssetResponse>>, ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let assets = AssetRepository::new(&state.db).list_by_grantor(grantor_id)?;
    Ok(Json(assets.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/beneficiary/{bene_id}/assets",
    params(("bene_id" = String, Path, description = "Beneficiary identifier")),
    tag = "Assets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = [AssetResponse]),
        (status = 403, description = "Beneficiary belongs to another grantor")
    )
)]
pub async fn list_beneficiary_assets(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path(bene_id): Path<String>,
) -> Result<Json<Vec<AssetResponse>>, ApiError> {
    let (grantor_id, bene_id) = authorize_beneficiary(&principal, &state, &bene_id)?;
    let assets = AssetRepository::new(&state.db).list_by_beneficiary(grantor_id, bene_id)?;
    Ok(Json(assets.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/{grantor_id}/assets/{asset_id}",
    params(
        ("grantor_id" = String, Path, description = "Grantor identifier"),
        ("asset_id" = String, Path, description = "Asset identifier")
    ),
    tag = "Assets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = AssetResponse),
        (status = 404, description = "No such asset for this grantor")
    )
)]
pub async fn get_asset(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path((grantor_id, asset_id)): Path<(String, String)>,
) -> Result<Json<AssetResponse>, ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let asset = AssetRepository::new(&state.db).get(grantor_id, parse_id(&asset_id)?)?;
    Ok(Json(asset.into()))
}

/// A new `document` part replaces the stored document reference; the old
/// file is left in place.
#[utoipa::path(
    put,
    path = "/api/v1/assets/{grantor_id}/assets/{asset_id}/update",
    params(
        ("grantor_id" = String, Path, description = "Grantor identifier"),
        ("asset_id" = String, Path, description = "Asset identifier")
    ),
    request_body = UpdateAssetRequest,
    tag = "Assets",
    security(("bearer_auth" = [])),
    responses((status = 200, body = AssetResponse))
)]
pub async fn update_asset(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path((grantor_id, asset_id)): Path<(String, String)>,
    payload: WithDocument<UpdateAssetRequest>,
) -> Result<Json<AssetResponse>, ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let asset_id = parse_id(&asset_id)?;
    let repo = AssetRepository::new(&state.db);

    if payload.document.is_some() {
        repo.get(grantor_id, asset_id)?;
        if let Some(will_to) = payload.data.will_to {
            ensure_will_to(&state, grantor_id, will_to)?;
        }
    }
    let document = store_upload(&state, grantor_id, payload.document).await?;

    let asset = repo.update(grantor_id, asset_id, &payload.data, document)?;
    Ok(Json(asset.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/assets/{grantor_id}/assets/{asset_id}/delete",
    params(
        ("grantor_id" = String, Path, description = "Grantor identifier"),
        ("asset_id" = String, Path, description = "Asset identifier")
    ),
    tag = "Assets",
    security(("bearer_auth" = [])),
    responses((status = 204))
)]
pub async fn delete_asset(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path((grantor_id, asset_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let asset_id = parse_id(&asset_id)?;
    AssetRepository::new(&state.db).delete(grantor_id, asset_id)?;
    tracing::info!(grantor_id = %grantor_id, asset_id = %asset_id, "Asset removed");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/asset/download/{file_name}",
    params(("file_name" = String, Path, description = "Stored document name")),
    tag = "Assets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Document bytes", content_type = "application/octet-stream"),
        (status = 403, description = "Document belongs to someone else"),
        (status = 404, description = "No such document")
    )
)]
pub async fn download_asset_document(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response, ApiError> {
    download(&principal, &state, &file_name).await
}
