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
    auth::{Auth, Principal},
    error::ApiError,
    models::{
        BeneficiaryResponse, CreateBeneficiaryRequest, MessageResponse, UpdateBeneficiaryRequest,
    },
    state::AppState,
    storage::{
        parse_id, BeneficiaryRepository, OwnershipDenied, OwnershipEnforcer, StorageError,
        StoredBeneficiary,
    },
};

/// Resolve a beneficiary path id to its grantor, who must be the principal.
pub(crate) fn authorize_beneficiary(
    principal: &Principal,
    state: &AppState,
    bene_id: &str,
) -> Result<(Uuid, Uuid), ApiError> {
    if !matches!(principal, Principal::Grantor(_)) {
        return Err(OwnershipDenied::NotAGrantor.into());
    }
    let bene_id = parse_id(bene_id)?;
    let beneficiary = BeneficiaryRepository::new(&state.db)
        .find(bene_id)?
        .ok_or_else(|| ApiError::not_found(format!("Beneficiary {bene_id} not found")))?;
    principal.verify_ownership(&beneficiary)?;
    Ok((beneficiary.added_by, bene_id))
}

/// Fail with 422 unless `will_to` is one of the grantor's beneficiaries.
pub(crate) fn ensure_will_to(
    state: &AppState,
    grantor_id: Uuid,
    will_to: Uuid,
) -> Result<(), ApiError> {
    match BeneficiaryRepository::new(&state.db).get(grantor_id, will_to) {
        Ok(_) => Ok(()),
        Err(StorageError::NotFound(what)) => Err(StorageError::MissingReference(what).into()),
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/beneficiaries/account/{grantor_id}/create/beneficiary",
    params(("grantor_id" = String, Path, description = "Grantor identifier")),
    request_body = CreateBeneficiaryRequest,
    tag = "Beneficiaries",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = MessageResponse),
        (status = 403, description = "Not this grantor")
    )
)]
pub async fn create_beneficiary(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path(grantor_id): Path<String>,
    JsonBody(request): JsonBody<CreateBeneficiaryRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let beneficiary = StoredBeneficiary {
        id: Uuid::new_v4(),
        first_name: request.first_name,
        middle_name: request.middle_name,
        last_name: request.last_name,
        relation: request.relation,
        added_by: grantor_id,
        created_at: Utc::now(),
        updated_at: None,
    };
    BeneficiaryRepository::new(&state.db).create(&beneficiary)?;

    tracing::info!(grantor_id = %grantor_id, beneficiary_id = %beneficiary.id, "Beneficiary added");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Beneficiary added successfully")),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/beneficiaries/account/{grantor_id}/beneficiaries",
    params(("grantor_id" = String, Path, description = "Grantor identifier")),
    tag = "Beneficiaries",
    security(("bearer_auth" = [])),
    responses((status = 200, body = [BeneficiaryResponse]))
)]
pub async fn list_beneficiaries(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path(grantor_id): Path<String>,
) -> Result<Json<Vec<BeneficiaryResponse>>, ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let beneficiaries = BeneficiaryRepository::new(&state.db).list_by_grantor(grantor_id)?;
    Ok(Json(beneficiaries.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/beneficiaries/account/{grantor_id}/beneficiaries/{bene_id}",
    params(
        ("grantor_id" = String, Path, description = "Grantor identifier"),
        ("bene_id" = String, Path, description = "Beneficiary identifier")
    ),
    tag = "Beneficiaries",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = BeneficiaryResponse),
        (status = 404, description = "No such beneficiary for this grantor")
    )
)]
pub async fn get_beneficiary(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path((grantor_id, bene_id)): Path<(String, String)>,
) -> Result<Json<BeneficiaryResponse>, ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let beneficiary = BeneficiaryRepository::new(&state.db).get(grantor_id, parse_id(&bene_id)?)?;
    Ok(Json(beneficiary.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/beneficiaries/account/{grantor_id}/beneficiaries/{bene_id}/update",
    params(
        ("grantor_id" = String, Path, description = "Grantor identifier"),
        ("bene_id" = String, Path, description = "Beneficiary identifier")
    ),
    request_body = UpdateBeneficiaryRequest,
    tag = "Beneficiaries",
    security(("bearer_auth" = [])),
    responses((status = 200, body = BeneficiaryResponse))
)]
pub async fn update_beneficiary(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path((grantor_id, bene_id)): Path<(String, String)>,
    JsonBody(request): JsonBody<UpdateBeneficiaryRequest>,
) -> Result<Json<BeneficiaryResponse>, ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let beneficiary =
        BeneficiaryRepository::new(&state.db).update(grantor_id, parse_id(&bene_id)?, &request)?;
    Ok(Json(beneficiary.into()))
}

/// Deleting a beneficiary also deletes every asset and monetary willed to it.
#[utoipa::path(
    delete,
    path = "/api/v1/beneficiaries/account/{grantor_id}/beneficiaries/{bene_id}/delete",
    params(
        ("grantor_id" = String, Path, description = "Grantor identifier"),
        ("bene_id" = String, Path, description = "Beneficiary identifier")
    ),
    tag = "Beneficiaries",
    security(("bearer_auth" = [])),
    responses((status = 204))
)]
pub async fn delete_beneficiary(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path((grantor_id, bene_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let bene_id = parse_id(&bene_id)?;
    BeneficiaryRepository::new(&state.db).delete(grantor_id, bene_id)?;
    tracing::info!(grantor_id = %grantor_id, beneficiary_id = %bene_id, "Beneficiary removed");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BeneficiaryRelation;
    use crate::state::tests::test_state;
    use crate::storage::repository::grantors::tests::sample_grantor;
    use crate::storage::{GrantorRepository, StoredGrantor};

    fn seed_grantor(state: &AppState, username: &str) -> StoredGrantor {
        let grantor = sample_grantor(username, &format!("{username}@x.com"), username);
        GrantorRepository::new(&state.db).create(&grantor).unwrap();
        grantor
    }

    fn chi() -> CreateBeneficiaryRequest {
        CreateBeneficiaryRequest {
            first_name: "Chi".into(),
            middle_name: "Ben".into(),
            last_name: "Ebuka".into(),
            relation: BeneficiaryRelation::Son,
        }
    }

    #[tokio::test]
    async fn beneficiary_lifecycle() {
        let (state, _dir) = test_state();
        let grantor = seed_grantor(&state, "owner");
        let auth = || Auth(Principal::Grantor(grantor.clone()));
        let gid = grantor.id.to_string();

        let (status, Json(body)) = create_beneficiary(
            auth(),
            State(state.clone()),
            Path(gid.clone()),
            JsonBody(chi()),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.message, "Beneficiary added successfully");

        let Json(list) = list_beneficiaries(auth(), State(state.clone()), Path(gid.clone()))
            .await
            .unwrap();
        assert_eq!(list.len(), 1);
        let bene_id = list[0].id.to_string();

        let Json(updated) = update_beneficiary(
            auth(),
            State(state.clone()),
            Path((gid.clone(), bene_id.clone())),
            JsonBody(UpdateBeneficiaryRequest {
                first_name: Some("Chidi".into()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.first_name, "Chidi");
        assert_eq!(updated.last_name, "Ebuka");
        assert!(updated.updated_at.is_some());

        let status = delete_beneficiary(
            auth(),
            State(state.clone()),
            Path((gid.clone(), bene_id.clone())),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = get_beneficiary(auth(), State(state), Path((gid, bene_id)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn other_grantor_path_is_forbidden() {
        let (state, _dir) = test_state();
        let owner = seed_grantor(&state, "owner");
        let intruder = seed_grantor(&state, "intruder");

        let err = create_beneficiary(
            Auth(Principal::Grantor(intruder)),
            State(state),
            Path(owner.id.to_string()),
            JsonBody(chi()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn malformed_id_is_not_found() {
        let (state, _dir) = test_state();
        let grantor = seed_grantor(&state, "owner");

        let err = get_beneficiary(
            Auth(Principal::Grantor(grantor.clone())),
            State(state),
            Path((grantor.id.to_string(), "not-a-uuid".to_string())),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
