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
    models::{CreateMonetaryRequest, MessageResponse, MonetaryResponse, UpdateMonetaryRequest},
    state::AppState,
    storage::{parse_id, MonetaryRepository, OwnershipEnforcer, StoredMonetary},
};

/// Register a bank holding. A statement may be attached as the multipart
/// `document` part.
#[utoipa::path(
    post,
    path = "/api/v1/monetaries/asset/{grantor_id}/create/monetary",
    params(("grantor_id" = String, Path, description = "Grantor identifier")),
    request_body = CreateMonetaryRequest,
    tag = "Monetaries",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = MessageResponse),
        (status = 403, description = "Not this grantor"),
        (status = 422, description = "Beneficiary does not exist")
    )
)]
pub async fn create_monetary(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path(grantor_id): Path<String>,
    payload: WithDocument<CreateMonetaryRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let request = payload.data;
    if payload.document.is_some() {
        ensure_will_to(&state, grantor_id, request.will_to)?;
    }
    let document = store_upload(&state, grantor_id, payload.document).await?;

    let monetary = StoredMonetary {
        id: Uuid::new_v4(),
        acc_name: request.acc_name,
        acc_number: request.acc_number,
        amount: request.amount,
        bank_name: request.bank_name,
        document,
        note: request.note,
        owner_id: grantor_id,
        will_to: request.will_to,
        created_at: Utc::now(),
        updated_at: None,
    };
    MonetaryRepository::new(&state.db).create(&monetary)?;

    tracing::info!(grantor_id = %grantor_id, monetary_id = %monetary.id, "Monetary asset added");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("monetary asset added successfully")),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/monetaries/asset/grantor/{grantor_id}/assets",
    params(("grantor_id" = String, Path, description = "Grantor identifier")),
    tag = "Monetaries",
    security(("bearer_auth" = [])),
    responses((status = 200, body = [MonetaryResponse]))
)]
pub async fn list_monetaries(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path(grantor_id): Path<String>,
) -> Result<Json<Vec<MonetaryResponse>>, ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let monetaries = MonetaryRepository::new(&state.db).list_by_grantor(grantor_id)?;
    Ok(Json(monetaries.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/monetaries/asset/beneficiary/{bene_id}/assets",
    params(("bene_id" = String, Path, description = "Beneficiary identifier")),
    tag = "Monetaries",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = [MonetaryResponse]),
        (status = 403, description = "Beneficiary belongs to another grantor")
    )
)]
pub async fn list_beneficiary_monetaries(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path(bene_id): Path<String>,
) -> Result<Json<Vec<MonetaryResponse>>, ApiError> {
    let (grantor_id, bene_id) = authorize_beneficiary(&principal, &state, &bene_id)?;
    let monetaries = MonetaryRepository::new(&state.db).list_by_beneficiary(grantor_id, bene_id)?;
    Ok(Json(monetaries.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/monetaries/asset/grantor/{grantor_id}/assets/{monetary_id}",
    params(
        ("grantor_id" = String, Path, description = "Grantor identifier"),
        ("monetary_id" = String, Path, description = "Monetary identifier")
    ),
    tag = "Monetaries",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = MonetaryResponse),
        (status = 404, description = "No such monetary for this grantor")
    )
)]
pub async fn get_monetary(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path((grantor_id, monetary_id)): Path<(String, String)>,
) -> Result<Json<MonetaryResponse>, ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let monetary = MonetaryRepository::new(&state.db).get(grantor_id, parse_id(&monetary_id)?)?;
    Ok(Json(monetary.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/monetaries/asset/grantor/{grantor_id}/assets/{monetary_id}/update",
    params(
        ("grantor_id" = String, Path, description = "Grantor identifier"),
        ("monetary_id" = String, Path, description = "Monetary identifier")
    ),
    request_body = UpdateMonetaryRequest,
    tag = "Monetaries",
    security(("bearer_auth" = [])),
    responses((status = 200, body = MonetaryResponse))
)]
pub async fn update_monetary(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path((grantor_id, monetary_id)): Path<(String, String)>,
    payload: WithDocument<UpdateMonetaryRequest>,
) -> Result<Json<MonetaryResponse>, ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let monetary_id = parse_id(&monetary_id)?;
    let repo = MonetaryRepository::new(&state.db);

    if payload.document.is_some() {
        repo.get(grantor_id, monetary_id)?;
        if let Some(will_to) = payload.data.will_to {
            ensure_will_to(&state, grantor_id, will_to)?;
        }
    }
    let document = store_upload(&state, grantor_id, payload.document).await?;

    let monetary = repo.update(grantor_id, monetary_id, &payload.data, document)?;
    Ok(Json(monetary.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/monetaries/asset/grantor/{grantor_id}/assets/{monetary_id}/delete",
    params(
        ("grantor_id" = String, Path, description = "Grantor identifier"),
        ("monetary_id" = String, Path, description = "Monetary identifier")
    ),
    tag = "Monetaries",
    security(("bearer_auth" = [])),
    responses((status = 204))
)]
pub async fn delete_monetary(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path((grantor_id, monetary_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let grantor_id = principal.authorize_owner(&grantor_id)?;
    let monetary_id = parse_id(&monetary_id)?;
    MonetaryRepository::new(&state.db).delete(grantor_id, monetary_id)?;
    tracing::info!(grantor_id = %grantor_id, monetary_id = %monetary_id, "Monetary asset removed");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/monetaries/asset/download/{file_name}",
    params(("file_name" = String, Path, description = "Stored document name")),
    tag = "Monetaries",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Document bytes", content_type = "application/octet-stream"),
        (status = 403, description = "Document belongs to someone else"),
        (status = 404, description = "No such document")
    )
)]
pub async fn download_monetary_document(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response, ApiError> {
    download(&principal, &state, &file_name).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::payload::UploadedDocument;
    use crate::auth::Principal;
    use crate::state::tests::test_state;
    use crate::storage::repository::beneficiaries::tests::sample_beneficiary;
    use crate::storage::repository::grantors::tests::sample_grantor;
    use crate::storage::repository::trustees::tests::sample_trustee;
    use crate::storage::{
        BeneficiaryRepository, GrantorRepository, StoredGrantor, TrusteeRepository,
    };
    use axum::body::{to_bytes, Bytes};

    fn seeded(state: &AppState) -> (StoredGrantor, Uuid) {
        let grantor = sample_grantor("owner", "o@x.com", "1");
        GrantorRepository::new(&state.db).create(&grantor).unwrap();
        let beneficiary = sample_beneficiary(grantor.id);
        BeneficiaryRepository::new(&state.db).create(&beneficiary).unwrap();
        (grantor, beneficiary.id)
    }

    fn savings(will_to: Uuid) -> CreateMonetaryRequest {
        CreateMonetaryRequest {
            acc_name: "Ebuka Bolton".into(),
            acc_number: "0123456789".into(),
            amount: "1,000,000 NGN".into(),
            bank_name: "First Bank".into(),
            will_to,
            note: Some("Savings".into()),
        }
    }

    #[tokio::test]
    async fn monetary_lifecycle_with_statement_download() {
        let (state, _dir) = test_state();
        let (grantor, bene_id) = seeded(&state);
        let auth = || Auth(Principal::Grantor(grantor.clone()));
        let gid = grantor.id.to_string();

        let (status, Json(body)) = create_monetary(
            auth(),
            State(state.clone()),
            Path(gid.clone()),
            WithDocument {
                data: savings(bene_id),
                document: Some(UploadedDocument {
                    file_name: "statement.pdf".into(),
                    bytes: Bytes::from_static(b"statement"),
                }),
            },
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.message, "monetary asset added successfully");

        let Json(monetaries) = list_monetaries(auth(), State(state.clone()), Path(gid.clone()))
            .await
            .unwrap();
        assert_eq!(monetaries.len(), 1);
        assert_eq!(monetaries[0].amount, "1,000,000 NGN");
        let monetary_id = monetaries[0].id.to_string();
        let document = monetaries[0].document.clone().unwrap();

        let response = download_monetary_document(auth(), State(state.clone()), Path(document))
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"statement");

        let Json(updated) = update_monetary(
            auth(),
            State(state.clone()),
            Path((gid.clone(), monetary_id.clone())),
            WithDocument {
                data: UpdateMonetaryRequest {
                    amount: Some("2,000,000 NGN".into()),
                    ..Default::default()
                },
                document: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.amount, "2,000,000 NGN");
        assert_eq!(updated.bank_name, "First Bank");

        let Json(fetched) = get_monetary(
            auth(),
            State(state.clone()),
            Path((gid.clone(), monetary_id.clone())),
        )
        .await
        .unwrap();
        assert_eq!(fetched.amount, "2,000,000 NGN");

        delete_monetary(auth(), State(state.clone()), Path((gid.clone(), monetary_id)))
            .await
            .unwrap();
        let Json(for_bene) =
            list_beneficiary_monetaries(auth(), State(state), Path(bene_id.to_string()))
                .await
                .unwrap();
        assert!(for_bene.is_empty());
    }

    #[tokio::test]
    async fn trustee_cannot_list_beneficiary_monetaries() {
        let (state, _dir) = test_state();
        let (grantor, bene_id) = seeded(&state);
        let trustee = sample_trustee(grantor.id, "ada");
        TrusteeRepository::new(&state.db).create(&trustee).unwrap();

        let err = list_beneficiary_monetaries(
            Auth(Principal::Trustee(trustee)),
            State(state),
            Path(bene_id.to_string()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_monetary_is_not_found() {
        let (state, _dir) = test_state();
        let (grantor, _) = seeded(&state);

        let err = delete_monetary(
            Auth(Principal::Grantor(grantor.clone())),
            State(state),
            Path((grantor.id.to_string(), Uuid::new_v4().to_string())),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
