// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Upload and download plumbing shared by the asset and monetary routes.

use axum::{
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use super::payload::UploadedDocument;
use crate::{
    auth::Principal,
    error::ApiError,
    state::AppState,
    storage::documents::{is_owned_by, validate_name},
};

/// Store an optional upload for `owner_id`, returning its stored name.
pub(crate) async fn store_upload(
    state: &AppState,
    owner_id: Uuid,
    document: Option<UploadedDocument>,
) -> Result<Option<String>, ApiError> {
    match document {
        Some(upload) => {
            let name = state
                .documents
                .store(owner_id, &upload.file_name, &upload.bytes)
                .await?;
            Ok(Some(name))
        }
        None => Ok(None),
    }
}

/// Stream a stored document back to its owner as an attachment.
pub(crate) async fn download(
    principal: &Principal,
    state: &AppState,
    file_name: &str,
) -> Result<Response, ApiError> {
    validate_name(file_name)?;
    if !is_owned_by(file_name, principal.id()) {
        tracing::warn!(
            principal_id = %principal.id(),
            document = %file_name,
            "Download of foreign document denied"
        );
        return Err(ApiError::forbidden());
    }

    let bytes = state.documents.retrieve(file_name).await?;
    let disposition = format!("attachment; filename=\"{}\"", file_name.replace('"', ""));
    Ok((
        [
            (CONTENT_TYPE, "application/octet-stream".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
