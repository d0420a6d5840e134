// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::storage::{DocumentError, OwnershipDenied, StorageError};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Access denied")
    }

    /// Generic 500. The detail is logged, never returned.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => Self::not_found(format!("{what} not found")),
            StorageError::InvalidId(id) => Self::not_found(format!("{id} not found")),
            StorageError::AlreadyExists(what) => {
                Self::unprocessable(format!("{what} already exists"))
            }
            StorageError::MissingReference(what) => {
                Self::unprocessable(format!("{what} does not exist"))
            }
            other => Self::internal(other),
        }
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::NotFound(name) => Self::not_found(format!("Document {name} not found")),
            DocumentError::InvalidName(name) => {
                Self::unprocessable(format!("Invalid document name: {name}"))
            }
            other => Self::internal(other),
        }
    }
}

impl From<OwnershipDenied> for ApiError {
    fn from(denied: OwnershipDenied) -> Self {
        tracing::warn!(reason = ?denied, "Access denied");
        Self::forbidden()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let unp = ApiError::unprocessable("oops");
        assert_eq!(unp.status, StatusCode::UNPROCESSABLE_ENTITY);

        let denied = ApiError::forbidden();
        assert_eq!(denied.status, StatusCode::FORBIDDEN);
        assert_eq!(denied.message, "Access denied");
    }

    #[test]
    fn storage_errors_map_to_status_codes() {
        let cases = [
            (StorageError::NotFound("Asset x".into()), StatusCode::NOT_FOUND),
            (StorageError::InvalidId("abc".into()), StatusCode::NOT_FOUND),
            (
                StorageError::AlreadyExists("Username eBolton".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                StorageError::MissingReference("Beneficiary y".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                StorageError::Io(std::io::Error::other("disk gone")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn internal_errors_hide_detail() {
        let err = ApiError::from(StorageError::Io(std::io::Error::other("disk gone")));
        assert_eq!(err.message, "Internal server error");
    }

    #[test]
    fn document_errors_map_to_status_codes() {
        assert_eq!(
            ApiError::from(DocumentError::NotFound("a".into())).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(DocumentError::ObjectStorage("timeout".into())).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::forbidden().into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"Access denied"}"#);
    }
}
