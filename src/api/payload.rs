// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request body extractors.
//!
//! `JsonBody` is `axum::Json` with rejections reported as `ApiError` (422).
//! `WithDocument` additionally accepts `multipart/form-data`, where part
//! `data` carries the JSON body and part `document` an optional file.

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Largest accepted request body, uploads included.
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// JSON body whose rejection is a 422 `{"error"}` response.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}

/// A file uploaded alongside an asset or monetary record.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub bytes: Bytes,
}

/// JSON data with an optional uploaded document.
pub struct WithDocument<T> {
    pub data: T,
    pub document: Option<UploadedDocument>,
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

impl<S, T> FromRequest<S> for WithDocument<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let JsonBody(data) = JsonBody::<T>::from_request(req, state).await?;
            return Ok(WithDocument {
                data,
                document: None,
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::unprocessable(rejection.body_text()))?;

        let mut data = None;
        let mut document = None;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::unprocessable(e.body_text()))?
        {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("data") => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ApiError::unprocessable(e.body_text()))?;
                    let parsed = serde_json::from_str::<T>(&text).map_err(|e| {
                        ApiError::unprocessable(format!("Invalid `data` part: {e}"))
                    })?;
                    data = Some(parsed);
                }
                Some("document") => {
                    let file_name = field.file_name().unwrap_or("document").to_owned();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::unprocessable(e.body_text()))?;
                    // Browsers send an empty part when no file was picked.
                    if !bytes.is_empty() {
                        document = Some(UploadedDocument { file_name, bytes });
                    }
                }
                _ => {}
            }
        }

        let data = data.ok_or_else(|| ApiError::unprocessable("Missing `data` part"))?;
        Ok(WithDocument { data, document })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: String,
    }

    const BOUNDARY: &str = "estate-boundary";

    fn multipart_request(body: String) -> Request {
        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn json_body_rejection_is_unprocessable() {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"nope": 1}"#))
            .unwrap();

        let err = JsonBody::<Sample>::from_request(req, &()).await.err().unwrap();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn plain_json_has_no_document() {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name": "House"}"#))
            .unwrap();

        let payload = WithDocument::<Sample>::from_request(req, &()).await.unwrap();
        assert_eq!(payload.data.name, "House");
        assert!(payload.document.is_none());
    }

    #[tokio::test]
    async fn multipart_carries_data_and_document() {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"data\"\r\n\r\n\
             {{\"name\": \"House\"}}\r\n\
             --{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"document\"; filename=\"deed.pdf\"\r\n\
             Content-Type: application/pdf\r\n\r\n\
             deed-bytes\r\n\
             --{BOUNDARY}--\r\n"
        );

        let payload = WithDocument::<Sample>::from_request(multipart_request(body), &())
            .await
            .unwrap();
        assert_eq!(payload.data, Sample { name: "House".into() });
        let document = payload.document.unwrap();
        assert_eq!(document.file_name, "deed.pdf");
        assert_eq!(&document.bytes[..], b"deed-bytes");
    }

    #[tokio::test]
    async fn multipart_without_data_is_unprocessable() {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"document\"; filename=\"deed.pdf\"\r\n\r\n\
             deed-bytes\r\n\
             --{BOUNDARY}--\r\n"
        );

        let err = WithDocument::<Sample>::from_request(multipart_request(body), &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
