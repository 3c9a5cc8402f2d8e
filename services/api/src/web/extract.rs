//! services/api/src/web/extract.rs
//!
//! A JSON body extractor whose rejections use the service's error body.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// Like `axum::Json`, but a malformed body becomes a 400 `{error}` response.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
