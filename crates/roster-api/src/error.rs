//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_core::ValidationErrors;
use serde_json::json;
use thiserror::Error;

/// An error returned by an extractor or handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// One or more fields failed binding. Rendered as 422 with every violation.
  #[error("{0}")]
  Validation(#[from] ValidationErrors),

  #[error("not found: {0}")]
  NotFound(String),

  /// The body could not be parsed at all (malformed JSON, broken multipart).
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  /// Machine-readable kind carried in the response body.
  pub fn kind(&self) -> &'static str {
    match self {
      ApiError::Validation(_) => "ValidationError",
      ApiError::NotFound(_) => "NotFound",
      ApiError::BadRequest(_) => "BadRequest",
      ApiError::Internal(_) => "Internal",
    }
  }
}

impl From<roster_core::Error> for ApiError {
  fn from(e: roster_core::Error) -> Self {
    match e {
      roster_core::Error::Validation(v) => ApiError::Validation(v),
      other => ApiError::Internal(other.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let kind = self.kind();
    match self {
      ApiError::Validation(errors) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
          "kind":   kind,
          "detail": errors.to_string(),
          "errors": errors,
        })),
      )
        .into_response(),
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "kind": kind, "detail": m })))
          .into_response()
      }
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "kind": kind, "detail": m })))
          .into_response()
      }
      ApiError::Internal(m) => {
        tracing::error!(error = %m, "internal error while handling request");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "kind": kind, "detail": "internal server error" })),
        )
          .into_response()
      }
    }
  }
}
