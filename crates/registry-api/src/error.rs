//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Resources never decide HTTP status codes themselves: whatever the person
//! service raises is wrapped in an [`ApiError`] and mapped here.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by a resource operation or API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("validation failed: {0}")]
  Validation(String),

  #[error("conversion error: {0}")]
  Conversion(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a person-service error. A validation failure anywhere in the
  /// source chain becomes [`ApiError::Validation`].
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    let mut cause: Option<&(dyn std::error::Error + 'static)> = Some(&e);
    while let Some(err) = cause {
      if let Some(registry_core::Error::Validation(msg)) =
        err.downcast_ref::<registry_core::Error>()
      {
        return ApiError::Validation(msg.clone());
      }
      cause = err.source();
    }
    ApiError::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) | ApiError::Validation(m) => {
        (StatusCode::BAD_REQUEST, m.clone())
      }
      ApiError::Conversion(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"registry\""),
      );
    }
    res
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Error)]
  enum Wrapper {
    #[error("core error: {0}")]
    Core(#[from] registry_core::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
  }

  #[test]
  fn nested_validation_maps_to_400() {
    let err = ApiError::store(Wrapper::from(registry_core::Error::Validation(
      "givenName is required".into(),
    )));
    assert!(matches!(&err, ApiError::Validation(m) if m == "givenName is required"));
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
  }

  #[test]
  fn other_store_errors_map_to_500() {
    let err = ApiError::store(Wrapper::from(std::io::Error::other("disk gone")));
    assert!(matches!(err, ApiError::Store(_)));
    assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn unauthorized_carries_challenge() {
    let res = ApiError::Unauthorized.into_response();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
  }
}
