// server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use primebasket::ShopError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error(transparent)]
  Shop(#[from] ShopError),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Bad Request: {0}")]
  BadRequest(String),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// The text placed under `"error"` in the response body.
  fn client_message(&self) -> String {
    match self {
      AppError::Shop(e) => e.public_message(),
      AppError::Config(m) | AppError::BadRequest(m) | AppError::Internal(m) => m.clone(),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Shop(ShopError::Validation(_)) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
      AppError::Shop(ShopError::NotFound(_)) => StatusCode::NOT_FOUND,
      AppError::Shop(ShopError::Auth(_)) => StatusCode::UNAUTHORIZED,
      AppError::Shop(_) | AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::info!(application_error = %self, status = status.as_u16(), "Rejecting request");
    }
    HttpResponse::build(status).json(json!({"error": self.client_message()}))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn statuses_follow_error_kind() {
    let cases = [
      (AppError::from(ShopError::validation("x")), StatusCode::BAD_REQUEST),
      (AppError::from(ShopError::not_found("x")), StatusCode::NOT_FOUND),
      (AppError::from(ShopError::auth("x")), StatusCode::UNAUTHORIZED),
      (AppError::from(ShopError::Internal("x".into())), StatusCode::INTERNAL_SERVER_ERROR),
      (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
      (AppError::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, status) in cases {
      assert_eq!(err.status_code(), status, "{}", err);
    }
  }

  #[test]
  fn body_carries_the_bare_message() {
    let err = AppError::from(ShopError::not_found("Product not found"));
    assert_eq!(err.client_message(), "Product not found");
  }
}
