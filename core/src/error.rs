// core/src/error.rs
use thiserror::Error;

/// Faults raised by the pipeline engine itself rather than by step handlers.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Handler missing for step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("No pipeline registered for context type {type_name}")]
  NotRegistered { type_name: String },

  #[error("Type mismatch during context dispatch (expected {expected_type})")]
  TypeMismatch { expected_type: String },
}

/// Domain error shared by every service in the crate.
///
/// The message carried by `Validation`, `NotFound` and `Auth` is what the HTTP
/// edge sends back to the client, so it is written for end users.
#[derive(Debug, Error)]
pub enum ShopError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Database Error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Workflow Error: {0}")]
  Flow(#[from] FlowError),

  #[error("Internal Error: {0}")]
  Internal(String),
}

impl ShopError {
  pub fn validation(message: impl Into<String>) -> Self {
    ShopError::Validation(message.into())
  }

  pub fn not_found(message: impl Into<String>) -> Self {
    ShopError::NotFound(message.into())
  }

  pub fn auth(message: impl Into<String>) -> Self {
    ShopError::Auth(message.into())
  }

  /// The client-facing part of the error, without the category prefix.
  pub fn public_message(&self) -> String {
    match self {
      ShopError::Validation(m) | ShopError::NotFound(m) | ShopError::Auth(m) | ShopError::Internal(m) => m.clone(),
      ShopError::Database(e) => e.to_string(),
      ShopError::Flow(e) => e.to_string(),
    }
  }
}

pub type Result<T, E = ShopError> = std::result::Result<T, E>;
