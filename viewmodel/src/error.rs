use std::fmt;
use serde::{Deserialize, Serialize};

/// Structured error body returned by the portal services.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorPayload {
  pub messages: Vec<String>
}

/// A single field-level validation message shown inline in a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
  pub field: String,
  pub message: String
}

impl FieldError {
  pub fn new(field: &str, message: impl Into<String>) -> Self {
    FieldError { field: field.to_string(), message: message.into() }
  }
}

// App Errors
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
  ConnectionError(String),
  ServerError(u16, Vec<String>),
  SerializeError(String),
  DeserializeError(String),
  StorageError(String),
  ModalError(String),
  ValidationError(Vec<FieldError>),
  NotFound(String),
  PlatformError(String),
}

impl AppError {
  /// Flattens the error into the message list rendered by an error panel.
  pub fn messages(&self) -> Vec<String> {
    match self {
      AppError::ServerError(status, msgs) if msgs.is_empty() => vec![format!("Server responded with status {}", status)],
      AppError::ServerError(_, msgs) => msgs.clone(),
      AppError::ValidationError(errs) => errs.iter().map(|e| format!("{}: {}", e.field, e.message)).collect(),
      other => vec![other.to_string()]
    }
  }
}

impl From<ErrorPayload> for AppError {
  fn from(payload: ErrorPayload) -> Self {
    AppError::ServerError(500, payload.messages)
  }
}

impl std::error::Error for AppError {}

impl fmt::Display for AppError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AppError::ConnectionError(msg) => write!(f, "Connection error: {}", msg),
      AppError::ServerError(status, msgs) => write!(f, "Server error ({}): {}", status, msgs.join("; ")),
      AppError::SerializeError(msg) => write!(f, "Serialize error: {}", msg),
      AppError::DeserializeError(msg) => write!(f, "Deserialize error: {}", msg),
      AppError::StorageError(msg) => write!(f, "Storage error: {}", msg),
      AppError::ModalError(msg) => write!(f, "Modal error: {}", msg),
      AppError::ValidationError(errs) => write!(f, "Validation failed for {} field(s)", errs.len()),
      AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
      AppError::PlatformError(msg) => write!(f, "Platform error: {}", msg),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn server_error_surfaces_payload_messages() {
    let err = AppError::ServerError(503, vec!["feed down".into(), "retry later".into()]);
    assert_eq!(err.messages(), vec!["feed down".to_string(), "retry later".to_string()]);
  }

  #[test]
  fn server_error_without_messages_mentions_status() {
    let err = AppError::ServerError(502, vec![]);
    assert_eq!(err.messages(), vec!["Server responded with status 502".to_string()]);
  }

  #[test]
  fn payload_deserializes_from_service_body() {
    let payload: ErrorPayload = serde_json::from_str(r#"{"messages":["bad symbol"]}"#).unwrap();
    let err: AppError = payload.into();
    assert_eq!(err.messages(), vec!["bad symbol".to_string()]);
  }

  #[test]
  fn validation_errors_are_prefixed_by_field() {
    let err = AppError::ValidationError(vec![FieldError::new("symbol", "is required")]);
    assert_eq!(err.messages(), vec!["symbol: is required".to_string()]);
  }
}
