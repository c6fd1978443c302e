use std::{fmt, sync::Arc};
use axum::{http::StatusCode, response::IntoResponse, Json};
use portal_viewmodel::{ErrorPayload, FieldError};
use tokio::sync::RwLock;
use tracing::warn;

use crate::market_generator::gen::MarketSimulator;

#[derive(Debug, Clone)]
pub enum AppError {
  BadRequest(String),
  NotFound(String),
  Conflict(String),
  Validation(Vec<FieldError>),
  Unavailable(String),
  InternalError(String),
}

impl AppError {
  fn status(&self) -> StatusCode {
    match self {
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
      Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn messages(self) -> Vec<String> {
    match self {
      Self::Validation(errors) => errors.into_iter().map(|e| format!("{}: {}", e.field, e.message)).collect(),
      Self::BadRequest(msg)
      | Self::NotFound(msg)
      | Self::Conflict(msg)
      | Self::Unavailable(msg)
      | Self::InternalError(msg) => vec![msg],
    }
  }
}

impl fmt::Display for AppError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
      Self::NotFound(msg) => write!(f, "Not found: {}", msg),
      Self::Conflict(msg) => write!(f, "Conflict: {}", msg),
      Self::Validation(errors) => write!(f, "Validation failed for {} field(s)", errors.len()),
      Self::Unavailable(msg) => write!(f, "Unavailable: {}", msg),
      Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
    }
  }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
  fn into_response(self) -> axum::response::Response {
    let status = self.status();
    let body = Json(ErrorPayload { messages: self.messages() });

    (status, body).into_response()
  }
}

/// Fails list requests at random so clients can exercise their stale-data path.
#[derive(Debug, Clone, Copy)]
pub struct FaultInjector {
  rate: f64
}

impl FaultInjector {
  pub fn new(rate: f64) -> Self {
    Self { rate: rate.clamp(0.0, 1.0) }
  }

  pub fn check(&self, endpoint: &str) -> Result<(), AppError> {
    if self.rate > 0.0 && rand::random::<f64>() < self.rate {
      warn!(endpoint, "injecting a feed failure");
      return Err(AppError::Unavailable(format!("The {} feed is temporarily unavailable", endpoint)));
    }
    Ok(())
  }
}

#[derive(Clone)]
pub struct AppState {
  pub market: Arc<RwLock<MarketSimulator>>,
  pub faults: FaultInjector
}

impl AppState {
  pub fn new(market: MarketSimulator, faults: FaultInjector) -> Self {
    Self { market: Arc::new(RwLock::new(market)), faults }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::body::to_bytes;

  #[tokio::test]
  async fn validation_errors_render_as_message_list() {
    let err = AppError::Validation(vec![FieldError::new("symbol", "is required"), FieldError::new("lot_size", "must be greater than zero")]);
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: ErrorPayload = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload.messages, vec!["symbol: is required", "lot_size: must be greater than zero"]);
  }

  #[test]
  fn fault_rate_bounds() {
    assert!(FaultInjector::new(0.0).check("quotes").is_ok());
    assert!(matches!(FaultInjector::new(1.0).check("quotes"), Err(AppError::Unavailable(_))));
    assert!(matches!(FaultInjector::new(7.0).check("bbo"), Err(AppError::Unavailable(_))));
  }
}
