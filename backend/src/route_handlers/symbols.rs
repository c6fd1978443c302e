use axum::{
  extract::{rejection::JsonRejection, Path, State},
  http::StatusCode,
  Json
};
use chrono::Utc;
use portal_viewmodel::domain::SymbolEntry;
use tracing::info;

use crate::midwares::app_state::{AppError, AppState};

fn body(payload: Result<Json<SymbolEntry>, JsonRejection>) -> Result<SymbolEntry, AppError> {
  payload
    .map(|Json(entry)| entry)
    .map_err(|e| AppError::BadRequest(e.body_text()))
}

pub async fn create_symbol(
  State(state): State<AppState>,
  payload: Result<Json<SymbolEntry>, JsonRejection>
) -> Result<(StatusCode, Json<SymbolEntry>), AppError> {
  let entry = body(payload)?;
  let created = state.market.write().await.add_symbol(entry, Utc::now())?;
  info!(symbol = %created.symbol, "symbol listed");
  Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_symbol(
  State(state): State<AppState>,
  Path(symbol): Path<String>,
  payload: Result<Json<SymbolEntry>, JsonRejection>
) -> Result<Json<SymbolEntry>, AppError> {
  let entry = body(payload)?;
  let updated = state.market.write().await.update_symbol(&symbol, entry, Utc::now())?;
  info!(from = %symbol, to = %updated.symbol, "symbol updated");
  Ok(Json(updated))
}

pub async fn delete_symbol(
  State(state): State<AppState>,
  Path(symbol): Path<String>
) -> Result<StatusCode, AppError> {
  state.market.write().await.remove_symbol(&symbol, Utc::now())?;
  info!(symbol = %symbol, "symbol delisted");
  Ok(StatusCode::NO_CONTENT)
}
