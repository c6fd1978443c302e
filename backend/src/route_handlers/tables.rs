use axum::{
  extract::{Query, State},
  http::header,
  response::{IntoResponse, Response},
  Json
};
use portal_viewmodel::{
  domain::{Bbo, DepthLevel, LastSale, Quote, SymbolEntry},
  export,
  view::view,
  ExportFormat, FilterCriteria, SortSpec, TableRecord
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::info;

use crate::{market_generator::gen::MarketSimulator, midwares::app_state::{AppError, AppState}};

/// A dataset the market exposes as a list endpoint plus its download.
pub trait MarketTable: TableRecord + Serialize + Send + Sync {
  /// Path segment under `/api` and stem of the downloaded file.
  const ENDPOINT: &'static str;

  fn collect(market: &MarketSimulator) -> Vec<Self>;
}

impl MarketTable for Quote {
  const ENDPOINT: &'static str = "quotes";

  fn collect(market: &MarketSimulator) -> Vec<Self> {
    market.quotes()
  }
}

impl MarketTable for Bbo {
  const ENDPOINT: &'static str = "bbo";

  fn collect(market: &MarketSimulator) -> Vec<Self> {
    market.bbos()
  }
}

impl MarketTable for DepthLevel {
  const ENDPOINT: &'static str = "depth";

  fn collect(market: &MarketSimulator) -> Vec<Self> {
    market.depth()
  }
}

impl MarketTable for LastSale {
  const ENDPOINT: &'static str = "last-sales";

  fn collect(market: &MarketSimulator) -> Vec<Self> {
    market.last_sales()
  }
}

impl MarketTable for SymbolEntry {
  const ENDPOINT: &'static str = "symbols";

  fn collect(market: &MarketSimulator) -> Vec<Self> {
    market.symbols()
  }
}

pub async fn list<T: MarketTable>(State(state): State<AppState>) -> Result<Json<Vec<T>>, AppError> {
  state.faults.check(T::ENDPOINT)?;
  let rows = T::collect(&*state.market.read().await);
  Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
  format: Option<ExportFormat>,
  /// JSON encoded `FilterCriteria`.
  filters: Option<String>,
  /// JSON encoded `SortSpec`.
  sort: Option<String>
}

pub async fn download<T: MarketTable>(
  State(state): State<AppState>,
  Query(params): Query<DownloadParams>
) -> Result<Response, AppError> {
  let format = params.format.unwrap_or(ExportFormat::Csv);
  let criteria: FilterCriteria = parse_param("filters", params.filters.as_deref())?.unwrap_or_default();
  let sort: Option<SortSpec> = parse_param("sort", params.sort.as_deref())?;

  let rows = {
    let market = state.market.read().await;
    view(&T::collect(&market), &criteria, sort.as_ref())
  };
  info!(endpoint = T::ENDPOINT, rows = rows.len(), format = format.extension(), "serving download");

  let body = export::render(&rows, format).map_err(|e| AppError::InternalError(e.to_string()))?;
  let disposition = format!("attachment; filename=\"{}\"", export::file_name(T::ENDPOINT, format));

  Ok((
    [(header::CONTENT_TYPE, format.mime_type().to_string()), (header::CONTENT_DISPOSITION, disposition)],
    body
  ).into_response())
}

fn parse_param<V: DeserializeOwned>(name: &str, raw: Option<&str>) -> Result<Option<V>, AppError> {
  match raw.map(str::trim) {
    None | Some("") => Ok(None),
    Some(raw) => serde_json::from_str(raw)
      .map(Some)
      .map_err(|e| AppError::BadRequest(format!("Invalid {} parameter: {}", name, e)))
  }
}
