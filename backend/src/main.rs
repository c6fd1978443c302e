mod market_generator;
mod midwares;
mod route_handlers;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use axum::{
  http::{HeaderValue, Method},
  routing::{get, put},
  Json, Router
};
use chrono::Utc;
use clap::Parser;
use portal_viewmodel::domain::{Bbo, DepthLevel, LastSale, Quote, SymbolEntry};
use serde::Serialize;
use tokio::{net::TcpListener, sync::RwLock, time::{self, MissedTickBehavior}};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use market_generator::gen::MarketSimulator;
use midwares::app_state::{AppError, AppState, FaultInjector};
use route_handlers::{
  symbols::{create_symbol, delete_symbol, update_symbol},
  tables::{download, list}
};

#[derive(Debug, Parser)]
#[command(name = "portal-backend", about = "Simulated market data service for the portal front-end")]
struct Args {
  /// Listen address.
  #[arg(long, default_value = "0.0.0.0:7575", env = "PORTAL_LISTEN")]
  listen: SocketAddr,

  /// Interval between market ticks in milliseconds.
  #[arg(long, default_value_t = 1_000, env = "PORTAL_TICK_MS")]
  tick_ms: u64,

  /// Probability in [0, 1] that a list request fails with 503.
  #[arg(long, default_value_t = 0.0, env = "PORTAL_FAILURE_RATE", value_parser = parse_rate)]
  failure_rate: f64,

  /// Seed for a reproducible market.
  #[arg(long, env = "PORTAL_SEED")]
  seed: Option<u64>,

  /// Allowed CORS origin. Any origin when unset.
  #[arg(long, env = "PORTAL_ALLOWED_ORIGIN")]
  allowed_origin: Option<String>,
}

fn parse_rate(raw: &str) -> Result<f64, String> {
  let rate = raw.parse::<f64>().map_err(|e| e.to_string())?;
  if (0.0..=1.0).contains(&rate) {
    Ok(rate)
  } else {
    Err(format!("{} is not a probability", rate))
  }
}

#[derive(Serialize)]
struct Health {
  code: u16,
  status: &'static str
}

async fn health() -> Json<Health> {
  Json(Health { code: 200, status: "ok" })
}

fn app(state: AppState) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/api/quotes", get(list::<Quote>))
    .route("/api/quotes/download", get(download::<Quote>))
    .route("/api/bbo", get(list::<Bbo>))
    .route("/api/bbo/download", get(download::<Bbo>))
    .route("/api/depth", get(list::<DepthLevel>))
    .route("/api/depth/download", get(download::<DepthLevel>))
    .route("/api/last-sales", get(list::<LastSale>))
    .route("/api/last-sales/download", get(download::<LastSale>))
    .route("/api/symbols", get(list::<SymbolEntry>).post(create_symbol))
    .route("/api/symbols/download", get(download::<SymbolEntry>))
    .route("/api/symbols/{symbol}", put(update_symbol).delete(delete_symbol))
    .with_state(state)
}

fn cors(allowed_origin: Option<&str>) -> Result<CorsLayer, AppError> {
  let layer = CorsLayer::new()
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
    .allow_headers(Any);
  match allowed_origin {
    Some(origin) => {
      let origin = origin.parse::<HeaderValue>().map_err(|e| AppError::BadRequest(e.to_string()))?;
      Ok(layer.allow_origin(origin))
    },
    None => Ok(layer.allow_origin(Any))
  }
}

fn spawn_ticker(market: Arc<RwLock<MarketSimulator>>, every: Duration) {
  tokio::spawn(async move {
    let mut interval = time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // the first tick completes immediately
    interval.tick().await;
    loop {
      interval.tick().await;
      market.write().await.tick(Utc::now());
    }
  });
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(error = %e, "could not listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
  let args = Args::parse();

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let market = MarketSimulator::new(args.seed, Utc::now())?;
  let state = AppState::new(market, FaultInjector::new(args.failure_rate));
  spawn_ticker(Arc::clone(&state.market), Duration::from_millis(args.tick_ms.max(1)));

  let router = app(state).layer(cors(args.allowed_origin.as_deref())?);

  let listener = TcpListener::bind(args.listen).await.map_err(|e| AppError::InternalError(e.to_string()))?;
  info!(listen = %args.listen, tick_ms = args.tick_ms, failure_rate = args.failure_rate, "portal backend started");

  axum::serve(listener, router)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode}
  };
  use portal_viewmodel::{domain::{AssetClass, SymbolStatus}, ErrorPayload};
  use rust_decimal_macros::dec;
  use tower::ServiceExt;

  fn state(failure_rate: f64) -> AppState {
    let market = MarketSimulator::new(Some(42), Utc::now()).unwrap();
    AppState::new(market, FaultInjector::new(failure_rate))
  }

  async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
  }

  fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
  }

  fn json_req(method: Method, uri: &str, body: &impl Serialize) -> Request<Body> {
    Request::builder()
      .method(method)
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(serde_json::to_vec(body).unwrap()))
      .unwrap()
  }

  fn listing(symbol: &str) -> SymbolEntry {
    SymbolEntry {
      symbol: symbol.to_string(),
      name: "Stark Industries".to_string(),
      asset_class: AssetClass::Equity,
      status: SymbolStatus::Active,
      lot_size: 100,
      tick_size: dec!(0.01),
      listed_at: Utc::now()
    }
  }

  #[tokio::test]
  async fn health_reports_ok() {
    let (status, body) = send(app(state(0.0)), get_req("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "ok");
  }

  #[tokio::test]
  async fn list_endpoints_return_json_arrays() {
    let router = app(state(0.0));
    let (status, body) = send(router.clone(), get_req("/api/quotes")).await;
    assert_eq!(status, StatusCode::OK);
    let quotes: Vec<Quote> = serde_json::from_slice(&body).unwrap();
    assert!(quotes.iter().any(|q| q.symbol == "ACME"));

    let (status, body) = send(router, get_req("/api/depth")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!serde_json::from_slice::<Vec<DepthLevel>>(&body).unwrap().is_empty());
  }

  #[tokio::test]
  async fn injected_failures_carry_a_message_list() {
    let (status, body) = send(app(state(1.0)), get_req("/api/last-sales")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let payload: ErrorPayload = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload.messages, vec!["The last-sales feed is temporarily unavailable"]);
  }

  #[tokio::test]
  async fn csv_download_applies_filters_and_sort() {
    let filters = r#"{"symbol":{"type":"OneOf","value":["ACME","INIT"]}}"#;
    let sort = r#"{"column":"symbol","order":"Descending"}"#;
    let uri = format!(
      "/api/quotes/download?format=csv&filters={}&sort={}",
      urlencode(filters),
      urlencode(sort)
    );
    let response = app(state(0.0)).oneshot(get_req(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    assert_eq!(response.headers()[header::CONTENT_DISPOSITION], "attachment; filename=\"quotes.csv\"");

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(body.to_vec()).unwrap();
    let symbols = csv.lines().skip(1).map(|l| l.split(',').next().unwrap_or_default()).collect::<Vec<_>>();
    assert_eq!(symbols, vec!["INIT", "ACME"]);
  }

  #[tokio::test]
  async fn malformed_filters_are_a_bad_request() {
    let (status, body) = send(app(state(0.0)), get_req("/api/bbo/download?filters=%7Bnope")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let payload: ErrorPayload = serde_json::from_slice(&body).unwrap();
    assert!(payload.messages[0].starts_with("Invalid filters parameter"));
  }

  #[tokio::test]
  async fn symbol_registry_round_trip() {
    let router = app(state(0.0));

    let (status, _) = send(router.clone(), json_req(Method::POST, "/api/symbols", &listing("STRK"))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(router.clone(), json_req(Method::POST, "/api/symbols", &listing("STRK"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(serde_json::from_slice::<ErrorPayload>(&body).unwrap().messages, vec!["Symbol STRK already exists"]);

    let mut halted = listing("STRK");
    halted.status = SymbolStatus::Halted;
    let (status, body) = send(router.clone(), json_req(Method::PUT, "/api/symbols/STRK", &halted)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<SymbolEntry>(&body).unwrap().status, SymbolStatus::Halted);

    let delete = Request::builder().method(Method::DELETE).uri("/api/symbols/STRK").body(Body::empty()).unwrap();
    let (status, _) = send(router.clone(), delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(router, get_req("/api/symbols")).await;
    let symbols: Vec<SymbolEntry> = serde_json::from_slice(&body).unwrap();
    assert!(symbols.iter().all(|e| e.symbol != "STRK"));
  }

  #[tokio::test]
  async fn invalid_symbol_is_unprocessable() {
    let mut entry = listing("");
    entry.lot_size = 0;
    let (status, body) = send(app(state(0.0)), json_req(Method::POST, "/api/symbols", &entry)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let payload: ErrorPayload = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload.messages, vec!["symbol: is required", "lot_size: must be greater than zero"]);
  }

  #[tokio::test]
  async fn unknown_symbol_update_is_not_found() {
    let (status, _) = send(app(state(0.0)), json_req(Method::PUT, "/api/symbols/NOPE", &listing("NOPE"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[test]
  fn failure_rate_must_be_a_probability() {
    assert_eq!(parse_rate("0.25"), Ok(0.25));
    assert!(parse_rate("1.5").is_err());
    assert!(parse_rate("often").is_err());
  }

  fn urlencode(raw: &str) -> String {
    raw.bytes().map(|b| match b {
      b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' => (b as char).to_string(),
      _ => format!("%{:02X}", b)
    }).collect()
  }
}
