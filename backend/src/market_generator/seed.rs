use chrono::{TimeZone, Utc};
use portal_viewmodel::domain::{AssetClass, SymbolEntry, SymbolStatus};
use rust_decimal::Decimal;

/// Listing the simulator starts from: symbol, name, class, reference price.
const LISTINGS: [(&str, &str, AssetClass, f64); 8] = [
  ("ACME", "Acme Corp", AssetClass::Equity, 120.0),
  ("GLBX", "Globex Holdings", AssetClass::Equity, 54.25),
  ("INIT", "Initech Inc", AssetClass::Equity, 33.5),
  ("UMBR", "Umbrella Pharma", AssetClass::Equity, 210.0),
  ("HOOLI", "Hooli Systems", AssetClass::Equity, 87.1),
  ("SPYX", "Broad Market ETF", AssetClass::Etf, 480.0),
  ("TBND", "Treasury Bond ETF", AssetClass::Etf, 95.4),
  ("BTC.X", "Bitcoin Index", AssetClass::Crypto, 64_000.0)
];

pub fn listings() -> Vec<(SymbolEntry, f64)> {
  let listed_at = Utc.with_ymd_and_hms(2019, 6, 3, 13, 30, 0).single().unwrap_or_default();

  LISTINGS.iter().map(|(symbol, name, asset_class, price)| {
    let tick_size = match asset_class {
      AssetClass::Crypto => Decimal::new(1, 0),
      _ => Decimal::new(1, 2)
    };
    let lot_size = match asset_class {
      AssetClass::Crypto => 1,
      _ => 100
    };
    let entry = SymbolEntry {
      symbol: symbol.to_string(),
      name: name.to_string(),
      asset_class: *asset_class,
      status: SymbolStatus::Active,
      lot_size,
      tick_size,
      listed_at
    };
    (entry, *price)
  }).collect()
}
