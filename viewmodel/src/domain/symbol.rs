use std::{collections::HashMap, fmt, str::FromStr};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{error::FieldError, record::{Column, FieldValue, FilterKind, TableRecord}};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
  Equity,
  Etf,
  Bond,
  Option,
  Crypto
}

impl AssetClass {
  pub const ALL: [AssetClass; 5] = [AssetClass::Equity, AssetClass::Etf, AssetClass::Bond, AssetClass::Option, AssetClass::Crypto];

  /// Wire name, as used in form values.
  pub fn code(&self) -> &'static str {
    match self {
      AssetClass::Equity => "equity",
      AssetClass::Etf => "etf",
      AssetClass::Bond => "bond",
      AssetClass::Option => "option",
      AssetClass::Crypto => "crypto"
    }
  }

  pub fn from_code(code: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|c| c.code() == code)
  }
}

impl fmt::Display for AssetClass {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      AssetClass::Equity => "Equity",
      AssetClass::Etf => "ETF",
      AssetClass::Bond => "Bond",
      AssetClass::Option => "Option",
      AssetClass::Crypto => "Crypto"
    };
    write!(f, "{}", label)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolStatus {
  Active,
  Halted,
  Delisted
}

impl SymbolStatus {
  pub const ALL: [SymbolStatus; 3] = [SymbolStatus::Active, SymbolStatus::Halted, SymbolStatus::Delisted];

  pub fn code(&self) -> &'static str {
    match self {
      SymbolStatus::Active => "active",
      SymbolStatus::Halted => "halted",
      SymbolStatus::Delisted => "delisted"
    }
  }

  pub fn from_code(code: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|s| s.code() == code)
  }
}

impl fmt::Display for SymbolStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      SymbolStatus::Active => "Active",
      SymbolStatus::Halted => "Halted",
      SymbolStatus::Delisted => "Delisted"
    };
    write!(f, "{}", label)
  }
}

/// Entry of the symbol registry maintained from the admin screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolEntry {
  pub symbol: String,
  pub name: String,
  pub asset_class: AssetClass,
  pub status: SymbolStatus,
  pub lot_size: u64,
  pub tick_size: Decimal,
  pub listed_at: DateTime<Utc>
}

const MAX_SYMBOL_LEN: usize = 11;

impl SymbolEntry {
  /// Builds a draft from the raw values of the add/edit form.
  ///
  /// Only parse failures are reported here; the draft still has to pass
  /// [`TableRecord::validate`]. An edited entry keeps its original listing date.
  pub fn from_form(values: &HashMap<String, String>, original: Option<&SymbolEntry>, now: DateTime<Utc>) -> Result<SymbolEntry, Vec<FieldError>> {
    let text = |key: &str| values.get(key).map(|v| v.trim().to_string()).unwrap_or_default();
    let mut errors = Vec::new();

    let asset_class = AssetClass::from_code(&text("asset_class")).unwrap_or_else(|| {
      errors.push(FieldError::new("asset_class", "is not a known asset class"));
      AssetClass::Equity
    });
    let status = SymbolStatus::from_code(&text("status")).unwrap_or_else(|| {
      errors.push(FieldError::new("status", "is not a known status"));
      SymbolStatus::Active
    });
    let lot_size = text("lot_size").parse::<u64>().unwrap_or_else(|_| {
      errors.push(FieldError::new("lot_size", "must be a whole number"));
      0
    });
    let tick_size = Decimal::from_str(&text("tick_size")).unwrap_or_else(|_| {
      errors.push(FieldError::new("tick_size", "must be a decimal number"));
      Decimal::ZERO
    });

    if !errors.is_empty() {
      return Err(errors);
    }
    Ok(SymbolEntry {
      symbol: text("symbol").to_ascii_uppercase(),
      name: text("name"),
      asset_class,
      status,
      lot_size,
      tick_size,
      listed_at: original.map_or(now, |e| e.listed_at)
    })
  }
}

impl TableRecord for SymbolEntry {
  fn key(&self) -> String {
    self.symbol.clone()
  }

  fn columns() -> Vec<Column> {
    vec![
      Column::text("symbol", "Symbol").sortable().with_filter(FilterKind::Search),
      Column::text("name", "Name").sortable().with_filter(FilterKind::Search),
      Column::text("asset_class", "Class").with_filter(FilterKind::Select),
      Column::text("status", "Status").with_filter(FilterKind::Select),
      Column::number("lot_size", "Lot"),
      Column::number("tick_size", "Tick"),
      Column::time("listed_at", "Listed").sortable().with_filter(FilterKind::Range)
    ]
  }

  fn field(&self, name: &str) -> Option<FieldValue> {
    match name {
      "symbol" => Some(self.symbol.as_str().into()),
      "name" => Some(self.name.as_str().into()),
      "asset_class" => Some(self.asset_class.to_string().into()),
      "status" => Some(self.status.to_string().into()),
      "lot_size" => Some(self.lot_size.into()),
      "tick_size" => Some(self.tick_size.into()),
      "listed_at" => Some(self.listed_at.into()),
      _ => None
    }
  }

  fn validate(&self) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let symbol = self.symbol.trim();
    if symbol.is_empty() {
      errors.push(FieldError::new("symbol", "is required"));
    } else if symbol.len() > MAX_SYMBOL_LEN {
      errors.push(FieldError::new("symbol", format!("must be at most {} characters", MAX_SYMBOL_LEN)));
    } else if !symbol.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.') {
      errors.push(FieldError::new("symbol", "may only contain A-Z, 0-9 and '.'"));
    }
    if self.name.trim().is_empty() {
      errors.push(FieldError::new("name", "is required"));
    }
    if self.lot_size == 0 {
      errors.push(FieldError::new("lot_size", "must be greater than zero"));
    }
    if self.tick_size <= Decimal::ZERO {
      errors.push(FieldError::new("tick_size", "must be greater than zero"));
    }
    errors
  }
}
