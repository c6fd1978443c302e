use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::record::{Column, FieldValue, FilterKind, TableRecord};

/// Best bid and offer published by one market center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bbo {
  pub symbol: String,
  pub market_center: String,
  pub bid_price: Decimal,
  pub bid_size: u64,
  pub ask_price: Decimal,
  pub ask_size: u64,
  pub timestamp: DateTime<Utc>
}

impl Bbo {
  pub fn spread(&self) -> Decimal {
    self.ask_price - self.bid_price
  }

  pub fn is_crossed(&self) -> bool {
    self.bid_price > self.ask_price
  }
}

impl TableRecord for Bbo {
  fn key(&self) -> String {
    format!("{}:{}", self.symbol, self.market_center)
  }

  fn columns() -> Vec<Column> {
    vec![
      Column::text("symbol", "Symbol").sortable().with_filter(FilterKind::Select),
      Column::text("market_center", "Market Center").with_filter(FilterKind::Select),
      Column::number("bid_size", "Bid Size"),
      Column::number("bid_price", "Bid").sortable(),
      Column::number("ask_price", "Ask").sortable(),
      Column::number("ask_size", "Ask Size"),
      Column::number("spread", "Spread").sortable(),
      Column::text("crossed", "Crossed").with_filter(FilterKind::Select),
      Column::time("timestamp", "Time").sortable().with_filter(FilterKind::Range)
    ]
  }

  fn field(&self, name: &str) -> Option<FieldValue> {
    match name {
      "symbol" => Some(self.symbol.as_str().into()),
      "market_center" => Some(self.market_center.as_str().into()),
      "bid_price" => Some(self.bid_price.into()),
      "bid_size" => Some(self.bid_size.into()),
      "ask_price" => Some(self.ask_price.into()),
      "ask_size" => Some(self.ask_size.into()),
      "spread" => Some(self.spread().into()),
      "crossed" => Some(self.is_crossed().into()),
      "timestamp" => Some(self.timestamp.into()),
      _ => None
    }
  }
}
