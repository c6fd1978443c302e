use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::record::{Column, FieldValue, FilterKind, TableRecord};

/// One line of the quote board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
  pub symbol: String,
  pub bid_price: Decimal,
  pub bid_size: u64,
  pub ask_price: Decimal,
  pub ask_size: u64,
  pub last_price: Decimal,
  pub change: Decimal,
  pub volume: u64,
  pub updated_at: DateTime<Utc>
}

impl Quote {
  pub fn change_pct(&self) -> Decimal {
    let previous = self.last_price - self.change;
    if previous.is_zero() {
      return Decimal::ZERO;
    }
    (self.change / previous * Decimal::ONE_HUNDRED).round_dp(2)
  }
}

impl TableRecord for Quote {
  fn key(&self) -> String {
    self.symbol.clone()
  }

  fn columns() -> Vec<Column> {
    vec![
      Column::text("symbol", "Symbol").sortable().with_filter(FilterKind::Select),
      Column::number("bid_price", "Bid").sortable(),
      Column::number("bid_size", "Bid Size"),
      Column::number("ask_price", "Ask").sortable(),
      Column::number("ask_size", "Ask Size"),
      Column::number("last_price", "Last").sortable().with_filter(FilterKind::Range),
      Column::number("change", "Chg").sortable(),
      Column::number("change_pct", "Chg %").sortable(),
      Column::number("volume", "Volume").sortable(),
      Column::time("updated_at", "Updated").sortable()
    ]
  }

  fn field(&self, name: &str) -> Option<FieldValue> {
    match name {
      "symbol" => Some(self.symbol.as_str().into()),
      "bid_price" => Some(self.bid_price.into()),
      "bid_size" => Some(self.bid_size.into()),
      "ask_price" => Some(self.ask_price.into()),
      "ask_size" => Some(self.ask_size.into()),
      "last_price" => Some(self.last_price.into()),
      "change" => Some(self.change.into()),
      "change_pct" => Some(self.change_pct().into()),
      "volume" => Some(self.volume.into()),
      "updated_at" => Some(self.updated_at.into()),
      _ => None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use rust_decimal_macros::dec;

  #[test]
  fn change_pct_is_relative_to_previous_close() {
    let quote = Quote {
      symbol: "AAA".into(),
      bid_price: dec!(10.9),
      bid_size: 100,
      ask_price: dec!(11.1),
      ask_size: 200,
      last_price: dec!(11),
      change: dec!(1),
      volume: 5_000,
      updated_at: Utc.with_ymd_and_hms(2024, 1, 2, 15, 0, 0).unwrap()
    };
    assert_eq!(quote.change_pct(), dec!(10));
    assert!(quote.field("change_pct").unwrap().matches_text("10"));
  }
}
