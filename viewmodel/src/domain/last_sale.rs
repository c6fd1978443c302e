use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Side;
use crate::record::{Column, FieldValue, FilterKind, TableRecord};

/// A reported trade print.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastSale {
  pub trade_id: u64,
  pub symbol: String,
  pub price: Decimal,
  pub quantity: u64,
  pub side: Side,
  pub condition: String,
  pub executed_at: DateTime<Utc>,
  pub reported_at: DateTime<Utc>
}

impl LastSale {
  pub fn notional(&self) -> Decimal {
    self.price * Decimal::from(self.quantity)
  }

  /// Reporting delay in whole seconds.
  pub fn report_lag_secs(&self) -> i64 {
    (self.reported_at - self.executed_at).num_seconds()
  }
}

impl TableRecord for LastSale {
  fn key(&self) -> String {
    self.trade_id.to_string()
  }

  fn columns() -> Vec<Column> {
    vec![
      Column::number("trade_id", "Trade #").sortable(),
      Column::text("symbol", "Symbol").sortable().with_filter(FilterKind::Select),
      Column::text("side", "Side").with_filter(FilterKind::Select),
      Column::number("price", "Price").sortable().with_filter(FilterKind::Range),
      Column::number("quantity", "Qty").sortable(),
      Column::number("notional", "Notional").sortable(),
      Column::text("condition", "Cond").with_filter(FilterKind::Search),
      Column::time("executed_at", "Executed").sortable().with_filter(FilterKind::Range),
      Column::time("reported_at", "Reported").sortable(),
      Column::number("report_lag", "Lag (s)").sortable()
    ]
  }

  fn field(&self, name: &str) -> Option<FieldValue> {
    match name {
      "trade_id" => Some(self.trade_id.into()),
      "symbol" => Some(self.symbol.as_str().into()),
      "side" => Some(self.side.to_string().into()),
      "price" => Some(self.price.into()),
      "quantity" => Some(self.quantity.into()),
      "notional" => Some(self.notional().into()),
      "condition" => Some(self.condition.as_str().into()),
      "executed_at" => Some(self.executed_at.into()),
      "reported_at" => Some(self.reported_at.into()),
      "report_lag" => Some(FieldValue::Integer(self.report_lag_secs())),
      _ => None
    }
  }
}
