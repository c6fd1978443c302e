use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Side;
use crate::record::{Column, FieldValue, FilterKind, TableRecord};

/// Aggregated price level of the depth-of-book view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthLevel {
  pub symbol: String,
  pub side: Side,
  pub level: u32,
  pub price: Decimal,
  pub size: u64,
  pub orders: u32
}

impl TableRecord for DepthLevel {
  fn key(&self) -> String {
    format!("{}:{}:{}", self.symbol, self.side, self.level)
  }

  fn columns() -> Vec<Column> {
    vec![
      Column::text("symbol", "Symbol").with_filter(FilterKind::Select),
      Column::text("side", "Side").with_filter(FilterKind::Select),
      Column::number("level", "Level").sortable(),
      Column::number("price", "Price").sortable().with_filter(FilterKind::Range),
      Column::number("size", "Size").sortable(),
      Column::number("orders", "Orders")
    ]
  }

  fn field(&self, name: &str) -> Option<FieldValue> {
    match name {
      "symbol" => Some(self.symbol.as_str().into()),
      "side" => Some(self.side.to_string().into()),
      "level" => Some(FieldValue::Integer(self.level as i64)),
      "price" => Some(self.price.into()),
      "size" => Some(self.size.into()),
      "orders" => Some(FieldValue::Integer(self.orders as i64)),
      _ => None
    }
  }
}
