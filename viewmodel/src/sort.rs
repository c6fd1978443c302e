use std::cmp::Ordering;
use serde::{Deserialize, Serialize};

use crate::record::TableRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
  Ascending,
  Descending
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
  pub column: String,
  pub order: SortOrder
}

impl SortSpec {
  pub fn ascending(column: &str) -> Self {
    SortSpec { column: column.to_string(), order: SortOrder::Ascending }
  }

  pub fn descending(column: &str) -> Self {
    SortSpec { column: column.to_string(), order: SortOrder::Descending }
  }

  /// Header click cycle: none -> ascending -> descending -> none.
  pub fn cycle(current: Option<&SortSpec>, column: &str) -> Option<SortSpec> {
    match current {
      Some(spec) if spec.column == column => match spec.order {
        SortOrder::Ascending => Some(Self::descending(column)),
        SortOrder::Descending => None
      },
      _ => Some(Self::ascending(column))
    }
  }

  /// Records without a comparable value always go last, whatever the order.
  pub fn compare<T: TableRecord>(&self, a: &T, b: &T) -> Ordering {
    match (a.field(&self.column), b.field(&self.column)) {
      (Some(x), Some(y)) => {
        let ord = x.compare(&y).unwrap_or(Ordering::Equal);
        match self.order {
          SortOrder::Ascending => ord,
          SortOrder::Descending => ord.reverse()
        }
      },
      (Some(_), None) => Ordering::Less,
      (None, Some(_)) => Ordering::Greater,
      (None, None) => Ordering::Equal
    }
  }
}
