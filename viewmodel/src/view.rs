use std::collections::BTreeSet;

use crate::{
  filter::FilterCriteria,
  modal::ModalFormState,
  record::TableRecord,
  sort::SortSpec
};

/// Indices of the dataset rows that pass `criteria`, in display order.
///
/// Without a sort the indices keep dataset order. With one, the filtered subset is
/// stable-sorted so ties keep dataset order.
pub fn project<T: TableRecord>(dataset: &[T], criteria: &FilterCriteria, sort: Option<&SortSpec>) -> Vec<usize> {
  let mut indices = dataset.iter()
    .enumerate()
    .filter(|(_, record)| criteria.matches(*record))
    .map(|(idx, _)| idx)
    .collect::<Vec<usize>>();

  if let Some(spec) = sort {
    indices.sort_by(|a, b| spec.compare(&dataset[*a], &dataset[*b]));
  }
  indices
}

/// Same projection as [`project`], materialized as records.
pub fn view<T: TableRecord>(dataset: &[T], criteria: &FilterCriteria, sort: Option<&SortSpec>) -> Vec<T> {
  project(dataset, criteria, sort).into_iter().map(|idx| dataset[idx].clone()).collect()
}

/// Sorted distinct cell texts of one column, the options of a select filter.
pub fn distinct_values<T: TableRecord>(dataset: &[T], field: &str) -> Vec<String> {
  dataset.iter()
    .filter_map(|record| record.field(field))
    .map(|value| value.to_string())
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

/// What the table area should render.
#[derive(Debug, Clone, PartialEq)]
pub enum TableStatus {
  /// First fetch still in flight.
  Loading,
  /// Nothing was ever loaded and the last attempt failed.
  Failed(Vec<String>),
  /// Loaded successfully, nothing to show.
  Empty,
  Ready
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot<T> {
  pub rows: Vec<T>,
  pub total: usize,
  pub status: TableStatus,
  pub loading: bool,
  pub errors: Vec<String>,
  pub criteria: FilterCriteria,
  pub sort: Option<SortSpec>,
  pub modal: ModalFormState<T>,
  pub revision: u64
}

#[cfg(test)]
pub(crate) mod fixtures {
  use rust_decimal::Decimal;

  use crate::{error::FieldError, record::{Column, FieldValue, TableRecord}};

  #[derive(Debug, Clone, PartialEq)]
  pub struct Tick {
    pub symbol: String,
    pub price: Decimal
  }

  pub fn tick(symbol: &str, price: i64) -> Tick {
    Tick { symbol: symbol.to_string(), price: Decimal::from(price) }
  }

  impl TableRecord for Tick {
    fn key(&self) -> String {
      self.symbol.clone()
    }

    fn columns() -> Vec<Column> {
      vec![Column::text("symbol", "Symbol").sortable(), Column::number("price", "Price").sortable()]
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
      match name {
        "symbol" => Some(self.symbol.as_str().into()),
        "price" => Some(self.price.into()),
        _ => None
      }
    }

    fn validate(&self) -> Vec<FieldError> {
      if self.price.is_sign_negative() {
        vec![FieldError::new("price", "must not be negative")]
      } else {
        Vec::new()
      }
    }
  }
}
