use std::future::Future;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, filter::FilterCriteria, sort::SortSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
  Csv,
  Json
}

impl ExportFormat {
  pub fn extension(&self) -> &'static str {
    match self {
      ExportFormat::Csv => "csv",
      ExportFormat::Json => "json"
    }
  }

  pub fn mime_type(&self) -> &'static str {
    match self {
      ExportFormat::Csv => "text/csv",
      ExportFormat::Json => "application/json"
    }
  }
}

/// Backend endpoint feeding one table. Futures are not required to be `Send`, the
/// view-model runs on a single-threaded executor.
pub trait DataService<T> {
  fn fetch_list(&self) -> impl Future<Output = Result<Vec<T>, AppError>>;

  /// Export of the rows matching `criteria`, in the order given by `sort`.
  fn download(&self, criteria: &FilterCriteria, sort: Option<&SortSpec>, format: ExportFormat) -> impl Future<Output = Result<Vec<u8>, AppError>>;
}

/// Write side of an admin table (add/edit/delete forms).
pub trait RecordMutations<T> {
  fn create(&self, record: &T) -> impl Future<Output = Result<T, AppError>>;

  fn update(&self, key: &str, record: &T) -> impl Future<Output = Result<T, AppError>>;

  fn delete(&self, key: &str) -> impl Future<Output = Result<(), AppError>>;
}
