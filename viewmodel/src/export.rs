use serde::Serialize;

use crate::{
  error::AppError,
  record::{Column, TableRecord},
  service::ExportFormat
};

fn escape(field: &str) -> String {
  if field.contains([',', '"', '\n', '\r']) {
    format!("\"{}\"", field.replace('"', "\"\""))
  } else {
    field.to_string()
  }
}

/// Header of column titles, then one line per record. CRLF line endings.
pub fn to_csv<'a, T: TableRecord + 'a>(columns: &[Column], rows: impl IntoIterator<Item = &'a T>) -> String {
  let mut out = columns.iter().map(|c| escape(c.title)).collect::<Vec<_>>().join(",");
  out.push_str("\r\n");
  for row in rows {
    let line = columns.iter().map(|c| escape(&row.cell(c.key))).collect::<Vec<_>>().join(",");
    out.push_str(&line);
    out.push_str("\r\n");
  }
  out
}

pub fn render<T: TableRecord + Serialize>(rows: &[T], format: ExportFormat) -> Result<Vec<u8>, AppError> {
  match format {
    ExportFormat::Csv => Ok(to_csv(&T::columns(), rows.iter()).into_bytes()),
    ExportFormat::Json => serde_json::to_vec_pretty(rows).map_err(|e| AppError::SerializeError(e.to_string()))
  }
}

/// File name offered to the browser, e.g. `quotes.csv`.
pub fn file_name(stem: &str, format: ExportFormat) -> String {
  format!("{}.{}", stem, format.extension())
}
