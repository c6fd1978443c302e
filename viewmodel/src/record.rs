use std::{cmp::Ordering, fmt, str::FromStr};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Scalar value of one record field, as seen by filters, sorting and cell rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum FieldValue {
  Text(String),
  Number(Decimal),
  Integer(i64),
  Time(DateTime<Utc>),
  Flag(bool)
}

impl FieldValue {
  fn as_decimal(&self) -> Option<Decimal> {
    match self {
      FieldValue::Number(d) => Some(*d),
      FieldValue::Integer(i) => Some(Decimal::from(*i)),
      _ => None
    }
  }

  /// Ordering between two values of compatible kinds. Numbers and integers compare
  /// numerically, everything else only within its own kind.
  pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
    match (self, other) {
      (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
      (FieldValue::Time(a), FieldValue::Time(b)) => Some(a.cmp(b)),
      (FieldValue::Flag(a), FieldValue::Flag(b)) => Some(a.cmp(b)),
      (a, b) => match (a.as_decimal(), b.as_decimal()) {
        (Some(x), Some(y)) => Some(x.cmp(&y)),
        _ => None
      }
    }
  }

  /// Equality against a user-typed filter string, interpreted according to the field kind.
  pub fn matches_text(&self, needle: &str) -> bool {
    let needle = needle.trim();
    match self {
      FieldValue::Text(s) => s == needle,
      FieldValue::Number(d) => Decimal::from_str(needle).map_or(false, |n| n == *d),
      FieldValue::Integer(i) => needle.parse::<i64>().map_or(false, |n| n == *i),
      FieldValue::Flag(b) => match needle.to_ascii_lowercase().as_str() {
        "true" | "yes" => *b,
        "false" | "no" => !*b,
        _ => false
      },
      FieldValue::Time(t) => {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(needle) {
          return parsed.with_timezone(&Utc) == *t;
        }
        NaiveDate::parse_from_str(needle, "%Y-%m-%d").map_or(false, |d| d == t.date_naive())
      }
    }
  }
}

impl FieldValue {
  /// Text to prefill an input with. Times render as a calendar date.
  pub fn input_text(&self) -> String {
    match self {
      FieldValue::Time(t) => t.date_naive().format("%Y-%m-%d").to_string(),
      FieldValue::Flag(b) => b.to_string(),
      other => other.to_string()
    }
  }
}

impl fmt::Display for FieldValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FieldValue::Text(s) => write!(f, "{}", s),
      FieldValue::Number(d) => write!(f, "{}", d),
      FieldValue::Integer(i) => write!(f, "{}", i),
      FieldValue::Time(t) => write!(f, "{}", t.format(TIME_FORMAT)),
      FieldValue::Flag(b) => write!(f, "{}", if *b { "yes" } else { "no" })
    }
  }
}

impl From<&str> for FieldValue {
  fn from(s: &str) -> Self {
    FieldValue::Text(s.to_string())
  }
}

impl From<String> for FieldValue {
  fn from(s: String) -> Self {
    FieldValue::Text(s)
  }
}

impl From<Decimal> for FieldValue {
  fn from(d: Decimal) -> Self {
    FieldValue::Number(d)
  }
}

impl From<u64> for FieldValue {
  fn from(i: u64) -> Self {
    match i64::try_from(i) {
      Ok(i) => FieldValue::Integer(i),
      Err(_) => FieldValue::Number(Decimal::from(i))
    }
  }
}

impl From<DateTime<Utc>> for FieldValue {
  fn from(t: DateTime<Utc>) -> Self {
    FieldValue::Time(t)
  }
}

impl From<bool> for FieldValue {
  fn from(b: bool) -> Self {
    FieldValue::Flag(b)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
  Text,
  Number,
  Time
}

impl ColumnKind {
  /// Parses one bound of a range filter typed by the user. A bare date covers the
  /// whole day: midnight as a lower bound, the last nanosecond of the day as an upper one.
  pub fn parse_bound(&self, raw: &str, upper: bool) -> Option<FieldValue> {
    let raw = raw.trim();
    if raw.is_empty() {
      return None;
    }
    match self {
      ColumnKind::Text => Some(FieldValue::Text(raw.to_string())),
      ColumnKind::Number => Decimal::from_str(raw).ok().map(FieldValue::Number),
      ColumnKind::Time => {
        if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
          return Some(FieldValue::Time(t.with_timezone(&Utc)));
        }
        let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
        let time = if upper {
          NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)?
        } else {
          NaiveTime::from_hms_opt(0, 0, 0)?
        };
        Some(FieldValue::Time(day.and_time(time).and_utc()))
      }
    }
  }
}

/// Kind of filter control a column offers in the table header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
  Select,
  Search,
  Range
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
  pub key: &'static str,
  pub title: &'static str,
  pub kind: ColumnKind,
  pub sortable: bool,
  pub filter: Option<FilterKind>
}

impl Column {
  pub fn new(key: &'static str, title: &'static str, kind: ColumnKind) -> Self {
    Column { key, title, kind, sortable: false, filter: None }
  }

  pub fn text(key: &'static str, title: &'static str) -> Self {
    Self::new(key, title, ColumnKind::Text)
  }

  pub fn number(key: &'static str, title: &'static str) -> Self {
    Self::new(key, title, ColumnKind::Number)
  }

  pub fn time(key: &'static str, title: &'static str) -> Self {
    Self::new(key, title, ColumnKind::Time)
  }

  pub fn sortable(mut self) -> Self {
    self.sortable = true;
    self
  }

  pub fn with_filter(mut self, kind: FilterKind) -> Self {
    self.filter = Some(kind);
    self
  }
}

/// A row type that can back a polling table.
///
/// `columns()` is a pure function so every table instance builds its own column
/// configuration instead of sharing a mutable one.
pub trait TableRecord: Clone + 'static {
  fn key(&self) -> String;

  fn columns() -> Vec<Column>;

  fn field(&self, name: &str) -> Option<FieldValue>;

  fn cell(&self, name: &str) -> String {
    self.field(name).map(|v| v.to_string()).unwrap_or_default()
  }

  /// Field-level problems that block a form submission. Read-only records have none.
  fn validate(&self) -> Vec<FieldError> {
    Vec::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use rust_decimal_macros::dec;

  #[test]
  fn numeric_equality_ignores_scale() {
    assert!(FieldValue::Number(dec!(10.00)).matches_text("10"));
    assert!(!FieldValue::Number(dec!(10.01)).matches_text("10"));
    assert!(!FieldValue::Number(dec!(10)).matches_text("ten"));
  }

  #[test]
  fn time_matches_calendar_date() {
    let t = Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap();
    assert!(FieldValue::Time(t).matches_text("2024-03-01"));
    assert!(FieldValue::Time(t).matches_text("2024-03-01T14:30:00Z"));
    assert!(!FieldValue::Time(t).matches_text("2024-03-02"));
  }

  #[test]
  fn integers_and_decimals_compare_across_kinds() {
    let ord = FieldValue::Integer(5).compare(&FieldValue::Number(dec!(4.5)));
    assert_eq!(ord, Some(Ordering::Greater));
    assert_eq!(FieldValue::Text("a".into()).compare(&FieldValue::Integer(1)), None);
  }

  #[test]
  fn date_bounds_cover_the_whole_day() {
    let lower = ColumnKind::Time.parse_bound("2024-03-01", false).unwrap();
    let upper = ColumnKind::Time.parse_bound("2024-03-01", true).unwrap();
    let afternoon = FieldValue::Time(Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap());
    assert_eq!(afternoon.compare(&lower), Some(Ordering::Greater));
    assert_eq!(afternoon.compare(&upper), Some(Ordering::Less));
    assert_eq!(lower.input_text(), "2024-03-01");
  }

  #[test]
  fn upper_date_bound_includes_sub_second_times() {
    let upper = ColumnKind::Time.parse_bound("2024-03-01", true).unwrap();
    let last_print = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap() + chrono::TimeDelta::milliseconds(500);
    let next_day = FieldValue::Time(Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap());
    assert_eq!(FieldValue::Time(last_print).compare(&upper), Some(Ordering::Less));
    assert_eq!(next_day.compare(&upper), Some(Ordering::Greater));
  }

  #[test]
  fn large_counts_do_not_wrap() {
    assert_eq!(FieldValue::from(42u64), FieldValue::Integer(42));
    assert_eq!(FieldValue::from(u64::MAX), FieldValue::Number(Decimal::from(u64::MAX)));
  }

  #[test]
  fn unparseable_bounds_are_ignored() {
    assert_eq!(ColumnKind::Number.parse_bound("abc", false), None);
    assert_eq!(ColumnKind::Number.parse_bound("  ", true), None);
    assert_eq!(ColumnKind::Number.parse_bound("12.5", true), Some(FieldValue::Number(dec!(12.5))));
  }

  #[test]
  fn display_formats_time_and_flags() {
    let t = Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap();
    assert_eq!(FieldValue::Time(t).to_string(), "2024-03-01 09:05:07");
    assert_eq!(FieldValue::Flag(true).to_string(), "yes");
  }
}
