use std::collections::HashMap;
use serde::{Deserialize, Serialize};

use crate::record::{FieldValue, TableRecord};

/// Constraint placed on a single column by a user filter action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum FilterValue {
  Equals(String),
  Contains(String),
  OneOf(Vec<String>),
  Range { from: Option<FieldValue>, to: Option<FieldValue> }
}

impl FilterValue {
  /// Range constraint from optional bounds, `None` when both are open.
  pub fn range(from: Option<FieldValue>, to: Option<FieldValue>) -> Option<FilterValue> {
    if from.is_none() && to.is_none() {
      None
    } else {
      Some(FilterValue::Range { from, to })
    }
  }

  /// Current bounds of a range constraint.
  pub fn bounds(&self) -> (Option<&FieldValue>, Option<&FieldValue>) {
    match self {
      FilterValue::Range { from, to } => (from.as_ref(), to.as_ref()),
      _ => (None, None)
    }
  }

  /// An empty value carries no constraint; setting it removes the field's filter.
  pub fn is_empty(&self) -> bool {
    match self {
      FilterValue::Equals(s) | FilterValue::Contains(s) => s.trim().is_empty(),
      FilterValue::OneOf(values) => values.is_empty(),
      FilterValue::Range { from, to } => from.is_none() && to.is_none()
    }
  }

  pub fn matches(&self, value: &FieldValue) -> bool {
    match self {
      FilterValue::Equals(needle) => value.matches_text(needle),
      FilterValue::Contains(needle) => {
        value.to_string().to_lowercase().contains(&needle.trim().to_lowercase())
      },
      FilterValue::OneOf(values) => values.iter().any(|v| value.matches_text(v)),
      FilterValue::Range { from, to } => {
        let above = from.as_ref().map_or(true, |lo| value.compare(lo).is_some_and(|o| o.is_ge()));
        let below = to.as_ref().map_or(true, |hi| value.compare(hi).is_some_and(|o| o.is_le()));
        above && below
      }
    }
  }
}

/// Per-field filter constraints. Every constraint must hold for a record to be shown.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterCriteria {
  fields: HashMap<String, FilterValue>
}

impl FilterCriteria {
  pub fn new() -> Self {
    Self::default()
  }

  /// Sets or clears one field's constraint. Returns true when the criteria changed.
  pub fn set(&mut self, field: &str, value: Option<FilterValue>) -> bool {
    match value {
      Some(v) if !v.is_empty() => self.fields.insert(field.to_string(), v.clone()).as_ref() != Some(&v),
      _ => self.fields.remove(field).is_some()
    }
  }

  pub fn with(mut self, field: &str, value: FilterValue) -> Self {
    self.set(field, Some(value));
    self
  }

  pub fn get(&self, field: &str) -> Option<&FilterValue> {
    self.fields.get(field)
  }

  pub fn clear(&mut self) {
    self.fields.clear();
  }

  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
  }

  pub fn len(&self) -> usize {
    self.fields.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
    self.fields.iter()
  }

  pub fn matches<T: TableRecord>(&self, record: &T) -> bool {
    self.fields.iter().all(|(field, constraint)| {
      record.field(field).is_some_and(|value| constraint.matches(&value))
    })
  }
}
