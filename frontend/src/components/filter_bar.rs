#![allow(non_snake_case)]

use dioxus::prelude::*;
use portal_viewmodel::{
  view::distinct_values, ColumnKind, FieldValue, FilterCriteria, FilterKind, FilterValue, TableRecord
};

pub type FilterChange = (String, Option<FilterValue>);

#[derive(Debug, Clone, PartialEq)]
pub struct FilterControl {
  pub key: &'static str,
  pub title: &'static str,
  pub kind: FilterKind,
  pub column: ColumnKind,
  pub options: Vec<String>,
  pub current: Option<FilterValue>
}

/// One control per filterable column. Select options come from the whole dataset so
/// that narrowing one filter does not hide the choices of another.
pub fn filter_controls<T: TableRecord>(dataset: &[T], criteria: &FilterCriteria) -> Vec<FilterControl> {
  T::columns().into_iter().filter_map(|col| {
    let kind = col.filter?;
    let options = if kind == FilterKind::Select {
      distinct_values(dataset, col.key)
    } else {
      Vec::new()
    };
    Some(FilterControl {
      key: col.key,
      title: col.title,
      kind,
      column: col.kind,
      options,
      current: criteria.get(col.key).cloned()
    })
  }).collect()
}

#[component]
pub fn FilterBar(
  controls: Vec<FilterControl>,
  active: bool,
  on_change: EventHandler<FilterChange>,
  on_reset: EventHandler<()>
) -> Element {
  if controls.is_empty() {
    return rsx! {};
  }

  rsx! {
    div {
      class: "filter-bar",
      for control in controls.iter() {
        if control.kind == FilterKind::Select {
          SelectFilter { key: "{control.key}", control: control.clone(), on_change }
        } else if control.kind == FilterKind::Search {
          SearchFilter { key: "{control.key}", control: control.clone(), on_change }
        } else {
          RangeFilter { key: "{control.key}", control: control.clone(), on_change }
        }
      }
      button {
        class: "button button-small",
        disabled: !active,
        onclick: move |_| on_reset.call(()),
        "Reset filters"
      }
    }
  }
}

#[component]
fn SelectFilter(control: FilterControl, on_change: EventHandler<FilterChange>) -> Element {
  let selected = match &control.current {
    Some(FilterValue::Equals(value)) => value.clone(),
    _ => String::new()
  };
  let field = control.key;

  rsx! {
    label {
      class: "filter",
      span { class: "filter-title", "{control.title}" }
      select {
        onchange: move |evt: Event<FormData>| {
          let value = evt.value();
          let filter = if value.is_empty() { None } else { Some(FilterValue::Equals(value)) };
          on_change.call((field.to_string(), filter));
        },
        option { value: "", selected: selected.is_empty(), "All" }
        for opt in control.options.iter() {
          option { key: "{opt}", value: "{opt}", selected: *opt == selected, "{opt}" }
        }
      }
    }
  }
}

#[component]
fn SearchFilter(control: FilterControl, on_change: EventHandler<FilterChange>) -> Element {
  let text = match &control.current {
    Some(FilterValue::Contains(value)) => value.clone(),
    _ => String::new()
  };
  let field = control.key;

  rsx! {
    label {
      class: "filter",
      span { class: "filter-title", "{control.title}" }
      input {
        r#type: "search",
        placeholder: "contains…",
        value: "{text}",
        oninput: move |evt: Event<FormData>| {
          on_change.call((field.to_string(), Some(FilterValue::Contains(evt.value()))));
        }
      }
    }
  }
}

#[component]
fn RangeFilter(control: FilterControl, on_change: EventHandler<FilterChange>) -> Element {
  let (from, to) = control.current.as_ref()
    .map(|value| value.bounds())
    .map(|(from, to)| (from.cloned(), to.cloned()))
    .unwrap_or((None, None));
  let from_text = from.as_ref().map(FieldValue::input_text).unwrap_or_default();
  let to_text = to.as_ref().map(FieldValue::input_text).unwrap_or_default();
  let input_type = match control.column {
    ColumnKind::Time => "date",
    ColumnKind::Number => "number",
    ColumnKind::Text => "text"
  };
  let field = control.key;
  let column = control.column;

  rsx! {
    fieldset {
      class: "filter filter-range",
      legend { class: "filter-title", "{control.title}" }
      input {
        r#type: input_type,
        placeholder: "from",
        value: "{from_text}",
        onchange: {
          let to = to.clone();
          move |evt: Event<FormData>| {
            let lower = column.parse_bound(&evt.value(), false);
            on_change.call((field.to_string(), FilterValue::range(lower, to.clone())));
          }
        }
      }
      input {
        r#type: input_type,
        placeholder: "to",
        value: "{to_text}",
        onchange: move |evt: Event<FormData>| {
          let upper = column.parse_bound(&evt.value(), true);
          on_change.call((field.to_string(), FilterValue::range(from.clone(), upper)));
        }
      }
    }
  }
}
