#![allow(non_snake_case)]

use dioxus::prelude::*;
use portal_viewmodel::{SortOrder, SortSpec, TableRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
  pub key: &'static str,
  pub title: &'static str,
  pub sortable: bool,
  pub marker: &'static str
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
  pub key: String,
  pub cells: Vec<String>,
  pub highlighted: bool
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
  Favorite,
  View,
  Edit,
  Delete
}

impl RowAction {
  fn label(&self, highlighted: bool) -> &'static str {
    match self {
      RowAction::Favorite if highlighted => "★",
      RowAction::Favorite => "☆",
      RowAction::View => "View",
      RowAction::Edit => "Edit",
      RowAction::Delete => "Delete"
    }
  }
}

pub fn header_cells<T: TableRecord>(sort: Option<&SortSpec>) -> Vec<HeaderCell> {
  T::columns().into_iter().map(|col| {
    let marker = match sort {
      Some(spec) if spec.column == col.key => match spec.order {
        SortOrder::Ascending => " ▲",
        SortOrder::Descending => " ▼"
      },
      _ => ""
    };
    HeaderCell { key: col.key, title: col.title, sortable: col.sortable, marker }
  }).collect()
}

pub fn table_rows<T: TableRecord>(rows: &[T], highlighted: impl Fn(&T) -> bool) -> Vec<TableRow> {
  let columns = T::columns();
  rows.iter().map(|record| TableRow {
    key: record.key(),
    cells: columns.iter().map(|col| record.cell(col.key)).collect(),
    highlighted: highlighted(record)
  }).collect()
}

#[component]
pub fn DataTable(
  headers: Vec<HeaderCell>,
  rows: Vec<TableRow>,
  #[props(default = false)] compact: bool,
  #[props(default)] actions: Vec<RowAction>,
  on_sort: EventHandler<String>,
  #[props(!optional)] on_action: Option<EventHandler<(RowAction, String)>>
) -> Element {

  rsx! {
    table {
      class: if compact { "data-table compact" } else { "data-table" },
      thead {
        tr {
          for header in headers.iter() {
            th {
              key: "{header.key}",
              scope: "col",
              class: if header.sortable { "sortable" } else { "" },
              onclick: {
                let column = header.key;
                let sortable = header.sortable;
                move |_| {
                  if sortable {
                    on_sort.call(column.to_string());
                  }
                }
              },
              "{header.title}{header.marker}"
            }
          }
          if !actions.is_empty() {
            th { scope: "col", class: "actions" }
          }
        }
      }
      tbody {
        for row in rows.iter() {
          tr {
            key: "{row.key}",
            class: if row.highlighted { "highlighted" } else { "" },
            for (idx, cell) in row.cells.iter().enumerate() {
              td { key: "{idx}", "{cell}" }
            }
            if !actions.is_empty() {
              td {
                class: "actions",
                for action in actions.iter().copied() {
                  button {
                    key: "{action:?}",
                    class: "button button-small",
                    onclick: {
                      let row_key = row.key.clone();
                      move |_| {
                        if let Some(handler) = on_action {
                          handler.call((action, row_key.clone()));
                        }
                      }
                    },
                    {action.label(row.highlighted)}
                  }
                }
              }
            }
          }
        }
      }
    }
  }
}
