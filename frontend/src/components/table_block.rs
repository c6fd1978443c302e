#![allow(non_snake_case)]

use dioxus::{logger::tracing::warn, prelude::*};
use portal_viewmodel::{export, ExportFormat, TableRecord, TableSnapshot, TableStatus, ViewMode};
use serde::de::DeserializeOwned;

use crate::{
  components::{
    feedback::{show_toast, ErrorPanel, Toast},
    filter_bar::{filter_controls, FilterBar, FilterChange},
    table::{header_cells, table_rows, DataTable, RowAction}
  },
  utils::{
    browser::save_file,
    hooks::{use_preferences, RemoteTable}
  }
};

/// A titled polling table: toolbar, filters, error list and rows.
#[component]
pub fn TableBlock<T: TableRecord + PartialEq + DeserializeOwned>(
  title: String,
  table: RemoteTable<T>,
  snapshot: Signal<TableSnapshot<T>>,
  #[props(default)] actions: Vec<RowAction>,
  #[props(default)] highlighted: Vec<String>,
  on_action: Option<EventHandler<(RowAction, String)>>,
  on_add: Option<EventHandler<()>>
) -> Element {
  let prefs = use_preferences();
  let mut notice = use_signal(String::new);
  let toast_id = format!("toast-{}", table.service().endpoint());

  let snap = snapshot.read();
  let compact = prefs.read().view_mode() == ViewMode::Compact;
  let controls = table.with_store(|store| filter_controls(store.dataset(), store.criteria()));
  let headers = header_cells::<T>(snap.sort.as_ref());
  let rows = table_rows(&snap.rows, |record| highlighted.contains(&record.key()));
  let counts = format!("{} of {}", snap.rows.len(), snap.total);
  let stale = !snap.errors.is_empty() && snap.total > 0;
  let empty_text = if snap.criteria.is_empty() { "No data yet." } else { "No rows match the filters." };

  let export = {
    let table = table.clone();
    let toast_id = toast_id.clone();
    move |format: ExportFormat| {
      let table = table.clone();
      let toast_id = toast_id.clone();
      spawn(async move {
        let file_name = export::file_name(table.service().endpoint(), format);
        let saved = match table.export(format).await {
          Ok(bytes) => save_file(&bytes, &file_name, format.mime_type()),
          Err(e) => Err(e)
        };
        if let Err(e) = saved {
          warn!(file = %file_name, error = %e, "export failed");
          notice.set(e.messages().join("; "));
          show_toast(&toast_id);
        }
      });
    }
  };

  rsx! {
    section {
      class: "table-block",
      header {
        class: "table-block-header",
        h2 { "{title}" }
        span { class: "row-count", "{counts}" }
        if snap.loading {
          span { class: "refreshing", "Refreshing…" }
        }
        div {
          class: "table-block-tools",
          if let Some(add) = on_add {
            button { class: "button button-primary", onclick: move |_| add.call(()), "Add" }
          }
          button {
            class: "button",
            onclick: {
              let export = export.clone();
              move |_| export(ExportFormat::Csv)
            },
            "Export CSV"
          }
          button {
            class: "button",
            onclick: move |_| export(ExportFormat::Json),
            "Export JSON"
          }
        }
      }
      FilterBar {
        controls,
        active: !snap.criteria.is_empty(),
        on_change: {
          let table = table.clone();
          move |(field, value): FilterChange| table.set_filter(&field, value)
        },
        on_reset: {
          let table = table.clone();
          move |_| table.reset_filters()
        }
      }
      ErrorPanel { errors: snap.errors.clone(), stale }
      if snap.status == TableStatus::Loading {
        p { class: "table-placeholder", "Loading…" }
      } else if snap.status == TableStatus::Empty {
        p { class: "table-placeholder", "{empty_text}" }
      } else if snap.status == TableStatus::Ready {
        DataTable {
          headers,
          rows,
          compact,
          actions,
          on_sort: {
            let table = table.clone();
            move |column: String| table.toggle_sort(&column)
          },
          on_action
        }
      }
      Toast { id: toast_id.clone(), content: notice(), error: true }
    }
  }
}
