#![allow(non_snake_case)]

use std::collections::HashMap;
use chrono::DateTime;
use dioxus::{logger::tracing::info, prelude::*};
use portal_viewmodel::{
  domain::{AssetClass, SymbolEntry, SymbolStatus},
  AppError, ModalFormState, ModalMode, TableRecord
};

use crate::{components::feedback::ErrorPanel, utils::hooks::RemoteTable};

struct FormDefaults {
  symbol: String,
  name: String,
  asset_class: &'static str,
  status: &'static str,
  lot_size: String,
  tick_size: String
}

impl FormDefaults {
  fn from(entry: Option<&SymbolEntry>) -> Self {
    match entry {
      Some(e) => FormDefaults {
        symbol: e.symbol.clone(),
        name: e.name.clone(),
        asset_class: e.asset_class.code(),
        status: e.status.code(),
        lot_size: e.lot_size.to_string(),
        tick_size: e.tick_size.to_string()
      },
      None => FormDefaults {
        symbol: String::new(),
        name: String::new(),
        asset_class: AssetClass::Equity.code(),
        status: SymbolStatus::Active.code(),
        lot_size: "100".to_string(),
        tick_size: "0.01".to_string()
      }
    }
  }
}

fn now() -> DateTime<chrono::Utc> {
  DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
}

/// Add/edit/view/delete dialog of the symbol registry.
#[component]
pub fn SymbolModal(table: RemoteTable<SymbolEntry>, modal: ModalFormState<SymbolEntry>) -> Element {
  let mut form_errors = use_signal(Vec::<String>::new);
  let mut busy = use_signal(|| false);

  let Some(mode) = modal.mode() else {
    return rsx! {};
  };
  let original = modal.record().cloned();
  let title = match mode {
    ModalMode::Add => "Add symbol",
    ModalMode::Edit => "Edit symbol",
    ModalMode::View => "Symbol details",
    ModalMode::Delete => "Delete symbol"
  };
  let defaults = FormDefaults::from(original.as_ref());

  let submit = {
    let table = table.clone();
    move |draft: Option<SymbolEntry>| {
      let table = table.clone();
      busy.set(true);
      spawn(async move {
        match table.submit_modal(draft).await {
          Ok(()) => {
            info!("symbol registry updated");
            form_errors.set(Vec::new());
          },
          Err(e) => form_errors.set(e.messages())
        }
        busy.set(false);
      });
    }
  };

  let close = {
    let table = table.clone();
    move |_| {
      form_errors.set(Vec::new());
      table.close_modal();
    }
  };

  rsx! {
    div {
      class: "modal-backdrop",
      dialog {
        class: "modal",
        open: true,
        h3 { class: "modal-title", "{title}" }
        ErrorPanel { errors: form_errors() }

        if mode == ModalMode::Add || mode == ModalMode::Edit {
          form {
            id: "symbol-form",
            onsubmit: {
              let original = original.clone();
              let mut submit = submit.clone();
              move |evt: FormEvent| {
                let values = evt.values()
                  .into_iter()
                  .map(|(k, v)| (k, v.as_value()))
                  .collect::<HashMap<String, String>>();
                match SymbolEntry::from_form(&values, original.as_ref(), now()) {
                  Ok(draft) => submit(Some(draft)),
                  Err(errors) => form_errors.set(AppError::ValidationError(errors).messages())
                }
              }
            },
            div {
              class: "form-group",
              label { class: "form-label", "Symbol" }
              input { class: "form-input", name: "symbol", value: "{defaults.symbol}", maxlength: "11", required: true }
            }
            div {
              class: "form-group",
              label { class: "form-label", "Name" }
              input { class: "form-input", name: "name", value: "{defaults.name}", required: true }
            }
            div {
              class: "form-group",
              label { class: "form-label", "Asset class" }
              select {
                class: "form-input",
                name: "asset_class",
                for class in AssetClass::ALL {
                  option { key: "{class:?}", value: class.code(), selected: class.code() == defaults.asset_class, "{class}" }
                }
              }
            }
            div {
              class: "form-group",
              label { class: "form-label", "Status" }
              select {
                class: "form-input",
                name: "status",
                for status in SymbolStatus::ALL {
                  option { key: "{status:?}", value: status.code(), selected: status.code() == defaults.status, "{status}" }
                }
              }
            }
            div {
              class: "form-group",
              label { class: "form-label", "Lot size" }
              input { class: "form-input", name: "lot_size", r#type: "number", min: "1", value: "{defaults.lot_size}" }
            }
            div {
              class: "form-group",
              label { class: "form-label", "Tick size" }
              input { class: "form-input", name: "tick_size", r#type: "number", min: "0", step: "any", value: "{defaults.tick_size}" }
            }
            div {
              class: "form-actions",
              button { r#type: "submit", class: "button button-primary", disabled: busy(), "Save" }
              button { r#type: "button", class: "button", onclick: close.clone(), "Cancel" }
            }
          }
        } else if mode == ModalMode::View {
          if let Some(entry) = original.as_ref() {
            dl {
              class: "record-details",
              for column in SymbolEntry::columns() {
                dt { key: "dt-{column.key}", "{column.title}" }
                dd { key: "dd-{column.key}", {entry.cell(column.key)} }
              }
            }
          }
          div {
            class: "form-actions",
            button {
              class: "button button-primary",
              onclick: {
                let table = table.clone();
                move |_| table.edit_from_view()
              },
              "Edit"
            }
            button { class: "button", onclick: close.clone(), "Close" }
          }
        } else {
          p { "Delete {defaults.symbol} ({defaults.name}) from the registry?" }
          div {
            class: "form-actions",
            button {
              class: "button button-danger",
              disabled: busy(),
              onclick: {
                let mut submit = submit.clone();
                move |_| submit(None)
              },
              "Delete"
            }
            button { class: "button", onclick: close.clone(), "Cancel" }
          }
        }
      }
    }
  }
}
