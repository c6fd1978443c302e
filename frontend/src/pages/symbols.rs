use dioxus::{logger::tracing::warn, prelude::*};
use portal_viewmodel::{domain::SymbolEntry, ModalMode};

use crate::{
  components::{record_modal::SymbolModal, table::RowAction, table_block::TableBlock},
  utils::hooks::use_polling_table
};

/// Symbol registry administration: the table plus its add/view/edit/delete dialog.
#[component]
pub fn SymbolsPage() -> Element {
  let (table, snapshot) = use_polling_table::<SymbolEntry>("symbols", "Symbol Registry");
  let modal = snapshot.read().modal.clone();

  let open_for = {
    let table = table.clone();
    move |(action, symbol): (RowAction, String)| {
      let mode = match action {
        RowAction::View => ModalMode::View,
        RowAction::Edit => ModalMode::Edit,
        RowAction::Delete => ModalMode::Delete,
        RowAction::Favorite => return
      };
      if let Err(e) = table.open_modal_for(mode, &symbol) {
        warn!(symbol = %symbol, error = %e, "modal not opened");
      }
    }
  };

  let open_add = {
    let table = table.clone();
    move |_| {
      if let Err(e) = table.open_modal(ModalMode::Add, None) {
        warn!(error = %e, "modal not opened");
      }
    }
  };

  rsx! {
    TableBlock::<SymbolEntry> {
      title: "Symbol Registry",
      table: table.clone(),
      snapshot,
      actions: vec![RowAction::View, RowAction::Edit, RowAction::Delete],
      on_action: open_for,
      on_add: open_add
    }
    SymbolModal { table, modal }
  }
}
