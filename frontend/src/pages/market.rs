use dioxus::{logger::tracing::warn, prelude::*};
use portal_viewmodel::{
  domain::{Bbo, DepthLevel, LastSale, Quote},
  FilterValue
};

use crate::{
  components::{table::RowAction, table_block::TableBlock},
  utils::hooks::{use_polling_table, use_preferences}
};

/// Quote board with favorites. Starred symbols are highlighted and can be shown alone.
#[component]
pub fn QuotesPage() -> Element {
  let (table, snapshot) = use_polling_table::<Quote>("quotes", "Quote Board");
  let mut prefs = use_preferences();
  let favorites: Vec<String> = prefs.read().favorites().iter().cloned().collect();
  let favorites_only = matches!(snapshot.read().criteria.get("symbol"), Some(FilterValue::OneOf(_)));

  let toggle_favorite = {
    let table = table.clone();
    move |(action, symbol): (RowAction, String)| {
      if action != RowAction::Favorite {
        return;
      }
      if let Err(e) = prefs.write().toggle_favorite(&symbol) {
        warn!(symbol = %symbol, error = %e, "favorite not persisted");
      }
      if favorites_only {
        let symbols = prefs.read().favorites().iter().cloned().collect();
        table.set_filter("symbol", Some(FilterValue::OneOf(symbols)));
      }
    }
  };

  let toggle_favorites_only = {
    let table = table.clone();
    let favorites = favorites.clone();
    move |_| {
      if favorites_only {
        table.set_filter("symbol", None);
      } else {
        table.set_filter("symbol", Some(FilterValue::OneOf(favorites.clone())));
      }
    }
  };

  rsx! {
    div {
      class: "block-options",
      button {
        class: if favorites_only { "button button-small active" } else { "button button-small" },
        disabled: favorites.is_empty() && !favorites_only,
        onclick: toggle_favorites_only,
        "★ Favorites only"
      }
    }
    TableBlock::<Quote> {
      title: "Quote Board",
      table,
      snapshot,
      actions: vec![RowAction::Favorite],
      highlighted: favorites.clone(),
      on_action: toggle_favorite
    }
  }
}

#[component]
pub fn BboPage() -> Element {
  let (table, snapshot) = use_polling_table::<Bbo>("bbo", "Best Bid & Offer");
  rsx! {
    TableBlock::<Bbo> { title: "Best Bid & Offer", table, snapshot }
  }
}

#[component]
pub fn DepthPage() -> Element {
  let (table, snapshot) = use_polling_table::<DepthLevel>("depth", "Depth of Book");
  rsx! {
    TableBlock::<DepthLevel> { title: "Depth of Book", table, snapshot }
  }
}

#[component]
pub fn LastSalesPage() -> Element {
  let (table, snapshot) = use_polling_table::<LastSale>("last-sales", "Last Sale Reporting");
  rsx! {
    TableBlock::<LastSale> { title: "Last Sale Reporting", table, snapshot }
  }
}
