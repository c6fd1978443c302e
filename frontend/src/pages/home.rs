use dioxus::{logger::tracing::warn, prelude::*};
use crate::{utils::hooks::use_preferences, Route};

#[component]
pub fn Home() -> Element {
  static CSS: Asset = asset!("/assets/home.css");
  let mut prefs = use_preferences();
  let favorites: Vec<String> = prefs.read().favorites().iter().cloned().collect();

  rsx! {
    document::Stylesheet {href: CSS},
    div {
      class: "home-page",
      section {
        class : "hero",
        h1 { "Market Data Portal" },
        p { "Quotes, best bid and offer, depth of book and last sale prints, refreshed in place while you filter, sort and export them." },
        Link {
          class: "cta-button",
          to: Route::QuotesPage { },
          "Open the quote board"
        }
      },
      section {
        class: "features",
        BlockCard { to: Route::QuotesPage { }, icon: "📈", title: "Quote Board", text: "Last price, change and volume of every listed symbol. Star symbols to keep them on your dashboard." }
        BlockCard { to: Route::BboPage { }, icon: "⚖", title: "Best Bid & Offer", text: "Top of book per market center with the spread in ticks." }
        BlockCard { to: Route::DepthPage { }, icon: "🪜", title: "Depth of Book", text: "Five aggregated price levels per side, filterable by symbol and side." }
        BlockCard { to: Route::LastSalesPage { }, icon: "🧾", title: "Last Sale Reporting", text: "The most recent prints, newest first, with time and price range filters." }
        BlockCard { to: Route::SymbolsPage { }, icon: "🗂", title: "Symbol Registry", text: "Add, edit and delist the symbols the market generator trades." }
      },
      section {
        class: "favorites",
        h2 { "Favorites" }
        if favorites.is_empty() {
          p { class: "table-placeholder", "No favorites yet. Use the ☆ button on the quote board." }
        } else {
          ul {
            class: "favorite-list",
            for symbol in favorites {
              li {
                key: "{symbol}",
                span { class: "favorite-symbol", "{symbol}" }
                button {
                  class: "button button-small",
                  onclick: {
                    let symbol = symbol.clone();
                    move |_| {
                      if let Err(e) = prefs.write().toggle_favorite(&symbol) {
                        warn!(symbol = %symbol, error = %e, "favorite not persisted");
                      }
                    }
                  },
                  "Remove"
                }
              }
            }
          }
          button {
            class: "button button-small",
            onclick: move |_| {
              if let Err(e) = prefs.write().clear() {
                warn!(error = %e, "preferences not cleared");
              }
            },
            "Clear preferences"
          }
        }
      }
    }
  }
}

#[component]
fn BlockCard(to: Route, icon: &'static str, title: &'static str, text: &'static str) -> Element {
  rsx! {
    Link {
      class: "feature-card",
      to,
      h3 {
        class: "feature-card-title",
        span { "{icon}" }
        "{title}"
      }
      p { "{text}" }
    }
  }
}
