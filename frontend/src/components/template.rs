use dioxus::{logger::tracing::warn, prelude::*};
use portal_viewmodel::ViewMode;

use crate::{utils::hooks::use_preferences, Route};

#[component]
pub fn Template() -> Element {
  static CSS: Asset = asset!("/assets/template.css");

  rsx! {
    document::Stylesheet {href: CSS},
    Header { }
    main {
      class: "page",
      Outlet::<Route> {}
    }
    Footer { }
  }
}

#[component]
fn Header() -> Element {
  let mut prefs = use_preferences();
  let mode = prefs.read().view_mode();
  let (next, label) = match mode {
    ViewMode::Compact => (ViewMode::Detailed, "Detailed view"),
    ViewMode::Detailed => (ViewMode::Compact, "Compact view")
  };

  rsx!{
    nav {
      div {
        class: "nav-container",
        Link {
          class: "logo",
          active_class: "nav-active",
          to: Route::Home { },
          "Market Portal",
        }
        div {
          class: "nav-links",
          Link { active_class: "nav-active", to: Route::QuotesPage { }, "Quotes" },
          Link { active_class: "nav-active", to: Route::BboPage { }, "BBO" },
          Link { active_class: "nav-active", to: Route::DepthPage { }, "Depth" },
          Link { active_class: "nav-active", to: Route::LastSalesPage { }, "Last sales" },
          Link { active_class: "nav-active", to: Route::SymbolsPage { }, "Symbols" },
        }
        button {
          class: "button button-small view-toggle",
          onclick: move |_| {
            if let Err(e) = prefs.write().set_view_mode(next) {
              warn!(error = %e, "view mode not persisted");
            }
          },
          "{label}"
        }
      }
    }
  }
}

#[component]
fn Footer() -> Element {
  rsx!{
    footer {
      div {
        class: "footer-container",
        p { "Market data is simulated and refreshed by polling." }
      }
    }
  }
}
