#![allow(non_snake_case)]
mod pages;
mod components;
mod utils;

use components::template::Template;
use dioxus::prelude::*;
use pages::{
  home::Home,
  market::{BboPage, DepthPage, LastSalesPage, QuotesPage},
  symbols::SymbolsPage
};
use portal_viewmodel::Preferences;
use utils::{browser::LocalStorage, config::STORAGE_NAMESPACE, hooks::PortalPreferences};

#[derive(Routable, PartialEq, Clone)]
enum Route {
    #[layout(Template)]
    #[route("/")]
    Home {},
    #[route("/quotes")]
    QuotesPage {},
    #[route("/bbo")]
    BboPage {},
    #[route("/depth")]
    DepthPage {},
    #[route("/last-sales")]
    LastSalesPage {},
    #[route("/symbols")]
    SymbolsPage {},
    #[route("/:..route")]
    PageNotFound { route: Vec<String> }
}

fn main() {
    dioxus::launch(App);
}

fn App() -> Element {
    static CSS: Asset = asset!("/assets/portal.css");
    use_context_provider::<PortalPreferences>(|| Signal::new(Preferences::load(LocalStorage, STORAGE_NAMESPACE)));

    rsx! {
        document::Stylesheet {href: CSS},
        Router::<Route> {}
    }
}

#[component]
fn PageNotFound(route: Vec<String>) -> Element {
    let path = route.join("/");
    rsx! {
        h1 { "Page not found" }
        p { "There is no market data block at /{path}." }
        Link { to: Route::Home {}, "Back to the dashboard" }
    }
}
