#![allow(non_snake_case)]

use dioxus::prelude::*;

/// Error list shown above a table. Renders nothing when there are no errors.
#[component]
pub fn ErrorPanel(errors: Vec<String>, #[props(default = false)] stale: bool) -> Element {
  if errors.is_empty() {
    return rsx! {};
  }

  rsx! {
    div {
      class: "error-panel",
      role: "alert",
      if stale {
        p { class: "error-panel-note", "Showing the last data received." }
      }
      ul {
        for (idx, msg) in errors.iter().enumerate() {
          li { key: "error-{idx}", "{msg}" }
        }
      }
    }
  }
}

#[component]
pub fn Toast(id: String, content: String, #[props(default = false)] error: bool) -> Element {
  rsx! {
    div {
      id: "{id}",
      class: if error { "toast toast-error" } else { "toast" },
      "{content}"
    }
  }
}

/// Flashes the toast with the given id for two seconds.
pub fn show_toast(id: &str) {
  document::eval(&format!(r#"
    var x = document.getElementById("{}");
    if (x) {{
      x.classList.add("show");
      setTimeout(function(){{x.classList.remove("show");}}, 2000);
    }}
    "#, id));
}
