use dioxus::{logger::tracing::debug, prelude::*};
use portal_viewmodel::{PollingTable, Preferences, TableRecord, TableSnapshot};
use serde::de::DeserializeOwned;
use tokio::sync::watch;

use super::{
  browser::{BrowserClock, LocalStorage},
  config::poll_config,
  http::HttpService
};

pub type RemoteTable<T> = PollingTable<T, HttpService<T>>;

pub type PortalPreferences = Signal<Preferences<LocalStorage>>;

/// Binds a polling table to the calling component.
///
/// The table starts polling on first render and is torn down when the component
/// unmounts. The returned signal holds the latest snapshot and re-renders the
/// component on every change.
pub fn use_polling_table<T>(endpoint: &'static str, label: &'static str) -> (RemoteTable<T>, Signal<TableSnapshot<T>>)
where
  T: TableRecord + DeserializeOwned
{
  let table = use_hook(|| PollingTable::new(HttpService::new(endpoint), poll_config(label)));
  let mut snapshot = use_signal(|| table.snapshot());

  use_hook(|| {
    let watched = table.clone();
    let mut changes: watch::Receiver<u64> = table.subscribe();
    spawn(async move {
      while changes.changed().await.is_ok() {
        snapshot.set(watched.snapshot());
      }
    });

    if let Some(task) = table.initialize(BrowserClock) {
      spawn(async move {
        if task.await.is_err() {
          debug!(table = label, "poll loop aborted");
        }
      });
    }
  });

  use_drop({
    let table = table.clone();
    move || table.teardown()
  });

  (table, snapshot)
}

pub fn use_preferences() -> PortalPreferences {
  use_context::<PortalPreferences>()
}
