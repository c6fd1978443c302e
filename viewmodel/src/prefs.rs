use std::{cell::RefCell, collections::{BTreeSet, HashMap}};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AppError;

/// Key/value string store backing user preferences (browser `localStorage` in the app).
pub trait PreferenceStorage {
  fn get(&self, key: &str) -> Result<Option<String>, AppError>;

  fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

  fn remove(&self, key: &str) -> Result<(), AppError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
  entries: RefCell<HashMap<String, String>>
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

impl PreferenceStorage for MemoryStorage {
  fn get(&self, key: &str) -> Result<Option<String>, AppError> {
    Ok(self.entries.borrow().get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
    self.entries.borrow_mut().insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<(), AppError> {
    self.entries.borrow_mut().remove(key);
    Ok(())
  }
}

impl<P: PreferenceStorage + ?Sized> PreferenceStorage for std::rc::Rc<P> {
  fn get(&self, key: &str) -> Result<Option<String>, AppError> {
    (**self).get(key)
  }

  fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
    (**self).set(key, value)
  }

  fn remove(&self, key: &str) -> Result<(), AppError> {
    (**self).remove(key)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
  #[default]
  Compact,
  Detailed
}

const FAVORITES_KEY: &str = "favorites";
const VIEW_MODE_KEY: &str = "view_mode";

/// User preferences of one host, read once at construction and written through on
/// every change.
#[derive(Debug)]
pub struct Preferences<S> {
  storage: S,
  namespace: String,
  favorites: BTreeSet<String>,
  view_mode: ViewMode
}

impl<S: PreferenceStorage> Preferences<S> {
  pub fn load(storage: S, namespace: &str) -> Self {
    let favorites = read_json(&storage, &scoped(namespace, FAVORITES_KEY)).unwrap_or_default();
    let view_mode = read_json(&storage, &scoped(namespace, VIEW_MODE_KEY)).unwrap_or_default();
    Preferences { storage, namespace: namespace.to_string(), favorites, view_mode }
  }

  pub fn favorites(&self) -> &BTreeSet<String> {
    &self.favorites
  }

  pub fn is_favorite(&self, symbol: &str) -> bool {
    self.favorites.contains(symbol)
  }

  /// Adds or removes the symbol. Returns whether it is a favorite afterwards. The
  /// in-memory set only changes once storage accepted the new value.
  pub fn toggle_favorite(&mut self, symbol: &str) -> Result<bool, AppError> {
    let mut next = self.favorites.clone();
    let now_favorite = if next.remove(symbol) {
      false
    } else {
      next.insert(symbol.to_string());
      true
    };
    self.write(FAVORITES_KEY, &next)?;
    self.favorites = next;
    Ok(now_favorite)
  }

  pub fn view_mode(&self) -> ViewMode {
    self.view_mode
  }

  pub fn set_view_mode(&mut self, mode: ViewMode) -> Result<(), AppError> {
    self.write(VIEW_MODE_KEY, &mode)?;
    self.view_mode = mode;
    Ok(())
  }

  pub fn clear(&mut self) -> Result<(), AppError> {
    self.favorites.clear();
    self.view_mode = ViewMode::default();
    self.storage.remove(&scoped(&self.namespace, FAVORITES_KEY))?;
    self.storage.remove(&scoped(&self.namespace, VIEW_MODE_KEY))
  }

  fn write<V: Serialize>(&self, key: &str, value: &V) -> Result<(), AppError> {
    let raw = serde_json::to_string(value).map_err(|e| AppError::SerializeError(e.to_string()))?;
    self.storage.set(&scoped(&self.namespace, key), &raw)
  }
}

fn scoped(namespace: &str, key: &str) -> String {
  format!("{}:{}", namespace, key)
}

fn read_json<V: for<'de> Deserialize<'de>>(storage: &impl PreferenceStorage, key: &str) -> Option<V> {
  let raw = match storage.get(key) {
    Ok(raw) => raw?,
    Err(e) => {
      warn!(key, error = %e, "could not read preference");
      return None;
    }
  };
  match serde_json::from_str(&raw) {
    Ok(value) => Some(value),
    Err(e) => {
      warn!(key, error = %e, "ignoring unparseable preference");
      None
    }
  }
}
