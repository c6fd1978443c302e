use std::time::Duration;
use futures::future::LocalBoxFuture;
use js_sys::{wasm_bindgen::JsCast, Array, Uint8Array};
use portal_viewmodel::{AppError, Clock, PreferenceStorage};
use web_sys::{window, Blob, BlobPropertyBag, HtmlAnchorElement, Storage, Url};

fn platform<E: std::fmt::Debug>(e: E) -> AppError {
  AppError::PlatformError(format!("{:?}", e))
}

/// Timer driving the poll loops in the browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
  fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
    Box::pin(async_std::task::sleep(duration))
  }
}

/// `window.localStorage` as preference storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
  fn storage(&self) -> Result<Storage, AppError> {
    window()
      .ok_or_else(|| AppError::StorageError("no global window".to_string()))?
      .local_storage()
      .map_err(|e| AppError::StorageError(format!("{:?}", e)))?
      .ok_or_else(|| AppError::StorageError("localStorage is disabled".to_string()))
  }
}

impl PreferenceStorage for LocalStorage {
  fn get(&self, key: &str) -> Result<Option<String>, AppError> {
    self.storage()?.get_item(key).map_err(|e| AppError::StorageError(format!("{:?}", e)))
  }

  fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
    self.storage()?.set_item(key, value).map_err(|e| AppError::StorageError(format!("{:?}", e)))
  }

  fn remove(&self, key: &str) -> Result<(), AppError> {
    self.storage()?.remove_item(key).map_err(|e| AppError::StorageError(format!("{:?}", e)))
  }
}

/// Hands `bytes` to the browser as a file download.
pub fn save_file(bytes: &[u8], file_name: &str, mime_type: &str) -> Result<(), AppError> {
  let window = window().ok_or_else(|| AppError::PlatformError("no global window".to_string()))?;
  let document = window.document().ok_or_else(|| AppError::PlatformError("no document".to_string()))?;

  let data = Uint8Array::new_with_length(bytes.len() as u32);
  data.copy_from(bytes);
  let parts = Array::new();
  parts.push(&data);

  let options = BlobPropertyBag::new();
  options.set_type(mime_type);
  let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(platform)?;
  let url = Url::create_object_url_with_blob(&blob).map_err(platform)?;

  let anchor = document
    .create_element("a")
    .map_err(platform)?
    .dyn_into::<HtmlAnchorElement>()
    .map_err(platform)?;
  anchor.set_href(&url);
  anchor.set_download(file_name);
  anchor.click();

  Url::revoke_object_url(&url).map_err(platform)
}
