use std::marker::PhantomData;
use portal_viewmodel::{
  AppError, DataService, ErrorPayload, ExportFormat, FilterCriteria, RecordMutations, SortSpec
};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};

use super::config::API_BASE_URL;

/// REST client for one `/api/<endpoint>` resource of the portal backend.
pub struct HttpService<T> {
  client: Client,
  base_url: String,
  endpoint: &'static str,
  _record: PhantomData<fn() -> T>
}

impl<T> HttpService<T> {
  pub fn new(endpoint: &'static str) -> Self {
    Self::with_base_url(API_BASE_URL, endpoint)
  }

  pub fn with_base_url(base_url: &str, endpoint: &'static str) -> Self {
    Self {
      client: Client::new(),
      base_url: base_url.trim_end_matches('/').to_string(),
      endpoint,
      _record: PhantomData
    }
  }

  pub fn endpoint(&self) -> &'static str {
    self.endpoint
  }

  fn url(&self, suffix: &str) -> String {
    if suffix.is_empty() {
      format!("{}/api/{}", self.base_url, self.endpoint)
    } else {
      format!("{}/api/{}/{}", self.base_url, self.endpoint, suffix)
    }
  }
}

/// Turns a non-2xx response into `ServerError`, keeping the backend's message list.
async fn checked(resp: Response) -> Result<Response, AppError> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let messages = resp.json::<ErrorPayload>().await.map(|p| p.messages).unwrap_or_default();
  Err(AppError::ServerError(status.as_u16(), messages))
}

fn connection(e: reqwest::Error) -> AppError {
  AppError::ConnectionError(e.to_string())
}

impl<T: DeserializeOwned> DataService<T> for HttpService<T> {
  async fn fetch_list(&self) -> Result<Vec<T>, AppError> {
    let resp = self.client.get(self.url("")).send().await.map_err(connection)?;
    checked(resp).await?
      .json::<Vec<T>>()
      .await
      .map_err(|e| AppError::DeserializeError(e.to_string()))
  }

  async fn download(&self, criteria: &FilterCriteria, sort: Option<&SortSpec>, format: ExportFormat) -> Result<Vec<u8>, AppError> {
    let filters = serde_json::to_string(criteria).map_err(|e| AppError::SerializeError(e.to_string()))?;
    let mut query = vec![("format", format.extension().to_string()), ("filters", filters)];
    if let Some(spec) = sort {
      let sort = serde_json::to_string(spec).map_err(|e| AppError::SerializeError(e.to_string()))?;
      query.push(("sort", sort));
    }
    let resp = self.client
      .get(self.url("download"))
      .query(&query)
      .send()
      .await
      .map_err(connection)?;
    let bytes = checked(resp).await?.bytes().await.map_err(connection)?;
    Ok(bytes.to_vec())
  }
}

impl<T: Serialize + DeserializeOwned> RecordMutations<T> for HttpService<T> {
  async fn create(&self, record: &T) -> Result<T, AppError> {
    let resp = self.client.post(self.url("")).json(record).send().await.map_err(connection)?;
    checked(resp).await?.json::<T>().await.map_err(|e| AppError::DeserializeError(e.to_string()))
  }

  async fn update(&self, key: &str, record: &T) -> Result<T, AppError> {
    let resp = self.client.put(self.url(key)).json(record).send().await.map_err(connection)?;
    checked(resp).await?.json::<T>().await.map_err(|e| AppError::DeserializeError(e.to_string()))
  }

  async fn delete(&self, key: &str) -> Result<(), AppError> {
    let resp = self.client.delete(self.url(key)).send().await.map_err(connection)?;
    checked(resp).await?;
    Ok(())
  }
}
