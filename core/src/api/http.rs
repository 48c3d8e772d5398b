// core/src/api/http.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::{normalize_cart_code, CartApi};
use crate::error::{BackendErrorBody, ClientError, ClientResult};
use crate::models::{
  ActionLog, BorrowCartRequest, Cart, CreateCartRequest, ReturnCartRequest, TransferCartRequest, UpdateCartRequest,
};

/// `CartApi` over HTTP/JSON with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpCartApi {
  client: Client,
  base_url: Url,
}

impl HttpCartApi {
  pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
    let invalid = |detail: String| ClientError::InvalidBaseUrl { url: base_url.to_string(), detail };

    // Url::join drops the last path segment unless it ends with '/'.
    let mut normalized = base_url.trim().to_string();
    if !normalized.ends_with('/') {
      normalized.push('/');
    }
    let base_url = Url::parse(&normalized).map_err(|e| invalid(e.to_string()))?;
    if base_url.cannot_be_a_base() {
      return Err(invalid("URL cannot be used as a base".to_string()));
    }

    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, base_url })
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  fn endpoint(&self, path: &str) -> ClientResult<Url> {
    self.base_url.join(path).map_err(|e| ClientError::InvalidBaseUrl {
      url: self.base_url.to_string(),
      detail: e.to_string(),
    })
  }

  async fn execute(&self, request: RequestBuilder) -> ClientResult<reqwest::Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let message = serde_json::from_slice::<BackendErrorBody>(&body).ok().map(|b| b.error);
    debug!(status = status.as_u16(), backend_error = ?message, "Backend rejected request.");
    Err(ClientError::Status { status: status.as_u16(), message })
  }

  async fn fetch_json<T: DeserializeOwned>(&self, operation: &'static str, request: RequestBuilder) -> ClientResult<T> {
    let body = self.execute(request).await?.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ClientError::Decode { operation, detail: e.to_string() })
  }

  async fn fetch_list<T: DeserializeOwned>(
    &self,
    operation: &'static str,
    request: RequestBuilder,
  ) -> ClientResult<Vec<T>> {
    let value: serde_json::Value = self.fetch_json(operation, request).await?;
    Ok(decode_rows(operation, value))
  }
}

/// Decodes a list row by row. A non-array body reads as empty, and rows that
/// break the contract are skipped so one bad cart cannot hide the others.
pub(crate) fn decode_rows<T: DeserializeOwned>(operation: &'static str, value: serde_json::Value) -> Vec<T> {
  let serde_json::Value::Array(rows) = value else {
    warn!(operation, "Expected a JSON array, treating the response as empty.");
    return Vec::new();
  };
  let total = rows.len();
  let decoded: Vec<T> = rows
    .into_iter()
    .enumerate()
    .filter_map(|(index, row)| match serde_json::from_value(row) {
      Ok(item) => Some(item),
      Err(e) => {
        warn!(operation, index, error = %e, "Skipping row that does not match the contract.");
        None
      }
    })
    .collect();
  if decoded.len() < total {
    warn!(operation, skipped = total - decoded.len(), total, "Some rows were skipped.");
  }
  decoded
}

#[async_trait]
impl CartApi for HttpCartApi {
  #[instrument(name = "cart_api::list_carts", skip(self), err(Display))]
  async fn list_carts(&self) -> ClientResult<Vec<Cart>> {
    let url = self.endpoint("api/carts")?;
    self.fetch_list("list_carts", self.client.get(url)).await
  }

  #[instrument(name = "cart_api::create_cart", skip(self, body), fields(code = %body.code), err(Display))]
  async fn create_cart(&self, body: &CreateCartRequest) -> ClientResult<Cart> {
    let url = self.endpoint("api/carts")?;
    self.fetch_json("create_cart", self.client.post(url).json(body)).await
  }

  #[instrument(name = "cart_api::delete_cart", skip(self), err(Display))]
  async fn delete_cart(&self, id: i64) -> ClientResult<()> {
    let url = self.endpoint(&format!("api/carts/{}", id))?;
    self.execute(self.client.delete(url)).await?;
    Ok(())
  }

  #[instrument(name = "cart_api::borrow_cart", skip(self, body), err(Display))]
  async fn borrow_cart(&self, id: i64, body: &BorrowCartRequest) -> ClientResult<Cart> {
    let url = self.endpoint(&format!("api/carts/{}/borrow", id))?;
    self.fetch_json("borrow_cart", self.client.post(url).json(body)).await
  }

  #[instrument(name = "cart_api::return_cart", skip(self, body), fields(return_point = %body.return_point), err(Display))]
  async fn return_cart(&self, id: i64, body: &ReturnCartRequest) -> ClientResult<Cart> {
    let url = self.endpoint(&format!("api/carts/{}/return", id))?;
    self.fetch_json("return_cart", self.client.post(url).json(body)).await
  }

  #[instrument(name = "cart_api::update_cart", skip(self, body), err(Display))]
  async fn update_cart(&self, id: i64, body: &UpdateCartRequest) -> ClientResult<Cart> {
    let url = self.endpoint(&format!("api/carts/{}", id))?;
    self.fetch_json("update_cart", self.client.put(url).json(body)).await
  }

  #[instrument(name = "cart_api::transfer_cart", skip(self), err(Display))]
  async fn transfer_cart(&self, id: i64, to_return_point: &str) -> ClientResult<Cart> {
    let url = self.endpoint(&format!("api/carts/{}/transfer", id))?;
    let body = TransferCartRequest { to_return_point: to_return_point.to_string() };
    self.fetch_json("transfer_cart", self.client.post(url).json(&body)).await
  }

  #[instrument(name = "cart_api::list_logs", skip(self), err(Display))]
  async fn list_logs(&self, cart_code: Option<&str>) -> ClientResult<Vec<ActionLog>> {
    let url = self.endpoint("api/logs")?;
    let mut request = self.client.get(url);
    if let Some(code) = normalize_cart_code(cart_code) {
      request = request.query(&[("cart_code", code)]);
    }
    self.fetch_list("list_logs", request).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn endpoints_keep_base_path_prefix() {
    let api = HttpCartApi::new("http://backend.local/campus", Duration::from_secs(1)).unwrap();
    assert_eq!(api.endpoint("api/carts").unwrap().as_str(), "http://backend.local/campus/api/carts");

    let api = HttpCartApi::new("http://backend.local:8000/", Duration::from_secs(1)).unwrap();
    assert_eq!(api.endpoint("api/carts/3/borrow").unwrap().as_str(), "http://backend.local:8000/api/carts/3/borrow");
  }

  #[test]
  fn bad_cart_row_is_skipped_not_fatal() {
    let body = serde_json::json!([
      {"id": 1, "code": "A1", "status": "available", "created_at": "2024-03-01 08:30:00", "updated_at": "2024-03-01 08:30:00"},
      {"id": 2, "code": "B2", "status": "borrowed", "borrower_name": "x", "created_at": "2024-03-01 08:30:00", "updated_at": "2024-03-01 08:30:00"},
      {"id": 3, "code": "C3", "status": "lost", "created_at": "2024-03-01 08:30:00", "updated_at": "2024-03-01 08:30:00"}
    ]);
    let carts: Vec<Cart> = decode_rows("list_carts", body);
    let codes: Vec<&str> = carts.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, vec!["A1"]);
  }

  #[test]
  fn non_array_list_body_reads_as_empty() {
    let logs: Vec<ActionLog> = decode_rows("list_logs", serde_json::json!({"error": "nope"}));
    assert!(logs.is_empty());
  }

  #[test]
  fn rejects_unparseable_base_url() {
    let err = HttpCartApi::new("not a url", Duration::from_secs(1)).unwrap_err();
    assert!(matches!(err, ClientError::InvalidBaseUrl { .. }));
  }
}
