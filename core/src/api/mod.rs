// core/src/api/mod.rs

//! The backend seam. Views only ever talk to a `dyn CartApi`.

mod http;

pub use http::HttpCartApi;

use crate::error::ClientResult;
use crate::models::{ActionLog, BorrowCartRequest, Cart, CreateCartRequest, ReturnCartRequest, UpdateCartRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// One method per backend operation. Every call is independent: no retries,
/// no caching, no batching.
#[async_trait]
pub trait CartApi: Send + Sync {
  /// `GET /api/carts`
  async fn list_carts(&self) -> ClientResult<Vec<Cart>>;

  /// `POST /api/carts`
  async fn create_cart(&self, body: &CreateCartRequest) -> ClientResult<Cart>;

  /// `DELETE /api/carts/{id}`
  async fn delete_cart(&self, id: i64) -> ClientResult<()>;

  /// `POST /api/carts/{id}/borrow`. Conflicts (409) when already borrowed.
  async fn borrow_cart(&self, id: i64, body: &BorrowCartRequest) -> ClientResult<Cart>;

  /// `POST /api/carts/{id}/return`. Conflicts (409) when not borrowed.
  async fn return_cart(&self, id: i64, body: &ReturnCartRequest) -> ClientResult<Cart>;

  /// `PUT /api/carts/{id}`
  async fn update_cart(&self, id: i64, body: &UpdateCartRequest) -> ClientResult<Cart>;

  /// `POST /api/carts/{id}/transfer`
  async fn transfer_cart(&self, id: i64, to_return_point: &str) -> ClientResult<Cart>;

  /// `GET /api/logs[?cart_code=CODE]`. A blank code means no filter.
  async fn list_logs(&self, cart_code: Option<&str>) -> ClientResult<Vec<ActionLog>>;
}

pub type SharedApi = Arc<dyn CartApi>;

/// Normalises a log filter: trims it and treats blank input as "no filter".
pub fn normalize_cart_code(cart_code: Option<&str>) -> Option<&str> {
  cart_code.map(str::trim).filter(|c| !c.is_empty())
}
