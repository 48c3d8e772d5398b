// tests/common/mod.rs
#![allow(dead_code)] // Each test binary uses a different subset

use async_trait::async_trait;
use cartdesk::forms::BorrowForm;
use cartdesk::models::{BorrowCartRequest, CreateCartRequest, ReturnCartRequest, UpdateCartRequest};
use cartdesk::{ActionLog, Cart, CartApi, ClientError, ClientResult, InMemoryBackend, ReturnPoints, SharedApi};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::Level;

// --- Tracing Setup (once per test binary) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Fixtures ---

pub fn points() -> ReturnPoints {
  ReturnPoints::default()
}

pub fn backend() -> Arc<InMemoryBackend> {
  Arc::new(InMemoryBackend::with_return_points(points()))
}

pub async fn seed_cart(api: &dyn CartApi, code: &str, return_point: Option<&str>) -> Cart {
  api
    .create_cart(&CreateCartRequest { code: code.to_string(), return_point: return_point.map(str::to_string) })
    .await
    .expect("seeding a cart")
}

pub fn zhang_san() -> BorrowForm {
  BorrowForm {
    borrower_name: "张三".into(),
    borrower_phone: "13800000000".into(),
    borrower_destination: "友园16号楼".into(),
  }
}

pub fn zhang_san_request() -> BorrowCartRequest {
  zhang_san().validate_strict().expect("fixture is valid")
}

// --- Call-counting wrapper ---

/// Delegates to an `InMemoryBackend` and counts calls per operation, so tests
/// can assert that nothing reached the network.
pub struct CountingApi {
  pub inner: Arc<InMemoryBackend>,
  calls: Mutex<HashMap<&'static str, usize>>,
  /// When set, `list_carts` answers 503 while mutations still succeed.
  lists_down: AtomicBool,
}

impl CountingApi {
  pub fn new(inner: Arc<InMemoryBackend>) -> Arc<Self> {
    Arc::new(Self { inner, calls: Mutex::new(HashMap::new()), lists_down: AtomicBool::new(false) })
  }

  pub fn calls(&self, operation: &str) -> usize {
    self.calls.lock().get(operation).copied().unwrap_or(0)
  }

  pub fn total_calls(&self) -> usize {
    self.calls.lock().values().sum()
  }

  pub fn set_lists_down(&self, down: bool) {
    self.lists_down.store(down, Ordering::SeqCst);
  }

  fn hit(&self, operation: &'static str) {
    *self.calls.lock().entry(operation).or_insert(0) += 1;
  }
}

#[async_trait]
impl CartApi for CountingApi {
  async fn list_carts(&self) -> ClientResult<Vec<Cart>> {
    self.hit("list_carts");
    if self.lists_down.load(Ordering::SeqCst) {
      return Err(ClientError::Status { status: 503, message: None });
    }
    self.inner.list_carts().await
  }

  async fn create_cart(&self, body: &CreateCartRequest) -> ClientResult<Cart> {
    self.hit("create_cart");
    self.inner.create_cart(body).await
  }

  async fn delete_cart(&self, id: i64) -> ClientResult<()> {
    self.hit("delete_cart");
    self.inner.delete_cart(id).await
  }

  async fn borrow_cart(&self, id: i64, body: &BorrowCartRequest) -> ClientResult<Cart> {
    self.hit("borrow_cart");
    self.inner.borrow_cart(id, body).await
  }

  async fn return_cart(&self, id: i64, body: &ReturnCartRequest) -> ClientResult<Cart> {
    self.hit("return_cart");
    self.inner.return_cart(id, body).await
  }

  async fn update_cart(&self, id: i64, body: &UpdateCartRequest) -> ClientResult<Cart> {
    self.hit("update_cart");
    self.inner.update_cart(id, body).await
  }

  async fn transfer_cart(&self, id: i64, to_return_point: &str) -> ClientResult<Cart> {
    self.hit("transfer_cart");
    self.inner.transfer_cart(id, to_return_point).await
  }

  async fn list_logs(&self, cart_code: Option<&str>) -> ClientResult<Vec<ActionLog>> {
    self.hit("list_logs");
    self.inner.list_logs(cart_code).await
  }
}

pub fn shared(api: &Arc<CountingApi>) -> SharedApi {
  api.clone()
}
