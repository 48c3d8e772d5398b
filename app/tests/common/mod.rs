// tests/common/mod.rs
#![allow(dead_code)] // Each test binary uses a different subset

use cartdesk::models::CreateCartRequest;
use cartdesk::{Cart, CartApi, InMemoryBackend, ReturnPoints};
use cartdesk_app::config::AppConfig;
use cartdesk_app::state::AppState;
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

/// App state backed by a fresh in-memory store, plus a handle to that store
/// for seeding and assertions.
pub fn mock_state() -> (AppState, Arc<InMemoryBackend>) {
  let config = AppConfig { mock_backend: true, ..AppConfig::default() };
  let backend = Arc::new(InMemoryBackend::with_return_points(ReturnPoints::default()));
  (AppState::with_mock(Arc::new(config), backend.clone()), backend)
}

pub async fn seed_cart(backend: &InMemoryBackend, code: &str, return_point: Option<&str>) -> Cart {
  backend
    .create_cart(&CreateCartRequest { code: code.to_string(), return_point: return_point.map(str::to_string) })
    .await
    .expect("seeding a cart")
}

pub const BORROWER: [(&str, &str); 3] = [
  ("borrower_name", "张三"),
  ("borrower_phone", "13800000000"),
  ("borrower_destination", "友园16号楼"),
];
