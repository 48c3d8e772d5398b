// core/src/mock.rs

//! In-memory stand-in for the cart backend.
//!
//! Honours the REST contract the views depend on: borrow/return conflicts
//! (409), unique codes, 404 for unknown ids, and an append-only action log
//! that is listed newest first. Used by the test suites and by the server's
//! standalone mode.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info, instrument};

use crate::api::{normalize_cart_code, CartApi};
use crate::error::{ClientError, ClientResult};
use crate::models::{
  ActionKind, ActionLog, Borrower, BorrowCartRequest, Cart, CartState, CartStatus, CreateCartRequest,
  ReturnCartRequest, UpdateCartRequest,
};
use crate::site::ReturnPoints;

pub const MSG_ALREADY_BORROWED: &str = "cart is already borrowed";
pub const MSG_NOT_BORROWED: &str = "cart is not borrowed";
pub const MSG_TRANSFER_BORROWED: &str = "only available carts can be transferred";
pub const MSG_CODE_TAKEN: &str = "cart code already exists";
pub const MSG_NOT_FOUND: &str = "cart not found";

fn reject(status: u16, message: impl Into<String>) -> ClientError {
  ClientError::Status { status, message: Some(message.into()) }
}

fn required(field: &str, value: &str) -> ClientResult<String> {
  let value = value.trim();
  if value.is_empty() {
    return Err(reject(400, format!("{} is required", field)));
  }
  Ok(value.to_string())
}

#[derive(Debug, Default)]
struct BackendData {
  carts: Vec<Cart>,
  logs: Vec<ActionLog>,
  next_cart_id: i64,
  next_log_id: i64,
  unavailable: bool,
}

impl BackendData {
  fn cart_mut(&mut self, id: i64) -> ClientResult<&mut Cart> {
    self.carts.iter_mut().find(|c| c.id == id).ok_or_else(|| reject(404, MSG_NOT_FOUND))
  }

  fn code_taken(&self, code: &str, except: Option<i64>) -> bool {
    self.carts.iter().any(|c| c.code == code && Some(c.id) != except)
  }

  fn append_log(&mut self, cart: &Cart, kind: ActionKind, from_point: Option<String>, to_point: Option<String>) {
    self.next_log_id += 1;
    let borrower = cart.borrower().filter(|_| kind == ActionKind::Borrow);
    self.logs.push(ActionLog {
      id: self.next_log_id,
      cart_id: cart.id,
      cart_code: cart.code.clone(),
      kind,
      borrower_name: borrower.map(|b| b.name.clone()),
      borrower_phone: borrower.map(|b| b.phone.clone()),
      borrower_destination: borrower.map(|b| b.destination.clone()),
      from_point,
      to_point,
      created_at: Utc::now(),
    });
  }
}

#[derive(Debug, Default)]
pub struct InMemoryBackend {
  data: Mutex<BackendData>,
  /// When set, return points outside this list are rejected with 400.
  return_points: Option<ReturnPoints>,
}

impl InMemoryBackend {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_return_points(return_points: ReturnPoints) -> Self {
    Self { data: Mutex::default(), return_points: Some(return_points) }
  }

  /// While unavailable every call fails with a bare 503.
  pub fn set_unavailable(&self, unavailable: bool) {
    self.data.lock().unavailable = unavailable;
  }

  pub fn log_count(&self) -> usize {
    self.data.lock().logs.len()
  }

  fn check_point(&self, point: &str) -> ClientResult<()> {
    match &self.return_points {
      Some(points) if !points.contains(point) => Err(reject(400, format!("unknown return point '{}'", point))),
      _ => Ok(()),
    }
  }

  fn lock(&self) -> ClientResult<parking_lot::MutexGuard<'_, BackendData>> {
    let data = self.data.lock();
    if data.unavailable {
      return Err(ClientError::Status { status: 503, message: None });
    }
    Ok(data)
  }
}

#[async_trait]
impl CartApi for InMemoryBackend {
  async fn list_carts(&self) -> ClientResult<Vec<Cart>> {
    let data = self.lock()?;
    Ok(data.carts.clone())
  }

  #[instrument(name = "mock_backend::create_cart", skip(self, body), fields(code = %body.code))]
  async fn create_cart(&self, body: &CreateCartRequest) -> ClientResult<Cart> {
    let code = required("code", &body.code)?;
    let return_point = body.return_point.as_deref().map(str::trim).filter(|p| !p.is_empty());
    if let Some(point) = return_point {
      self.check_point(point)?;
    }

    let mut data = self.lock()?;
    if data.code_taken(&code, None) {
      return Err(reject(409, MSG_CODE_TAKEN));
    }
    data.next_cart_id += 1;
    let now = Utc::now();
    let cart = Cart {
      id: data.next_cart_id,
      code,
      state: CartState::Available,
      return_point: return_point.map(str::to_string),
      created_at: now,
      updated_at: now,
    };
    data.carts.push(cart.clone());
    info!(cart_id = cart.id, "Cart created.");
    Ok(cart)
  }

  #[instrument(name = "mock_backend::delete_cart", skip(self))]
  async fn delete_cart(&self, id: i64) -> ClientResult<()> {
    let mut data = self.lock()?;
    let before = data.carts.len();
    data.carts.retain(|c| c.id != id);
    if data.carts.len() == before {
      return Err(reject(404, MSG_NOT_FOUND));
    }
    Ok(())
  }

  #[instrument(name = "mock_backend::borrow_cart", skip(self, body))]
  async fn borrow_cart(&self, id: i64, body: &BorrowCartRequest) -> ClientResult<Cart> {
    let borrower = Borrower {
      name: required("borrower_name", &body.borrower_name)?,
      phone: required("borrower_phone", &body.borrower_phone)?,
      destination: required("borrower_destination", &body.borrower_destination)?,
    };

    let mut data = self.lock()?;
    let cart = data.cart_mut(id)?;
    if !cart.is_available() {
      debug!(cart_id = id, "Borrow rejected, already borrowed.");
      return Err(reject(409, MSG_ALREADY_BORROWED));
    }
    cart.state = CartState::Borrowed(borrower);
    cart.updated_at = Utc::now();
    let cart = cart.clone();
    data.append_log(&cart, ActionKind::Borrow, None, None);
    Ok(cart)
  }

  #[instrument(name = "mock_backend::return_cart", skip(self, body))]
  async fn return_cart(&self, id: i64, body: &ReturnCartRequest) -> ClientResult<Cart> {
    let point = required("return_point", &body.return_point)?;
    self.check_point(&point)?;

    let mut data = self.lock()?;
    let cart = data.cart_mut(id)?;
    if cart.is_available() {
      debug!(cart_id = id, "Return rejected, not borrowed.");
      return Err(reject(409, MSG_NOT_BORROWED));
    }
    let from_point = cart.return_point.replace(point.clone());
    cart.state = CartState::Available;
    cart.updated_at = Utc::now();
    let cart = cart.clone();
    data.append_log(&cart, ActionKind::Return, from_point, Some(point));
    Ok(cart)
  }

  #[instrument(name = "mock_backend::update_cart", skip(self, body))]
  async fn update_cart(&self, id: i64, body: &UpdateCartRequest) -> ClientResult<Cart> {
    if let Some(Some(point)) = &body.return_point {
      self.check_point(point)?;
    }

    let mut data = self.lock()?;
    let code = match &body.code {
      Some(code) => Some(required("code", code)?),
      None => None,
    };
    if let Some(code) = &code {
      if data.code_taken(code, Some(id)) {
        return Err(reject(409, MSG_CODE_TAKEN));
      }
    }

    let cart = data.cart_mut(id)?;
    let current = cart.borrower().cloned();
    let pick = |update: &Option<Option<String>>, existing: Option<String>| match update {
      Some(value) => value.clone().filter(|v| !v.trim().is_empty()),
      None => existing,
    };
    let name = pick(&body.borrower_name, current.as_ref().map(|b| b.name.clone()));
    let phone = pick(&body.borrower_phone, current.as_ref().map(|b| b.phone.clone()));
    let destination = pick(&body.borrower_destination, current.as_ref().map(|b| b.destination.clone()));

    let status = body.status.unwrap_or_else(|| cart.status());
    let state = match status {
      CartStatus::Available => CartState::Available,
      CartStatus::Borrowed => match (name, phone, destination) {
        (Some(name), Some(phone), Some(destination)) => CartState::Borrowed(Borrower { name, phone, destination }),
        _ => return Err(reject(400, "borrowed carts need borrower name, phone and destination")),
      },
    };

    if let Some(code) = code {
      cart.code = code;
    }
    if let Some(point) = &body.return_point {
      cart.return_point = point.clone().filter(|p| !p.trim().is_empty());
    }
    cart.state = state;
    cart.updated_at = Utc::now();
    Ok(cart.clone())
  }

  #[instrument(name = "mock_backend::transfer_cart", skip(self))]
  async fn transfer_cart(&self, id: i64, to_return_point: &str) -> ClientResult<Cart> {
    let point = required("to_return_point", to_return_point)?;
    self.check_point(&point)?;

    let mut data = self.lock()?;
    let cart = data.cart_mut(id)?;
    if !cart.is_available() {
      return Err(reject(409, MSG_TRANSFER_BORROWED));
    }
    let from_point = cart.return_point.replace(point.clone());
    cart.updated_at = Utc::now();
    let cart = cart.clone();
    data.append_log(&cart, ActionKind::Transfer, from_point, Some(point));
    Ok(cart)
  }

  async fn list_logs(&self, cart_code: Option<&str>) -> ClientResult<Vec<ActionLog>> {
    let data = self.lock()?;
    let code = normalize_cart_code(cart_code);
    Ok(
      data
        .logs
        .iter()
        .rev()
        .filter(|entry| code.map_or(true, |c| entry.cart_code == c))
        .cloned()
        .collect(),
    )
  }
}
