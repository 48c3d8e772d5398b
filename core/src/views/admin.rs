// core/src/views/admin.rs

//! The admin cart table: list, create, borrow, return, edit and delete.

use std::time::Duration;

use tracing::{info, instrument, warn};

use super::{failure_message, messages, paginate, spawn_polling, ActionError, Notice, Page, PollGuard, ViewState};
use crate::api::SharedApi;
use crate::forms::{BorrowForm, CreateCartForm, EditCartForm, ReturnForm};
use crate::models::{Cart, CartStatus};
use crate::site::ReturnPoints;

pub const ADMIN_PAGE_SIZE: usize = 10;

/// Which modal workflow is open. Only one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminModal {
  Create,
  Borrow(i64),
  Return(i64),
  Edit(i64),
}

#[derive(Debug, Clone, Default)]
pub struct AdminState {
  pub carts: Vec<Cart>,
  pub loading: bool,
  pub modal: Option<AdminModal>,
  /// Cart awaiting delete confirmation.
  pub pending_delete: Option<i64>,
  pub notice: Option<Notice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
  pub label: &'static str,
  pub color: &'static str,
}

impl StatusBadge {
  pub fn for_status(status: CartStatus) -> Self {
    match status {
      CartStatus::Available => StatusBadge { label: "可用", color: "green" },
      CartStatus::Borrowed => StatusBadge { label: "借用中", color: "orange" },
    }
  }
}

/// The contextual action offered next to edit/delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
  Borrow,
  Return,
}

impl RowAction {
  pub fn label(&self) -> &'static str {
    match self {
      RowAction::Borrow => "借用",
      RowAction::Return => "归还",
    }
  }
}

/// One table row with every cell already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRow {
  pub id: i64,
  pub code: String,
  pub status: CartStatus,
  pub badge: StatusBadge,
  pub borrower_name: String,
  pub borrower_phone: String,
  pub borrower_destination: String,
  pub return_point: String,
  pub action: RowAction,
}

pub(crate) fn or_dash(value: Option<&str>) -> String {
  value.filter(|v| !v.is_empty()).unwrap_or("-").to_string()
}

impl CartRow {
  pub fn from_cart(cart: &Cart) -> Self {
    let status = cart.status();
    let borrower = cart.borrower();
    CartRow {
      id: cart.id,
      code: cart.code.clone(),
      status,
      badge: StatusBadge::for_status(status),
      borrower_name: or_dash(borrower.map(|b| b.name.as_str())),
      borrower_phone: or_dash(borrower.map(|b| b.phone.as_str())),
      borrower_destination: or_dash(borrower.map(|b| b.destination.as_str())),
      return_point: or_dash(cart.return_point.as_deref()),
      action: match status {
        CartStatus::Available => RowAction::Borrow,
        CartStatus::Borrowed => RowAction::Return,
      },
    }
  }
}

/// Confirmation step shown before a delete is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
  pub cart_id: i64,
  pub title: &'static str,
}

#[derive(Clone)]
pub struct CartAdminView {
  api: SharedApi,
  return_points: ReturnPoints,
  state: ViewState<AdminState>,
}

impl CartAdminView {
  pub fn new(api: SharedApi, return_points: ReturnPoints) -> Self {
    Self { api, return_points, state: ViewState::default() }
  }

  /// Creates the view and performs the fetch-on-mount.
  pub async fn mount(api: SharedApi, return_points: ReturnPoints) -> Self {
    let view = Self::new(api, return_points);
    view.refresh().await;
    view
  }

  pub fn state(&self) -> &ViewState<AdminState> {
    &self.state
  }

  pub fn return_points(&self) -> &ReturnPoints {
    &self.return_points
  }

  /// Re-fetches the list. On failure the previous rows stay on screen.
  #[instrument(name = "admin_view::refresh", skip(self))]
  pub async fn refresh(&self) {
    self.state.write().loading = true;
    let result = self.api.list_carts().await;
    let mut state = self.state.write();
    state.loading = false;
    match result {
      Ok(carts) => state.carts = carts,
      Err(e) => {
        warn!(error = %e, "Failed to load carts.");
        state.notice = Some(Notice::error(failure_message(&e, messages::LOAD_FAILED)));
      }
    }
  }

  /// Starts the 5-second refresh for as long as the guard lives.
  pub fn spawn_polling(&self, period: Duration) -> PollGuard {
    let view = self.clone();
    spawn_polling("cart_admin", period, move || {
      let view = view.clone();
      async move { view.refresh().await }
    })
  }

  pub fn rows(&self) -> Vec<CartRow> {
    self.state.read().carts.iter().map(CartRow::from_cart).collect()
  }

  pub fn page(&self, number: usize) -> Page<CartRow> {
    paginate(&self.rows(), number, ADMIN_PAGE_SIZE)
  }

  pub fn cart(&self, id: i64) -> Option<Cart> {
    self.state.read().carts.iter().find(|c| c.id == id).cloned()
  }

  pub fn take_notice(&self) -> Option<Notice> {
    self.state.write().notice.take()
  }

  // --- Modals ---

  pub fn open(&self, modal: AdminModal) {
    self.state.write().modal = Some(modal);
  }

  /// Edit form prefilled from the cached cart, if the cart is still listed.
  pub fn edit_form(&self, id: i64) -> Option<EditCartForm> {
    self.cart(id).map(|cart| EditCartForm::from_cart(&cart))
  }

  async fn finish<T>(
    &self,
    result: crate::error::ClientResult<T>,
    ok_message: &str,
    fallback: &str,
  ) -> Result<T, ActionError> {
    match result {
      Ok(value) => {
        self.state.write().modal = None;
        self.refresh().await;
        // The action went through; a failed re-fetch must not read as a failed action.
        self.state.write().notice = Some(Notice::success(ok_message));
        Ok(value)
      }
      Err(e) => {
        let message = failure_message(&e, fallback);
        warn!(error = %e, %message, "Admin action failed.");
        self.state.write().notice = Some(Notice::error(message.clone()));
        Err(ActionError::Rejected(message))
      }
    }
  }

  #[instrument(name = "admin_view::submit_create", skip(self, form), fields(code = %form.code))]
  pub async fn submit_create(&self, form: &CreateCartForm) -> Result<Cart, ActionError> {
    let request = form.validate(&self.return_points)?;
    let result = self.api.create_cart(&request).await;
    let cart = self.finish(result, messages::CREATE_OK, messages::CREATE_FAILED).await?;
    info!(cart_id = cart.id, "Cart created.");
    Ok(cart)
  }

  #[instrument(name = "admin_view::submit_borrow", skip(self, form))]
  pub async fn submit_borrow(&self, id: i64, form: &BorrowForm) -> Result<Cart, ActionError> {
    let request = form.validate()?;
    let result = self.api.borrow_cart(id, &request).await;
    self.finish(result, messages::BORROW_OK, messages::BORROW_FAILED).await
  }

  #[instrument(name = "admin_view::submit_return", skip(self, form))]
  pub async fn submit_return(&self, id: i64, form: &ReturnForm) -> Result<Cart, ActionError> {
    let request = form.validate(&self.return_points)?;
    let result = self.api.return_cart(id, &request).await;
    self.finish(result, messages::RETURN_OK, messages::RETURN_FAILED).await
  }

  #[instrument(name = "admin_view::submit_edit", skip(self, form))]
  pub async fn submit_edit(&self, id: i64, form: &EditCartForm) -> Result<Cart, ActionError> {
    let request = form.validate(&self.return_points)?;
    let result = self.api.update_cart(id, &request).await;
    self.finish(result, messages::UPDATE_OK, messages::UPDATE_FAILED).await
  }

  // --- Delete with confirmation ---

  /// First step of a delete. Nothing is sent until [`confirm_delete`].
  ///
  /// [`confirm_delete`]: CartAdminView::confirm_delete
  pub fn request_delete(&self, id: i64) -> DeletePrompt {
    self.state.write().pending_delete = Some(id);
    DeletePrompt { cart_id: id, title: messages::DELETE_CONFIRM }
  }

  pub fn cancel_delete(&self) {
    self.state.write().pending_delete = None;
  }

  /// Issues the delete for the pending cart. Returns `Ok(None)` when nothing
  /// was awaiting confirmation.
  #[instrument(name = "admin_view::confirm_delete", skip(self))]
  pub async fn confirm_delete(&self) -> Result<Option<i64>, ActionError> {
    let Some(id) = self.state.write().pending_delete.take() else {
      return Ok(None);
    };
    let result = self.api.delete_cart(id).await;
    self.finish(result, messages::DELETE_OK, messages::DELETE_FAILED).await?;
    info!(cart_id = id, "Cart deleted.");
    Ok(Some(id))
  }
}
