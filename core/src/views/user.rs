// core/src/views/user.rs

//! Self-service borrow and return pages. The user types the cart code; it is
//! looked up in the list fetched when the page mounted.

use tracing::{info, instrument, warn};

use super::{failure_message, messages, ActionError, Notice, ViewState};
use crate::api::SharedApi;
use crate::forms::{both, cart_code_input, BorrowForm, ReturnForm};
use crate::models::Cart;
use crate::shell::Route;
use crate::site::ReturnPoints;

#[derive(Debug, Clone, Default)]
pub struct UserState<F> {
  pub carts: Vec<Cart>,
  pub loading: bool,
  /// Draft of the form; cleared after a successful submit.
  pub draft: F,
  pub notice: Option<Notice>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserBorrowForm {
  pub cart_code: String,
  pub borrower: BorrowForm,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserReturnForm {
  pub cart_code: String,
  pub return_point: String,
}

/// Confirmation page reached after a successful self-service action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultPage {
  pub title: &'static str,
  pub back: Route,
  pub back_label: &'static str,
}

impl ResultPage {
  pub const BORROWED: ResultPage = ResultPage { title: "借用成功，请及时归还", back: Route::UserBorrow, back_label: "返回" };
  pub const RETURNED: ResultPage = ResultPage { title: "归还成功", back: Route::UserReturn, back_label: "返回" };
}

fn find_by_code(carts: &[Cart], code: &str) -> Result<Cart, ActionError> {
  carts
    .iter()
    .find(|c| c.code == code)
    .cloned()
    .ok_or_else(|| ActionError::Rejected(messages::CART_NOT_FOUND.to_string()))
}

async fn load_into<F: Send + Sync + 'static>(api: &SharedApi, state: &ViewState<UserState<F>>) {
  state.write().loading = true;
  let result = api.list_carts().await;
  let mut state = state.write();
  state.loading = false;
  match result {
    Ok(carts) => state.carts = carts,
    Err(e) => {
      warn!(error = %e, "Self-service page failed to load carts.");
      state.notice = Some(Notice::error(messages::LOAD_FAILED));
    }
  }
}

#[derive(Clone)]
pub struct UserBorrowView {
  api: SharedApi,
  state: ViewState<UserState<UserBorrowForm>>,
}

impl UserBorrowView {
  pub fn new(api: SharedApi) -> Self {
    Self { api, state: ViewState::default() }
  }

  pub async fn mount(api: SharedApi) -> Self {
    let view = Self::new(api);
    view.load().await;
    view
  }

  pub async fn load(&self) {
    load_into(&self.api, &self.state).await
  }

  pub fn state(&self) -> &ViewState<UserState<UserBorrowForm>> {
    &self.state
  }

  pub fn draft(&self) -> UserBorrowForm {
    self.state.read().draft.clone()
  }

  pub fn take_notice(&self) -> Option<Notice> {
    self.state.write().notice.take()
  }

  /// Validates, resolves the typed code and borrows. On success the draft is
  /// cleared and the caller should navigate to the returned route.
  #[instrument(name = "user_borrow_view::submit", skip(self, form), fields(cart_code = %form.cart_code))]
  pub async fn submit(&self, form: &UserBorrowForm) -> Result<Route, ActionError> {
    self.state.write().draft = form.clone();
    let result = self.try_submit(form).await;
    let mut state = self.state.write();
    match &result {
      Ok(_) => state.draft = UserBorrowForm::default(),
      Err(e) => state.notice = Some(Notice::error(e.message())),
    }
    result
  }

  async fn try_submit(&self, form: &UserBorrowForm) -> Result<Route, ActionError> {
    let (code, request) = both(cart_code_input(&form.cart_code), form.borrower.validate_strict())?;
    let cart = {
      let state = self.state.read();
      find_by_code(&state.carts, &code)?
    };

    match self.api.borrow_cart(cart.id, &request).await {
      Ok(_) => {
        info!(cart_id = cart.id, "Self-service borrow succeeded.");
        Ok(Route::BorrowResult)
      }
      Err(e) if e.is_conflict() => {
        warn!(cart_id = cart.id, error = %e, "Borrow conflicted.");
        Err(ActionError::Rejected(messages::ALREADY_BORROWED.to_string()))
      }
      Err(e) => {
        warn!(cart_id = cart.id, error = %e, "Borrow failed.");
        Err(ActionError::Rejected(failure_message(&e, messages::BORROW_FAILED)))
      }
    }
  }
}

#[derive(Clone)]
pub struct UserReturnView {
  api: SharedApi,
  return_points: ReturnPoints,
  state: ViewState<UserState<UserReturnForm>>,
}

impl UserReturnView {
  pub fn new(api: SharedApi, return_points: ReturnPoints) -> Self {
    Self { api, return_points, state: ViewState::default() }
  }

  pub async fn mount(api: SharedApi, return_points: ReturnPoints) -> Self {
    let view = Self::new(api, return_points);
    view.load().await;
    view
  }

  pub async fn load(&self) {
    load_into(&self.api, &self.state).await
  }

  pub fn state(&self) -> &ViewState<UserState<UserReturnForm>> {
    &self.state
  }

  pub fn return_points(&self) -> &ReturnPoints {
    &self.return_points
  }

  pub fn draft(&self) -> UserReturnForm {
    self.state.read().draft.clone()
  }

  pub fn take_notice(&self) -> Option<Notice> {
    self.state.write().notice.take()
  }

  #[instrument(name = "user_return_view::submit", skip(self, form), fields(cart_code = %form.cart_code))]
  pub async fn submit(&self, form: &UserReturnForm) -> Result<Route, ActionError> {
    self.state.write().draft = form.clone();
    let result = self.try_submit(form).await;
    let mut state = self.state.write();
    match &result {
      Ok(_) => state.draft = UserReturnForm::default(),
      Err(e) => state.notice = Some(Notice::error(e.message())),
    }
    result
  }

  async fn try_submit(&self, form: &UserReturnForm) -> Result<Route, ActionError> {
    let return_form = ReturnForm { return_point: form.return_point.clone() };
    let (code, request) = both(cart_code_input(&form.cart_code), return_form.validate(&self.return_points))?;
    let cart = {
      let state = self.state.read();
      find_by_code(&state.carts, &code)?
    };

    match self.api.return_cart(cart.id, &request).await {
      Ok(_) => {
        info!(cart_id = cart.id, "Self-service return succeeded.");
        Ok(Route::ReturnResult)
      }
      Err(e) if e.is_not_borrowed_conflict() => Err(ActionError::Rejected(messages::NOT_BORROWED.to_string())),
      Err(e) if e.is_conflict() => {
        warn!(cart_id = cart.id, error = %e, "Return conflicted.");
        Err(ActionError::Rejected(messages::CONFLICT_RETRY.to_string()))
      }
      Err(e) => {
        warn!(cart_id = cart.id, error = %e, "Return failed.");
        Err(ActionError::Rejected(failure_message(&e, messages::RETURN_FAILED)))
      }
    }
  }
}
