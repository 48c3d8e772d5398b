// core/src/views/transfer.rs

//! Relocating an available cart to another return point.

use tracing::{info, instrument, warn};

use super::{failure_message, messages, ActionError, Notice, ViewState};
use crate::api::SharedApi;
use crate::models::Cart;
use crate::site::ReturnPoints;

pub const UNKNOWN_LOCATION: &str = "未知位置";
pub const NO_DESTINATION: &str = "未选择目的地";
pub const SELECT_PROMPT: &str = "请选择小推车与目的地";

#[derive(Debug, Clone, Default)]
pub struct TransferState {
  pub carts: Vec<Cart>,
  pub loading: bool,
  pub selected_cart: Option<i64>,
  pub destination: Option<String>,
  pub notice: Option<Notice>,
}

impl TransferState {
  pub fn available_carts(&self) -> impl Iterator<Item = &Cart> {
    self.carts.iter().filter(|c| c.is_available())
  }

  /// The selection only counts while that cart is still available.
  pub fn selected(&self) -> Option<&Cart> {
    let id = self.selected_cart?;
    self.available_carts().find(|c| c.id == id)
  }
}

/// "将{code}号小推车由{from}运送至{to}"
pub fn transfer_sentence(cart: Option<&Cart>, destination: Option<&str>) -> String {
  let Some(cart) = cart else {
    return SELECT_PROMPT.to_string();
  };
  let from = cart.return_point.as_deref().unwrap_or(UNKNOWN_LOCATION);
  let to = destination.unwrap_or(NO_DESTINATION);
  format!("将{}号小推车由{}运送至{}", cart.code, from, to)
}

#[derive(Clone)]
pub struct TransferView {
  api: SharedApi,
  return_points: ReturnPoints,
  state: ViewState<TransferState>,
}

impl TransferView {
  pub fn new(api: SharedApi, return_points: ReturnPoints) -> Self {
    Self { api, return_points, state: ViewState::default() }
  }

  pub async fn mount(api: SharedApi, return_points: ReturnPoints) -> Self {
    let view = Self::new(api, return_points);
    view.refresh().await;
    view
  }

  pub fn state(&self) -> &ViewState<TransferState> {
    &self.state
  }

  pub fn return_points(&self) -> &ReturnPoints {
    &self.return_points
  }

  #[instrument(name = "transfer_view::refresh", skip(self))]
  pub async fn refresh(&self) {
    self.state.write().loading = true;
    let result = self.api.list_carts().await;
    let mut state = self.state.write();
    state.loading = false;
    match result {
      Ok(carts) => state.carts = carts,
      Err(e) => {
        warn!(error = %e, "Failed to load carts for transfer.");
        state.notice = Some(Notice::error(failure_message(&e, messages::LOAD_CARTS_FAILED)));
      }
    }
  }

  pub fn available_carts(&self) -> Vec<Cart> {
    self.state.read().available_carts().cloned().collect()
  }

  /// Selects a cart if it is currently available; otherwise clears the selection.
  pub fn select_cart(&self, id: Option<i64>) {
    let mut state = self.state.write();
    let selected = id.filter(|id| state.available_carts().any(|c| c.id == *id));
    state.selected_cart = selected;
  }

  /// Selects a destination if it is a configured return point.
  pub fn select_destination(&self, point: Option<&str>) {
    let point = point.map(str::trim).filter(|p| self.return_points.contains(p));
    self.state.write().destination = point.map(str::to_string);
  }

  pub fn sentence(&self) -> String {
    let state = self.state.read();
    transfer_sentence(state.selected(), state.destination.as_deref())
  }

  pub fn can_transport(&self) -> bool {
    let state = self.state.read();
    state.selected().is_some() && state.destination.is_some()
  }

  pub fn take_notice(&self) -> Option<Notice> {
    self.state.write().notice.take()
  }

  /// Sends the transfer and re-fetches so the new location shows up.
  #[instrument(name = "transfer_view::transport", skip(self))]
  pub async fn transport(&self) -> Result<Cart, ActionError> {
    let (id, destination, sentence) = {
      let state = self.state.read();
      match (state.selected(), state.destination.clone()) {
        (Some(cart), Some(destination)) => {
          let sentence = transfer_sentence(Some(cart), Some(&destination));
          (cart.id, destination, sentence)
        }
        _ => return Err(ActionError::Rejected(SELECT_PROMPT.to_string())),
      }
    };

    match self.api.transfer_cart(id, &destination).await {
      Ok(cart) => {
        info!(cart_id = id, %destination, "Cart transferred.");
        self.state.write().notice = Some(Notice::success(sentence));
        self.refresh().await;
        Ok(cart)
      }
      Err(e) => {
        let message = failure_message(&e, messages::TRANSFER_FAILED);
        warn!(error = %e, "Transfer failed.");
        self.state.write().notice = Some(Notice::error(message.clone()));
        Err(ActionError::Rejected(message))
      }
    }
  }
}
