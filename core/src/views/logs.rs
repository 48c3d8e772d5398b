// core/src/views/logs.rs

use std::time::Duration;

use tracing::{instrument, warn};

use super::admin::or_dash;
use super::{failure_message, messages, paginate, spawn_polling, Notice, Page, PollGuard, ViewState};
use crate::api::{normalize_cart_code, SharedApi};
use crate::models::{ActionKind, ActionLog};

pub const LOG_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Default)]
pub struct LogState {
  pub logs: Vec<ActionLog>,
  pub loading: bool,
  /// What is currently typed in the filter box, submitted or not.
  pub filter_input: String,
  pub notice: Option<Notice>,
}

pub fn kind_color(kind: ActionKind) -> &'static str {
  match kind {
    ActionKind::Borrow => "orange",
    ActionKind::Return => "green",
    ActionKind::Transfer => "blue",
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
  pub id: i64,
  pub created_at: String,
  pub kind: ActionKind,
  pub kind_color: &'static str,
  pub cart_code: String,
  pub borrower_name: String,
  pub borrower_phone: String,
  pub borrower_destination: String,
  pub from_point: String,
  pub to_point: String,
}

impl LogRow {
  pub fn from_entry(entry: &ActionLog) -> Self {
    LogRow {
      id: entry.id,
      created_at: entry.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
      kind: entry.kind,
      kind_color: kind_color(entry.kind),
      cart_code: entry.cart_code.clone(),
      borrower_name: or_dash(entry.borrower_name.as_deref()),
      borrower_phone: or_dash(entry.borrower_phone.as_deref()),
      borrower_destination: or_dash(entry.borrower_destination.as_deref()),
      from_point: or_dash(entry.from_point.as_deref()),
      to_point: or_dash(entry.to_point.as_deref()),
    }
  }
}

/// Read-only action log with an exact-match cart code filter.
#[derive(Clone)]
pub struct LogView {
  api: SharedApi,
  state: ViewState<LogState>,
}

impl LogView {
  pub fn new(api: SharedApi) -> Self {
    Self { api, state: ViewState::default() }
  }

  /// Mounts with `filter` already typed into the box and fetches with it.
  pub async fn mount(api: SharedApi, filter: Option<&str>) -> Self {
    let view = Self::new(api);
    view.set_filter_input(filter.unwrap_or_default());
    view.refresh(filter).await;
    view
  }

  pub fn state(&self) -> &ViewState<LogState> {
    &self.state
  }

  pub fn set_filter_input(&self, value: &str) {
    self.state.write().filter_input = value.to_string();
  }

  pub fn filter_input(&self) -> String {
    self.state.read().filter_input.clone()
  }

  #[instrument(name = "log_view::refresh", skip(self))]
  pub async fn refresh(&self, cart_code: Option<&str>) {
    let cart_code = normalize_cart_code(cart_code);
    self.state.write().loading = true;
    let result = self.api.list_logs(cart_code).await;
    let mut state = self.state.write();
    state.loading = false;
    match result {
      Ok(logs) => state.logs = logs,
      Err(e) => {
        warn!(error = %e, "Failed to load logs.");
        state.notice = Some(Notice::error(failure_message(&e, messages::LOAD_LOGS_FAILED)));
      }
    }
  }

  /// The "查询" button.
  pub async fn submit(&self) {
    let filter = self.filter_input();
    self.refresh(Some(&filter)).await;
  }

  /// The "重置" button: clears the box and shows everything.
  pub async fn reset(&self) {
    self.set_filter_input("");
    self.refresh(None).await;
  }

  /// Each tick re-reads whatever is typed in the filter box at that moment.
  pub fn spawn_polling(&self, period: Duration) -> PollGuard {
    let view = self.clone();
    spawn_polling("action_log", period, move || {
      let view = view.clone();
      async move {
        let filter = view.filter_input();
        view.refresh(Some(&filter)).await
      }
    })
  }

  /// Rows in backend order.
  pub fn rows(&self) -> Vec<LogRow> {
    self.state.read().logs.iter().map(LogRow::from_entry).collect()
  }

  pub fn page(&self, number: usize) -> Page<LogRow> {
    paginate(&self.rows(), number, LOG_PAGE_SIZE)
  }

  pub fn take_notice(&self) -> Option<Notice> {
    self.state.write().notice.take()
  }
}
