// core/src/views/mod.rs

//! View-models for every page of the cart desk.
//!
//! A view is mounted per page visit: it fetches on mount, owns its own copy
//! of the backend data, and optionally polls through a [`PollGuard`] that is
//! torn down with the view. Nothing here is process-global.

pub mod admin;
pub mod logs;
pub mod poll;
pub mod state;
pub mod transfer;
pub mod user;

pub use admin::{AdminModal, AdminState, CartAdminView, CartRow, DeletePrompt, RowAction, StatusBadge};
pub use logs::{LogRow, LogState, LogView};
pub use poll::{spawn_polling, PollGuard};
pub use state::ViewState;
pub use transfer::{TransferState, TransferView};
pub use user::{ResultPage, UserBorrowForm, UserBorrowView, UserReturnForm, UserReturnView, UserState};

use thiserror::Error;

use crate::error::ClientError;
use crate::forms::FieldErrors;

/// User-facing text for failures and successes.
pub mod messages {
  pub const NETWORK_FAILED: &str = "网络异常，请稍后重试";
  pub const LOAD_FAILED: &str = "加载失败";
  pub const LOAD_CARTS_FAILED: &str = "加载小推车失败";
  pub const LOAD_LOGS_FAILED: &str = "加载日志失败";

  pub const CREATE_OK: &str = "创建成功";
  pub const CREATE_FAILED: &str = "创建失败";
  pub const BORROW_OK: &str = "借用成功";
  pub const BORROW_FAILED: &str = "借用失败";
  pub const RETURN_OK: &str = "归还成功";
  pub const RETURN_FAILED: &str = "归还失败";
  pub const UPDATE_OK: &str = "更新成功";
  pub const UPDATE_FAILED: &str = "更新失败";
  pub const DELETE_OK: &str = "删除成功";
  pub const DELETE_FAILED: &str = "删除失败";
  pub const TRANSFER_FAILED: &str = "运送失败";

  pub const DELETE_CONFIRM: &str = "确认删除该小推车？";
  pub const CART_NOT_FOUND: &str = "未找到该编号的小推车";
  pub const ALREADY_BORROWED: &str = "此小推车正在被借用";
  pub const NOT_BORROWED: &str = "该小推车当前未被借用";
  pub const CONFLICT_RETRY: &str = "操作冲突，请稍后再试";
  pub const NO_SUCH_CART: &str = "小推车不存在或已被删除";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
  Success,
  Error,
}

/// A transient notification left by the last action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub level: NoticeLevel,
  pub message: String,
}

impl Notice {
  pub fn success(message: impl Into<String>) -> Self {
    Self { level: NoticeLevel::Success, message: message.into() }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self { level: NoticeLevel::Error, message: message.into() }
  }
}

/// Why a form submission did not go through.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
  /// Caught before any request was issued.
  #[error("invalid form: {0}")]
  Invalid(FieldErrors),

  /// The request failed; carries the message to show.
  #[error("{0}")]
  Rejected(String),
}

impl ActionError {
  pub fn message(&self) -> String {
    match self {
      ActionError::Invalid(errors) => errors.to_string(),
      ActionError::Rejected(message) => message.clone(),
    }
  }

  pub fn field_errors(&self) -> Option<&FieldErrors> {
    match self {
      ActionError::Invalid(errors) => Some(errors),
      ActionError::Rejected(_) => None,
    }
  }
}

impl From<FieldErrors> for ActionError {
  fn from(errors: FieldErrors) -> Self {
    ActionError::Invalid(errors)
  }
}

/// Backend text verbatim when present; a generic network message when no
/// response arrived; otherwise the per-action fallback.
pub fn failure_message(err: &ClientError, fallback: &str) -> String {
  if let Some(message) = err.backend_message() {
    return message.to_string();
  }
  match err {
    ClientError::Transport { .. } => messages::NETWORK_FAILED.to_string(),
    _ => fallback.to_string(),
  }
}

/// One page of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
  pub items: Vec<T>,
  /// 1-based, clamped into range.
  pub number: usize,
  pub total_pages: usize,
  pub total_items: usize,
}

pub fn paginate<T: Clone>(items: &[T], number: usize, page_size: usize) -> Page<T> {
  let page_size = page_size.max(1);
  let total_items = items.len();
  let total_pages = total_items.div_ceil(page_size).max(1);
  let number = number.clamp(1, total_pages);
  let start = (number - 1) * page_size;
  Page {
    items: items.iter().skip(start).take(page_size).cloned().collect(),
    number,
    total_pages,
    total_items,
  }
}
