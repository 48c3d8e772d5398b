// src/lib.rs

//! Cartdesk: the client side of a small cart-fleet tracker.
//!
//! Carts are borrowed, returned and moved between named return points. The
//! backend owns every cart and the action log; this crate provides:
//!  - Typed wire contracts where a cart's borrow state is a closed enum and
//!    borrower details exist only while borrowed.
//!  - `CartApi`, one async method per REST operation, with an HTTP
//!    implementation and an in-memory stand-in.
//!  - View-models for the admin table, the transfer tool, the log viewer and
//!    the self-service borrow/return pages, including form validation and
//!    per-view polling.
//!  - The route table shared by the HTML shell.

pub mod api;
pub mod error;
pub mod forms;
pub mod mock;
pub mod models;
pub mod shell;
pub mod site;
pub mod views;

// --- Re-exports for the Public API ---

pub use crate::api::{CartApi, HttpCartApi, SharedApi};
pub use crate::error::{ClientError, ClientResult};
pub use crate::mock::InMemoryBackend;
pub use crate::models::{ActionKind, ActionLog, Borrower, Cart, CartState, CartStatus};
pub use crate::shell::{Resolution, Route};
pub use crate::site::ReturnPoints;
pub use crate::views::{
  ActionError, CartAdminView, LogView, Notice, NoticeLevel, PollGuard, TransferView, UserBorrowView, UserReturnView,
};
