// core/src/models/mod.rs

//! Wire contracts shared with the cart backend.

pub mod action_log;
pub mod cart;
mod timestamp;

pub use action_log::{ActionKind, ActionLog};
pub use cart::{
  Borrower, BorrowCartRequest, Cart, CartState, CartStatus, CreateCartRequest, ReturnCartRequest, TransferCartRequest,
  UpdateCartRequest,
};
