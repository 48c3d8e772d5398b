// cartdesk/core/examples/fleet_walkthrough.rs

//! Drives the admin, transfer and self-service views against the in-memory
//! backend and prints what each page would show.

use cartdesk::forms::CreateCartForm;
use cartdesk::views::{UserBorrowForm, UserReturnForm};
use cartdesk::{
  ActionError, CartAdminView, InMemoryBackend, LogView, ReturnPoints, SharedApi, TransferView, UserBorrowView,
  UserReturnView,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ActionError> {
  // Initialize tracing (optional, for demonstration)
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Cart Fleet Walkthrough ---");

  let points = ReturnPoints::default();
  let api: SharedApi = Arc::new(InMemoryBackend::with_return_points(points.clone()));

  // 1. Staff register two carts
  let admin = CartAdminView::mount(api.clone(), points.clone()).await;
  for (code, point) in [("CART-001", Some("东门")), ("CART-002", None)] {
    let form = CreateCartForm { code: code.to_string(), return_point: point.map(str::to_string) };
    admin.submit_create(&form).await?;
  }
  for row in admin.rows() {
    info!("{} | {} | {}", row.code, row.badge.label, row.return_point);
  }

  // 2. Move the second cart to the library
  let transfer = TransferView::mount(api.clone(), points.clone()).await;
  let second = admin.rows()[1].id;
  transfer.select_cart(Some(second));
  transfer.select_destination(Some("图书馆"));
  transfer.transport().await?;
  info!("Transfer: {}", transfer.take_notice().map(|n| n.message).unwrap_or_default());

  // 3. A student borrows and returns it
  let borrow = UserBorrowView::mount(api.clone()).await;
  let mut form = UserBorrowForm { cart_code: "CART-002".into(), ..Default::default() };
  form.borrower.borrower_name = "张三".into();
  form.borrower.borrower_phone = "13800000000".into();
  form.borrower.borrower_destination = "友园16号楼".into();
  let next = borrow.submit(&form).await?;
  info!("Borrowed, navigating to {}", next.path());

  let ret = UserReturnView::mount(api.clone(), points).await;
  let next = ret.submit(&UserReturnForm { cart_code: "CART-002".into(), return_point: "南门".into() }).await?;
  info!("Returned, navigating to {}", next.path());

  // 4. The log viewer, filtered to that cart
  let logs = LogView::mount(api, Some("CART-002")).await;
  for row in logs.rows() {
    info!("{} {:?} {} -> {}", row.created_at, row.kind, row.from_point, row.to_point);
  }

  info!("--- Walkthrough Complete ---");
  Ok(())
}
