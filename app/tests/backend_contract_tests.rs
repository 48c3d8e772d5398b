// tests/backend_contract_tests.rs
//! `HttpCartApi` against the in-memory `/api` served over a real socket.
mod common;
use common::*;

use actix_web::{web, App, HttpResponse, HttpServer};
use cartdesk::models::{BorrowCartRequest, CreateCartRequest, ReturnCartRequest, UpdateCartRequest};
use cartdesk::views::{failure_message, messages};
use cartdesk::{CartAdminView, CartApi, CartStatus, HttpCartApi, ReturnPoints};
use cartdesk_app::web::configure_app;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

async fn start_server() -> (HttpCartApi, actix_web::dev::ServerHandle) {
  let (state, _) = mock_state();
  let server = HttpServer::new(move || App::new().configure(configure_app(state.clone())))
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("binding test server");
  let addr = server.addrs()[0];
  let server = server.run();
  let handle = server.handle();
  actix_web::rt::spawn(server);
  let api = HttpCartApi::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
  (api, handle)
}

#[actix_web::test]
async fn test_client_round_trip_over_http() {
  setup_tracing();
  let (api, handle) = start_server().await;

  let cart = api
    .create_cart(&CreateCartRequest { code: "A1".into(), return_point: Some("东门".into()) })
    .await
    .unwrap();
  assert_eq!(cart.status(), CartStatus::Available);

  let dup = api.create_cart(&CreateCartRequest { code: "A1".into(), return_point: None }).await.unwrap_err();
  assert!(dup.is_conflict());
  assert_eq!(dup.backend_message(), Some(cartdesk::mock::MSG_CODE_TAKEN));

  let borrow = BorrowCartRequest {
    borrower_name: "张三".into(),
    borrower_phone: "13800000000".into(),
    borrower_destination: "友园16号楼".into(),
  };
  let borrowed = api.borrow_cart(cart.id, &borrow).await.unwrap();
  assert_eq!(borrowed.borrower().map(|b| b.name.as_str()), Some("张三"));

  let update = UpdateCartRequest {
    status: Some(CartStatus::Available),
    borrower_name: Some(None),
    borrower_phone: Some(None),
    borrower_destination: Some(None),
    ..Default::default()
  };
  let cleared = api.update_cart(cart.id, &update).await.unwrap();
  assert!(cleared.borrower().is_none());

  let err = api.return_cart(cart.id, &ReturnCartRequest { return_point: "南门".into() }).await.unwrap_err();
  assert!(err.is_not_borrowed_conflict());

  assert_eq!(api.list_logs(Some("A1")).await.unwrap().len(), 1);
  assert!(api.list_logs(Some("B2")).await.unwrap().is_empty());

  api.delete_cart(cart.id).await.unwrap();
  assert!(api.list_carts().await.unwrap().is_empty());
  let missing = api.delete_cart(cart.id).await.unwrap_err();
  assert_eq!(missing.status(), Some(404));

  tokio::time::timeout(Duration::from_secs(5), handle.stop(true)).await.expect("server stops");
}

#[actix_web::test]
async fn test_unreachable_backend_maps_to_network_message() {
  setup_tracing();
  let (api, handle) = start_server().await;
  let base = api.base_url().clone();
  tokio::time::timeout(Duration::from_secs(5), handle.stop(true)).await.expect("server stops");

  let api = HttpCartApi::new(base.as_str(), Duration::from_secs(2)).unwrap();
  let err = api.list_carts().await.unwrap_err();
  assert_eq!(err.status(), None);
  assert_eq!(failure_message(&err, messages::LOAD_FAILED), messages::NETWORK_FAILED);
}

async fn mixed_cart_list() -> HttpResponse {
  let stamp = "2024-03-01 08:30:00";
  HttpResponse::Ok().json(json!([
    {"id": 1, "code": "A1", "status": "available", "return_point": "东门", "created_at": stamp, "updated_at": stamp},
    // Borrowed without phone or destination, as left by a careless edit.
    {"id": 2, "code": "B2", "status": "borrowed", "borrower_name": "x", "created_at": stamp, "updated_at": stamp}
  ]))
}

#[actix_web::test]
async fn test_one_broken_cart_does_not_blank_the_table() {
  setup_tracing();
  let server = HttpServer::new(|| App::new().route("/api/carts", web::get().to(mixed_cart_list)))
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("binding test server");
  let addr = server.addrs()[0];
  let server = server.run();
  let handle = server.handle();
  actix_web::rt::spawn(server);

  let api = HttpCartApi::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
  let carts = api.list_carts().await.unwrap();
  assert_eq!(carts.len(), 1);
  assert_eq!(carts[0].code, "A1");

  let view = CartAdminView::mount(Arc::new(api), ReturnPoints::default()).await;
  assert!(view.take_notice().is_none());
  let codes: Vec<String> = view.rows().into_iter().map(|r| r.code).collect();
  assert_eq!(codes, vec!["A1".to_string()]);

  tokio::time::timeout(Duration::from_secs(5), handle.stop(true)).await.expect("server stops");
}
