// tests/page_tests.rs
mod common;
use common::*;

use actix_web::http::header::LOCATION;
use actix_web::http::StatusCode;
use actix_web::{test, App};
use cartdesk::shell::ADMIN_TITLE;
use cartdesk::views::messages;
use cartdesk::{CartApi, CartStatus};
use cartdesk_app::config::AppConfig;
use cartdesk_app::state::AppState;
use cartdesk_app::web::configure_app;
use std::sync::Arc;

fn location_of<B>(resp: &actix_web::dev::ServiceResponse<B>) -> String {
  resp.headers().get(LOCATION).expect("redirect").to_str().unwrap().to_string()
}

#[actix_web::test]
async fn test_unknown_paths_redirect_to_cart_list() {
  setup_tracing();
  let (state, _) = mock_state();
  let app = test::init_service(App::new().configure(configure_app(state))).await;

  for path in ["/", "/nope", "/carts/1/2/3"] {
    let resp = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND, "{}", path);
    assert_eq!(location_of(&resp), "/carts");
  }
  let resp = test::call_service(&app, test::TestRequest::get().uri("/user/borrow/").to_request()).await;
  assert_eq!(location_of(&resp), "/user/borrow");
}

#[actix_web::test]
async fn test_header_hidden_on_end_user_pages() {
  setup_tracing();
  let (state, _) = mock_state();
  let app = test::init_service(App::new().configure(configure_app(state))).await;

  let body = test::call_and_read_body(&app, test::TestRequest::get().uri("/carts").to_request()).await;
  let body = String::from_utf8(body.to_vec()).unwrap();
  assert!(body.contains(ADMIN_TITLE));
  assert!(body.contains("http-equiv=\"refresh\" content=\"5;url=/carts?page=1\""));

  for path in ["/user", "/user/borrow", "/user/return", "/result/borrow", "/result/return"] {
    let body = test::call_and_read_body(&app, test::TestRequest::get().uri(path).to_request()).await;
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(!body.contains(ADMIN_TITLE), "{}", path);
  }
}

#[actix_web::test]
async fn test_admin_create_redirects_with_notice() {
  setup_tracing();
  let (state, backend) = mock_state();
  let app = test::init_service(App::new().configure(configure_app(state))).await;

  let req = test::TestRequest::post().uri("/carts/new").set_form([("code", "CART-001"), ("return_point", "")]).to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  let target = location_of(&resp);
  assert!(target.starts_with("/carts?notice="));

  let body = test::call_and_read_body(&app, test::TestRequest::get().uri(&target).to_request()).await;
  let body = String::from_utf8(body.to_vec()).unwrap();
  assert!(body.contains(messages::CREATE_OK));
  assert!(body.contains("CART-001"));
  assert_eq!(backend.list_carts().await.unwrap().len(), 1);

  // Blank code: re-rendered inline, nothing created.
  let req = test::TestRequest::post().uri("/carts/new").set_form([("code", "  ")]).to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
  assert!(body.contains(cartdesk::forms::MSG_CODE_REQUIRED));
  assert_eq!(backend.list_carts().await.unwrap().len(), 1);
}

#[actix_web::test]
async fn test_admin_borrow_conflict_stays_on_form() {
  setup_tracing();
  let (state, backend) = mock_state();
  let cart = seed_cart(&backend, "CART-002", None).await;
  let app = test::init_service(App::new().configure(configure_app(state))).await;
  let uri = format!("/carts/{}/borrow", cart.id);

  let resp = test::call_service(&app, test::TestRequest::post().uri(&uri).set_form(BORROWER).to_request()).await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);

  let resp = test::call_service(&app, test::TestRequest::post().uri(&uri).set_form(BORROWER).to_request()).await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
  assert!(body.contains(cartdesk::mock::MSG_ALREADY_BORROWED));
  assert!(body.contains("value=\"张三\""));
}

#[actix_web::test]
async fn test_delete_needs_the_confirming_post() {
  setup_tracing();
  let (state, backend) = mock_state();
  let cart = seed_cart(&backend, "DOOMED", None).await;
  let app = test::init_service(App::new().configure(configure_app(state))).await;
  let uri = format!("/carts/{}/delete", cart.id);

  let body = test::call_and_read_body(&app, test::TestRequest::get().uri(&uri).to_request()).await;
  assert!(String::from_utf8(body.to_vec()).unwrap().contains(messages::DELETE_CONFIRM));
  assert_eq!(backend.list_carts().await.unwrap().len(), 1);

  let resp = test::call_service(&app, test::TestRequest::post().uri(&uri).to_request()).await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  assert!(backend.list_carts().await.unwrap().is_empty());

  // Gone now: the prompt page bounces back with an error.
  let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
  assert!(location_of(&resp).starts_with("/carts?error="));
}

#[actix_web::test]
async fn test_transfer_moves_cart_and_reports_sentence() {
  setup_tracing();
  let (state, backend) = mock_state();
  let cart = seed_cart(&backend, "07", Some("东门")).await;
  let app = test::init_service(App::new().configure(configure_app(state))).await;

  let query = format!("/transfer?cart_id={}&destination=%E5%9B%BE%E4%B9%A6%E9%A6%86", cart.id);
  let body = test::call_and_read_body(&app, test::TestRequest::get().uri(&query).to_request()).await;
  let body = String::from_utf8(body.to_vec()).unwrap();
  assert!(body.contains("将07号小推车由东门运送至图书馆"));
  assert!(!body.contains("disabled>运送"));

  let id = cart.id.to_string();
  let req = test::TestRequest::post().uri("/transfer").set_form([("cart_id", id.as_str()), ("destination", "图书馆")]).to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  assert!(location_of(&resp).contains("notice="));

  let moved = backend.list_carts().await.unwrap().remove(0);
  assert_eq!(moved.return_point.as_deref(), Some("图书馆"));
  assert_eq!(moved.status(), CartStatus::Available);
}

#[actix_web::test]
async fn test_log_page_filters_exactly() {
  setup_tracing();
  let (state, backend) = mock_state();
  let a = seed_cart(&backend, "A1", None).await;
  let b = seed_cart(&backend, "B2", None).await;
  backend.transfer_cart(a.id, "西门").await.unwrap();
  backend.transfer_cart(b.id, "北门").await.unwrap();
  let app = test::init_service(App::new().configure(configure_app(state))).await;

  let body = test::call_and_read_body(&app, test::TestRequest::get().uri("/logs?cart_code=A1").to_request()).await;
  let body = String::from_utf8(body.to_vec()).unwrap();
  assert!(body.contains("西门"));
  assert!(!body.contains("北门"));
  assert!(body.contains("value=\"A1\""));
  assert!(body.contains("setInterval"));
}

#[actix_web::test]
async fn test_user_borrow_and_return_flow() {
  setup_tracing();
  let (state, backend) = mock_state();
  seed_cart(&backend, "A1", None).await;
  let app = test::init_service(App::new().configure(configure_app(state))).await;

  let mut form: Vec<(&str, &str)> = vec![("cart_code", " A1 ")];
  form.extend(BORROWER);
  let resp = test::call_service(&app, test::TestRequest::post().uri("/user/borrow").set_form(&form).to_request()).await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  assert_eq!(location_of(&resp), "/result/borrow");

  let body = test::call_and_read_body(&app, test::TestRequest::get().uri("/result/borrow").to_request()).await;
  assert!(String::from_utf8(body.to_vec()).unwrap().contains("借用成功，请及时归还"));

  // Second borrow of the same cart.
  let resp = test::call_service(&app, test::TestRequest::post().uri("/user/borrow").set_form(&form).to_request()).await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
  assert!(body.contains(messages::ALREADY_BORROWED));

  let ret = [("cart_code", "A1"), ("return_point", "南门")];
  let resp = test::call_service(&app, test::TestRequest::post().uri("/user/return").set_form(ret).to_request()).await;
  assert_eq!(location_of(&resp), "/result/return");

  let resp = test::call_service(&app, test::TestRequest::post().uri("/user/return").set_form(ret).to_request()).await;
  let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
  assert!(body.contains(messages::NOT_BORROWED));
  assert_eq!(backend.log_count(), 2);
}

#[actix_web::test]
async fn test_user_borrow_rejects_bad_phone_and_unknown_code() {
  setup_tracing();
  let (state, backend) = mock_state();
  seed_cart(&backend, "A1", None).await;
  let app = test::init_service(App::new().configure(configure_app(state))).await;

  let form = [
    ("cart_code", "A1"),
    ("borrower_name", "张三"),
    ("borrower_phone", "12345"),
    ("borrower_destination", "图书馆"),
  ];
  let resp = test::call_service(&app, test::TestRequest::post().uri("/user/borrow").set_form(form).to_request()).await;
  let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
  assert!(body.contains(cartdesk::forms::MSG_PHONE_INVALID));

  let form = [
    ("cart_code", "ZZ"),
    ("borrower_name", "张三"),
    ("borrower_phone", "13800000000"),
    ("borrower_destination", "图书馆"),
  ];
  let resp = test::call_service(&app, test::TestRequest::post().uri("/user/borrow").set_form(form).to_request()).await;
  let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
  assert!(body.contains(messages::CART_NOT_FOUND));
  assert_eq!(backend.log_count(), 0);
}

#[actix_web::test]
async fn test_mock_api_speaks_the_error_contract() {
  setup_tracing();
  let (state, backend) = mock_state();
  seed_cart(&backend, "A1", None).await;
  let app = test::init_service(App::new().configure(configure_app(state))).await;

  let req = test::TestRequest::post().uri("/api/carts").set_json(serde_json::json!({"code": "A1"})).to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  let body: serde_json::Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], cartdesk::mock::MSG_CODE_TAKEN);

  let req = test::TestRequest::post()
    .uri("/api/carts")
    .insert_header(("content-type", "application/json"))
    .set_payload("{not json")
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: serde_json::Value = test::read_body_json(resp).await;
  assert!(body["error"].is_string());
}

#[actix_web::test]
async fn test_api_scope_absent_without_mock() {
  setup_tracing();
  let config = Arc::new(AppConfig::default());
  let api = Arc::new(cartdesk::InMemoryBackend::new());
  let state = AppState { api, config, mock_backend: None };
  let app = test::init_service(App::new().configure(configure_app(state))).await;

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/carts").to_request()).await;
  assert_eq!(resp.status(), StatusCode::FOUND);
}

#[actix_web::test]
async fn test_self_service_reports_load_failure_instead_of_unknown_code() {
  setup_tracing();
  let (state, backend) = mock_state();
  seed_cart(&backend, "A1", None).await;
  backend.set_unavailable(true);
  let app = test::init_service(App::new().configure(configure_app(state))).await;

  let mut form: Vec<(&str, &str)> = vec![("cart_code", "A1")];
  form.extend(BORROWER);
  let resp = test::call_service(&app, test::TestRequest::post().uri("/user/borrow").set_form(&form).to_request()).await;
  assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
  let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
  assert!(body.contains(messages::LOAD_FAILED));
  assert!(!body.contains(messages::CART_NOT_FOUND));

  let ret = [("cart_code", "A1"), ("return_point", "南门")];
  let resp = test::call_service(&app, test::TestRequest::post().uri("/user/return").set_form(ret).to_request()).await;
  assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
  let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
  assert!(body.contains(messages::LOAD_FAILED));
  assert!(!body.contains(messages::CART_NOT_FOUND));
}

#[actix_web::test]
async fn test_log_page_reload_stays_on_current_page() {
  setup_tracing();
  let (state, backend) = mock_state();
  let cart = seed_cart(&backend, "A1", None).await;
  // 21 entries: two pages of 20.
  for i in 0..21 {
    let point = if i % 2 == 0 { "西门" } else { "北门" };
    backend.transfer_cart(cart.id, point).await.unwrap();
  }
  let app = test::init_service(App::new().configure(configure_app(state))).await;

  let body = test::call_and_read_body(&app, test::TestRequest::get().uri("/logs?cart_code=A1&page=2").to_request()).await;
  let body = String::from_utf8(body.to_vec()).unwrap();
  assert!(body.contains("q.set('page','2')"));
  assert!(body.contains("<strong>2</strong>"));
}
