// cartdesk/app/src/web/routes.rs

use actix_web::http::header::LOCATION;
use actix_web::{web, HttpRequest, HttpResponse};
use cartdesk::{Resolution, Route};
use serde_json::json;

use super::handlers::{admin_handlers, backend_handlers, log_handlers, transfer_handlers, user_handlers};
use crate::errors::AppError;
use crate::state::AppState;

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Anything unmatched lands here. Known pages reached with a trailing slash go
/// to their canonical path; everything else goes to the cart list.
async fn fallback_handler(req: HttpRequest) -> HttpResponse {
  let target = match Route::resolve(req.path()) {
    Resolution::Page(route) | Resolution::Redirect(route) => route,
  };
  tracing::debug!(path = req.path(), target = target.path(), "Redirecting unmatched path.");
  HttpResponse::Found().insert_header((LOCATION, target.path())).finish()
}

/// Pages, form endpoints and, when enabled, the in-memory `/api`.
pub fn configure_app(app_state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
  move |cfg: &mut web::ServiceConfig| {
    let with_mock = app_state.mock_backend.is_some();
    cfg
      .app_data(web::Data::new(app_state))
      .route("/health", web::get().to(health_check_handler))
      // Admin: cart table and its modal workflows
      .route("/carts", web::get().to(admin_handlers::list_carts_handler))
      .service(
        web::scope("/carts")
          .route("/new", web::get().to(admin_handlers::new_cart_handler))
          .route("/new", web::post().to(admin_handlers::create_cart_handler))
          .route("/{cart_id}/borrow", web::get().to(admin_handlers::borrow_form_handler))
          .route("/{cart_id}/borrow", web::post().to(admin_handlers::borrow_cart_handler))
          .route("/{cart_id}/return", web::get().to(admin_handlers::return_form_handler))
          .route("/{cart_id}/return", web::post().to(admin_handlers::return_cart_handler))
          .route("/{cart_id}/edit", web::get().to(admin_handlers::edit_form_handler))
          .route("/{cart_id}/edit", web::post().to(admin_handlers::edit_cart_handler))
          .route("/{cart_id}/delete", web::get().to(admin_handlers::delete_prompt_handler))
          .route("/{cart_id}/delete", web::post().to(admin_handlers::delete_cart_handler)),
      )
      // Admin: transfer tool and log viewer
      .route("/transfer", web::get().to(transfer_handlers::transfer_page_handler))
      .route("/transfer", web::post().to(transfer_handlers::transport_handler))
      .route("/logs", web::get().to(log_handlers::list_logs_handler))
      // End-user pages
      .route("/user", web::get().to(user_handlers::user_home_handler))
      .route("/user/borrow", web::get().to(user_handlers::user_borrow_form_handler))
      .route("/user/borrow", web::post().to(user_handlers::user_borrow_handler))
      .route("/user/return", web::get().to(user_handlers::user_return_form_handler))
      .route("/user/return", web::post().to(user_handlers::user_return_handler))
      .route("/result/borrow", web::get().to(user_handlers::borrow_result_handler))
      .route("/result/return", web::get().to(user_handlers::return_result_handler));

    if with_mock {
      cfg.service(
        web::scope("/api")
          .app_data(
            web::JsonConfig::default()
              .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
          )
          .route("/carts", web::get().to(backend_handlers::list_carts))
          .route("/carts", web::post().to(backend_handlers::create_cart))
          .route("/carts/{cart_id}", web::put().to(backend_handlers::update_cart))
          .route("/carts/{cart_id}", web::delete().to(backend_handlers::delete_cart))
          .route("/carts/{cart_id}/borrow", web::post().to(backend_handlers::borrow_cart))
          .route("/carts/{cart_id}/return", web::post().to(backend_handlers::return_cart))
          .route("/carts/{cart_id}/transfer", web::post().to(backend_handlers::transfer_cart))
          .route("/logs", web::get().to(backend_handlers::list_logs)),
      );
    }

    cfg.default_service(web::route().to(fallback_handler));
  }
}
