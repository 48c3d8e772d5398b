// cartdesk/app/src/web/handlers/backend_handlers.rs

//! The backend's JSON contract, answered by the in-memory store. Only mounted
//! when `MOCK_BACKEND` is set.

use actix_web::{web, HttpResponse};
use cartdesk::models::{BorrowCartRequest, CreateCartRequest, ReturnCartRequest, TransferCartRequest, UpdateCartRequest};
use cartdesk::{CartApi, InMemoryBackend};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::errors::AppError;
use crate::state::AppState;

fn backend(app_state: &AppState) -> Result<Arc<InMemoryBackend>, AppError> {
  app_state
    .mock_backend
    .clone()
    .ok_or_else(|| AppError::NotFound("The in-memory backend is not enabled.".to_string()))
}

#[derive(Deserialize, Debug, Default)]
pub struct LogsQuery {
  #[serde(default)]
  pub cart_code: Option<String>,
}

#[instrument(name = "backend::list_carts", skip(app_state))]
pub async fn list_carts(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let carts = backend(&app_state)?.list_carts().await?;
  Ok(HttpResponse::Ok().json(carts))
}

#[instrument(name = "backend::create_cart", skip(app_state, body), fields(code = %body.code))]
pub async fn create_cart(
  app_state: web::Data<AppState>,
  body: web::Json<CreateCartRequest>,
) -> Result<HttpResponse, AppError> {
  let cart = backend(&app_state)?.create_cart(&body).await?;
  Ok(HttpResponse::Created().json(cart))
}

#[instrument(name = "backend::update_cart", skip(app_state, body))]
pub async fn update_cart(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  body: web::Json<UpdateCartRequest>,
) -> Result<HttpResponse, AppError> {
  let cart = backend(&app_state)?.update_cart(path.into_inner(), &body).await?;
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(name = "backend::delete_cart", skip(app_state))]
pub async fn delete_cart(app_state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
  backend(&app_state)?.delete_cart(path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(name = "backend::borrow_cart", skip(app_state, body))]
pub async fn borrow_cart(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  body: web::Json<BorrowCartRequest>,
) -> Result<HttpResponse, AppError> {
  let cart = backend(&app_state)?.borrow_cart(path.into_inner(), &body).await?;
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(name = "backend::return_cart", skip(app_state, body))]
pub async fn return_cart(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  body: web::Json<ReturnCartRequest>,
) -> Result<HttpResponse, AppError> {
  let cart = backend(&app_state)?.return_cart(path.into_inner(), &body).await?;
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(name = "backend::transfer_cart", skip(app_state, body), fields(to = %body.to_return_point))]
pub async fn transfer_cart(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  body: web::Json<TransferCartRequest>,
) -> Result<HttpResponse, AppError> {
  let cart = backend(&app_state)?.transfer_cart(path.into_inner(), &body.to_return_point).await?;
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(name = "backend::list_logs", skip(app_state))]
pub async fn list_logs(
  app_state: web::Data<AppState>,
  query: web::Query<LogsQuery>,
) -> Result<HttpResponse, AppError> {
  let logs = backend(&app_state)?.list_logs(query.cart_code.as_deref()).await?;
  debug!(count = logs.len(), "Serving action log.");
  Ok(HttpResponse::Ok().json(logs))
}
