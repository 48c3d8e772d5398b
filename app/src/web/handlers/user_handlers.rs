// cartdesk/app/src/web/handlers/user_handlers.rs

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use cartdesk::forms::{BorrowForm, FieldErrors};
use cartdesk::views::{ResultPage, UserBorrowForm, UserReturnForm};
use cartdesk::{ActionError, Notice, Route, UserBorrowView, UserReturnView};
use serde::Deserialize;
use tracing::{info, instrument};

use super::form_page;
use crate::state::AppState;
use crate::web::render::{escape, html, redirect_with, select_input, text_input, Shell};

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct UserBorrowPayload {
  pub cart_code: String,
  pub borrower_name: String,
  pub borrower_phone: String,
  pub borrower_destination: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct UserReturnPayload {
  pub cart_code: String,
  pub return_point: String,
}

impl From<UserBorrowPayload> for UserBorrowForm {
  fn from(p: UserBorrowPayload) -> Self {
    UserBorrowForm {
      cart_code: p.cart_code,
      borrower: BorrowForm {
        borrower_name: p.borrower_name,
        borrower_phone: p.borrower_phone,
        borrower_destination: p.borrower_destination,
      },
    }
  }
}

pub async fn user_home_handler() -> HttpResponse {
  let body = format!(
    "<h2>{}</h2><p><a href=\"{}\">我要借用</a></p><p><a href=\"{}\">我要归还</a></p>",
    Route::UserHome.title(),
    Route::UserBorrow.path(),
    Route::UserReturn.path(),
  );
  let shell = Shell { path: Route::UserHome.path(), title: Route::UserHome.title(), ..Default::default() };
  html(StatusCode::OK, shell.render(&body))
}

// --- Borrow ---

fn borrow_fields(form: &UserBorrowForm, errors: Option<&FieldErrors>) -> String {
  let mut fields = text_input("小推车编号", "cart_code", &form.cart_code, errors);
  fields.push_str(&text_input("姓名", "borrower_name", &form.borrower.borrower_name, errors));
  fields.push_str(&text_input("手机号", "borrower_phone", &form.borrower.borrower_phone, errors));
  fields.push_str(&text_input("去往地点", "borrower_destination", &form.borrower.borrower_destination, errors));
  fields
}

fn borrow_page(form: &UserBorrowForm, errors: Option<&FieldErrors>, notice: Option<Notice>, status: StatusCode) -> HttpResponse {
  let route = Route::UserBorrow;
  form_page(route.path(), route.title(), route.path(), Route::UserHome.path(), &borrow_fields(form, errors), notice, status)
}

pub async fn user_borrow_form_handler(app_state: web::Data<AppState>) -> HttpResponse {
  let view = UserBorrowView::mount(app_state.api.clone()).await;
  borrow_page(&view.draft(), None, view.take_notice(), StatusCode::OK)
}

#[instrument(name = "handler::user_borrow", skip(app_state, payload), fields(cart_code = %payload.cart_code))]
pub async fn user_borrow_handler(app_state: web::Data<AppState>, payload: web::Form<UserBorrowPayload>) -> HttpResponse {
  let form: UserBorrowForm = payload.into_inner().into();
  let view = UserBorrowView::mount(app_state.api.clone()).await;
  // Without the list every code would read as unknown; report the load failure instead.
  if let Some(notice) = view.take_notice() {
    return borrow_page(&form, None, Some(notice), StatusCode::SERVICE_UNAVAILABLE);
  }
  match view.submit(&form).await {
    Ok(next) => {
      info!("Self-service borrow completed.");
      redirect_with(next.path(), &[], None)
    }
    Err(ActionError::Invalid(errors)) => borrow_page(&form, Some(&errors), None, StatusCode::UNPROCESSABLE_ENTITY),
    Err(ActionError::Rejected(message)) => {
      borrow_page(&form, None, Some(Notice::error(message)), StatusCode::UNPROCESSABLE_ENTITY)
    }
  }
}

// --- Return ---

fn return_page(
  view: &UserReturnView,
  form: &UserReturnForm,
  errors: Option<&FieldErrors>,
  notice: Option<Notice>,
  status: StatusCode,
) -> HttpResponse {
  let route = Route::UserReturn;
  let mut fields = text_input("小推车编号", "cart_code", &form.cart_code, errors);
  fields.push_str(&select_input(
    "归还点",
    "return_point",
    view.return_points().iter().map(|p| (p, p)),
    Some(form.return_point.as_str()),
    errors,
  ));
  form_page(route.path(), route.title(), route.path(), Route::UserHome.path(), &fields, notice, status)
}

pub async fn user_return_form_handler(app_state: web::Data<AppState>) -> HttpResponse {
  let view = UserReturnView::mount(app_state.api.clone(), app_state.config.return_points.clone()).await;
  return_page(&view, &view.draft(), None, view.take_notice(), StatusCode::OK)
}

#[instrument(name = "handler::user_return", skip(app_state, payload), fields(cart_code = %payload.cart_code))]
pub async fn user_return_handler(app_state: web::Data<AppState>, payload: web::Form<UserReturnPayload>) -> HttpResponse {
  let payload = payload.into_inner();
  let form = UserReturnForm { cart_code: payload.cart_code, return_point: payload.return_point };
  let view = UserReturnView::mount(app_state.api.clone(), app_state.config.return_points.clone()).await;
  if let Some(notice) = view.take_notice() {
    return return_page(&view, &form, None, Some(notice), StatusCode::SERVICE_UNAVAILABLE);
  }
  match view.submit(&form).await {
    Ok(next) => {
      info!("Self-service return completed.");
      redirect_with(next.path(), &[], None)
    }
    Err(ActionError::Invalid(errors)) => return_page(&view, &form, Some(&errors), None, StatusCode::UNPROCESSABLE_ENTITY),
    Err(ActionError::Rejected(message)) => {
      return_page(&view, &form, None, Some(Notice::error(message)), StatusCode::UNPROCESSABLE_ENTITY)
    }
  }
}

// --- Result pages ---

fn result_page(route: Route, page: ResultPage) -> HttpResponse {
  let body = format!(
    "<h2 class=\"result\">{}</h2><p><a href=\"{}\">{}</a></p>",
    escape(page.title),
    page.back.path(),
    page.back_label
  );
  let shell = Shell { path: route.path(), title: route.title(), ..Default::default() };
  html(StatusCode::OK, shell.render(&body))
}

pub async fn borrow_result_handler() -> HttpResponse {
  result_page(Route::BorrowResult, ResultPage::BORROWED)
}

pub async fn return_result_handler() -> HttpResponse {
  result_page(Route::ReturnResult, ResultPage::RETURNED)
}
