// cartdesk/app/src/web/handlers/admin_handlers.rs

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use cartdesk::forms::{BorrowForm, CreateCartForm, EditCartForm, FieldErrors, ReturnForm};
use cartdesk::views::admin::CartRow;
use cartdesk::views::{messages, AdminModal};
use cartdesk::{ActionError, CartAdminView, Notice, Route};
use serde::Deserialize;
use std::fmt::Write;
use tracing::{info, instrument, warn};

use super::{form_page, non_blank};
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::render::{escape, html, location, pager, redirect_with, select_input, text_input, Flash, Shell};

const CARTS: &str = "/carts";

// --- Request DTOs ---

#[derive(Deserialize, Debug, Default)]
pub struct ListQuery {
  #[serde(default)]
  pub page: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CreateCartPayload {
  pub code: String,
  pub return_point: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct BorrowPayload {
  pub borrower_name: String,
  pub borrower_phone: String,
  pub borrower_destination: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ReturnPayload {
  pub return_point: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct EditPayload {
  pub code: String,
  pub status: String,
  pub borrower_name: String,
  pub borrower_phone: String,
  pub borrower_destination: String,
  pub return_point: String,
}

impl From<BorrowPayload> for BorrowForm {
  fn from(p: BorrowPayload) -> Self {
    BorrowForm {
      borrower_name: p.borrower_name,
      borrower_phone: p.borrower_phone,
      borrower_destination: p.borrower_destination,
    }
  }
}

impl From<EditPayload> for EditCartForm {
  fn from(p: EditPayload) -> Self {
    EditCartForm {
      code: p.code,
      status: p.status,
      borrower_name: p.borrower_name,
      borrower_phone: p.borrower_phone,
      borrower_destination: p.borrower_destination,
      return_point: non_blank(&p.return_point).map(str::to_string),
    }
  }
}

fn admin_view(app_state: &AppState) -> CartAdminView {
  CartAdminView::new(app_state.api.clone(), app_state.config.return_points.clone())
}

fn point_options(view: &CartAdminView) -> Vec<(&str, &str)> {
  view.return_points().iter().map(|p| (p, p)).collect()
}

// --- Table ---

fn render_row(out: &mut String, row: &CartRow) {
  let _ = write!(
    out,
    "<tr><td>{code}</td><td><span class=\"tag {color}\">{label}</span></td><td>{name}</td><td>{phone}</td>\
     <td>{dest}</td><td>{point}</td><td><a href=\"/carts/{id}/{act}\">{act_label}</a> \
     <a href=\"/carts/{id}/edit\">编辑</a> <a href=\"/carts/{id}/delete\">删除</a></td></tr>",
    code = escape(&row.code),
    color = row.badge.color,
    label = row.badge.label,
    name = escape(&row.borrower_name),
    phone = escape(&row.borrower_phone),
    dest = escape(&row.borrower_destination),
    point = escape(&row.return_point),
    id = row.id,
    act = match row.action {
      cartdesk::views::RowAction::Borrow => "borrow",
      cartdesk::views::RowAction::Return => "return",
    },
    act_label = row.action.label(),
  );
}

#[instrument(name = "handler::list_carts", skip(app_state, query, flash))]
pub async fn list_carts_handler(
  app_state: web::Data<AppState>,
  query: web::Query<ListQuery>,
  flash: Flash,
) -> Result<HttpResponse, AppError> {
  let view = CartAdminView::mount(app_state.api.clone(), app_state.config.return_points.clone()).await;
  // A failed load outranks whatever the previous page handed over.
  let notice = view.take_notice().or(flash.0);
  let page = view.page(query.page.unwrap_or(1));

  let mut body = String::from(
    "<h2>小推车列表</h2><p><a href=\"/carts/new\">新增小推车</a> <a href=\"/carts\">刷新</a></p>\
     <table><thead><tr><th>编号</th><th>状态</th><th>借用人</th><th>电话</th><th>去往地点</th>\
     <th>归还点</th><th>操作</th></tr></thead><tbody>",
  );
  for row in &page.items {
    render_row(&mut body, row);
  }
  body.push_str("</tbody></table>");
  body.push_str(&pager(CARTS, &page, &[]));

  let page_str = page.number.to_string();
  let shell = Shell {
    path: Route::Carts.path(),
    title: Route::Carts.title(),
    notice,
    refresh: Some((app_state.config.poll_interval.as_secs(), location(CARTS, &[("page", page_str.as_str())]))),
    script: None,
  };
  Ok(html(StatusCode::OK, shell.render(&body)))
}

// --- Create ---

fn create_fields(view: &CartAdminView, form: &CreateCartForm, errors: Option<&FieldErrors>) -> String {
  let mut fields = text_input("编号", "code", &form.code, errors);
  fields.push_str(&select_input("归还点", "return_point", point_options(view), form.return_point.as_deref(), errors));
  fields
}

pub async fn new_cart_handler(app_state: web::Data<AppState>) -> HttpResponse {
  let view = admin_view(&app_state);
  let fields = create_fields(&view, &CreateCartForm::default(), None);
  form_page(CARTS, "新增小推车", "/carts/new", CARTS, &fields, None, StatusCode::OK)
}

#[instrument(name = "handler::create_cart", skip(app_state, payload), fields(code = %payload.code))]
pub async fn create_cart_handler(
  app_state: web::Data<AppState>,
  payload: web::Form<CreateCartPayload>,
) -> HttpResponse {
  let payload = payload.into_inner();
  let form = CreateCartForm { return_point: non_blank(&payload.return_point).map(str::to_string), code: payload.code };
  let view = admin_view(&app_state);
  view.open(AdminModal::Create);

  match view.submit_create(&form).await {
    Ok(cart) => {
      info!(cart_id = cart.id, "Cart created from admin page.");
      redirect_with(CARTS, &[], view.take_notice().as_ref())
    }
    Err(e) => {
      let fields = create_fields(&view, &form, e.field_errors());
      form_page(CARTS, "新增小推车", "/carts/new", CARTS, &fields, rejection(&view, &e), StatusCode::UNPROCESSABLE_ENTITY)
    }
  }
}

/// Backend refusals come back as a notice; field errors stay inline.
fn rejection(view: &CartAdminView, err: &ActionError) -> Option<Notice> {
  match err {
    ActionError::Invalid(_) => None,
    ActionError::Rejected(_) => view.take_notice(),
  }
}

/// Mounts the table and looks up `id`, or redirects back with an error.
async fn mounted_with(app_state: &AppState, id: i64) -> Result<CartAdminView, HttpResponse> {
  let view = admin_view(app_state);
  view.refresh().await;
  if let Some(notice) = view.take_notice() {
    return Err(redirect_with(CARTS, &[], Some(&notice)));
  }
  if view.cart(id).is_none() {
    warn!(cart_id = id, "Cart not in the current list.");
    return Err(redirect_with(CARTS, &[], Some(&Notice::error(messages::NO_SUCH_CART))));
  }
  Ok(view)
}

// --- Borrow ---

fn borrow_fields(form: &BorrowForm, errors: Option<&FieldErrors>) -> String {
  let mut fields = text_input("借用人", "borrower_name", &form.borrower_name, errors);
  fields.push_str(&text_input("电话", "borrower_phone", &form.borrower_phone, errors));
  fields.push_str(&text_input("去往地点", "borrower_destination", &form.borrower_destination, errors));
  fields
}

fn action_title(verb: &str, code: Option<&str>) -> String {
  match code {
    Some(code) => format!("{}小推车 {}", verb, code),
    None => format!("{}小推车", verb),
  }
}

pub async fn borrow_form_handler(app_state: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
  let id = path.into_inner();
  let view = match mounted_with(&app_state, id).await {
    Ok(view) => view,
    Err(redirect) => return redirect,
  };
  let code = view.cart(id).map(|c| c.code);
  let action = format!("/carts/{}/borrow", id);
  let fields = borrow_fields(&BorrowForm::default(), None);
  form_page(CARTS, &action_title("借用", code.as_deref()), &action, CARTS, &fields, None, StatusCode::OK)
}

#[instrument(name = "handler::borrow_cart", skip(app_state, payload))]
pub async fn borrow_cart_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  payload: web::Form<BorrowPayload>,
) -> HttpResponse {
  let id = path.into_inner();
  let form: BorrowForm = payload.into_inner().into();
  let view = admin_view(&app_state);
  view.open(AdminModal::Borrow(id));

  match view.submit_borrow(id, &form).await {
    Ok(_) => redirect_with(CARTS, &[], view.take_notice().as_ref()),
    Err(e) => {
      let action = format!("/carts/{}/borrow", id);
      let fields = borrow_fields(&form, e.field_errors());
      let title = action_title("借用", None);
      form_page(CARTS, &title, &action, CARTS, &fields, rejection(&view, &e), StatusCode::UNPROCESSABLE_ENTITY)
    }
  }
}

// --- Return ---

fn return_fields(view: &CartAdminView, form: &ReturnForm, errors: Option<&FieldErrors>) -> String {
  select_input("归还点", "return_point", point_options(view), non_blank(&form.return_point), errors)
}

pub async fn return_form_handler(app_state: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
  let id = path.into_inner();
  let view = match mounted_with(&app_state, id).await {
    Ok(view) => view,
    Err(redirect) => return redirect,
  };
  let code = view.cart(id).map(|c| c.code);
  let action = format!("/carts/{}/return", id);
  let fields = return_fields(&view, &ReturnForm::default(), None);
  form_page(CARTS, &action_title("归还", code.as_deref()), &action, CARTS, &fields, None, StatusCode::OK)
}

#[instrument(name = "handler::return_cart", skip(app_state, payload))]
pub async fn return_cart_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  payload: web::Form<ReturnPayload>,
) -> HttpResponse {
  let id = path.into_inner();
  let form = ReturnForm { return_point: payload.into_inner().return_point };
  let view = admin_view(&app_state);
  view.open(AdminModal::Return(id));

  match view.submit_return(id, &form).await {
    Ok(_) => redirect_with(CARTS, &[], view.take_notice().as_ref()),
    Err(e) => {
      let action = format!("/carts/{}/return", id);
      let fields = return_fields(&view, &form, e.field_errors());
      let title = action_title("归还", None);
      form_page(CARTS, &title, &action, CARTS, &fields, rejection(&view, &e), StatusCode::UNPROCESSABLE_ENTITY)
    }
  }
}

// --- Edit ---

fn edit_fields(view: &CartAdminView, form: &EditCartForm, errors: Option<&FieldErrors>) -> String {
  let mut fields = text_input("编号", "code", &form.code, errors);
  fields.push_str(&select_input(
    "状态",
    "status",
    [("available", "可用"), ("borrowed", "借用中")],
    non_blank(&form.status),
    errors,
  ));
  fields.push_str(&borrow_fields(
    &BorrowForm {
      borrower_name: form.borrower_name.clone(),
      borrower_phone: form.borrower_phone.clone(),
      borrower_destination: form.borrower_destination.clone(),
    },
    errors,
  ));
  fields.push_str(&select_input("归还点", "return_point", point_options(view), form.return_point.as_deref(), errors));
  fields
}

pub async fn edit_form_handler(app_state: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
  let id = path.into_inner();
  let view = match mounted_with(&app_state, id).await {
    Ok(view) => view,
    Err(redirect) => return redirect,
  };
  let Some(form) = view.edit_form(id) else {
    return redirect_with(CARTS, &[], Some(&Notice::error(messages::NO_SUCH_CART)));
  };
  let action = format!("/carts/{}/edit", id);
  let fields = edit_fields(&view, &form, None);
  form_page(CARTS, "编辑小推车", &action, CARTS, &fields, None, StatusCode::OK)
}

#[instrument(name = "handler::edit_cart", skip(app_state, payload))]
pub async fn edit_cart_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  payload: web::Form<EditPayload>,
) -> HttpResponse {
  let id = path.into_inner();
  let form: EditCartForm = payload.into_inner().into();
  let view = admin_view(&app_state);
  view.open(AdminModal::Edit(id));

  match view.submit_edit(id, &form).await {
    Ok(_) => redirect_with(CARTS, &[], view.take_notice().as_ref()),
    Err(e) => {
      let action = format!("/carts/{}/edit", id);
      let fields = edit_fields(&view, &form, e.field_errors());
      form_page(CARTS, "编辑小推车", &action, CARTS, &fields, rejection(&view, &e), StatusCode::UNPROCESSABLE_ENTITY)
    }
  }
}

// --- Delete ---

pub async fn delete_prompt_handler(app_state: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
  let id = path.into_inner();
  let view = match mounted_with(&app_state, id).await {
    Ok(view) => view,
    Err(redirect) => return redirect,
  };
  let prompt = view.request_delete(id);
  let code = view.cart(id).map(|c| c.code).unwrap_or_default();
  let fields = format!("<p>{}</p>", escape(&code));
  form_page(CARTS, prompt.title, &format!("/carts/{}/delete", prompt.cart_id), CARTS, &fields, None, StatusCode::OK)
}

/// The POST is the confirmation; the prompt page above is the first step.
#[instrument(name = "handler::delete_cart", skip(app_state))]
pub async fn delete_cart_handler(app_state: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
  let id = path.into_inner();
  let view = admin_view(&app_state);
  view.request_delete(id);
  match view.confirm_delete().await {
    Ok(_) => redirect_with(CARTS, &[], view.take_notice().as_ref()),
    Err(e) => redirect_with(CARTS, &[], Some(&Notice::error(e.message()))),
  }
}
