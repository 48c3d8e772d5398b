// cartdesk/app/src/web/handlers/transfer_handlers.rs

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use cartdesk::views::transfer::UNKNOWN_LOCATION;
use cartdesk::{Route, TransferView};
use serde::Deserialize;
use tracing::instrument;

use super::{non_blank, parse_id};
use crate::state::AppState;
use crate::web::render::{escape, html, redirect_with, select_input, Flash, Shell};

const TRANSFER: &str = "/transfer";

/// Submits the selection form whenever a selector changes.
const LIVE_SELECT_SCRIPT: &str =
  "document.querySelectorAll('form.live select').forEach(function(s){s.addEventListener('change',function(){s.form.submit();});});";

/// Both the page query and the transport form carry the current selection.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct SelectionPayload {
  pub cart_id: String,
  pub destination: String,
}

async fn selected_view(app_state: &AppState, selection: &SelectionPayload) -> TransferView {
  let view = TransferView::mount(app_state.api.clone(), app_state.config.return_points.clone()).await;
  view.select_cart(parse_id(&selection.cart_id));
  view.select_destination(non_blank(&selection.destination));
  view
}

#[instrument(name = "handler::transfer_page", skip(app_state, query, flash))]
pub async fn transfer_page_handler(
  app_state: web::Data<AppState>,
  query: web::Query<SelectionPayload>,
  flash: Flash,
) -> HttpResponse {
  let view = selected_view(&app_state, &query).await;
  let notice = view.take_notice().or(flash.0);
  let (selected_cart, destination) = {
    let state = view.state().read();
    (state.selected_cart, state.destination.clone())
  };

  let carts = view.available_carts();
  let labels: Vec<(String, String)> = carts
    .iter()
    .map(|c| (c.id.to_string(), format!("{}（{}）", c.code, c.return_point.as_deref().unwrap_or(UNKNOWN_LOCATION))))
    .collect();
  let selected_id = selected_cart.map(|id| id.to_string());

  let mut body = String::from("<h2>搬运小推车</h2><form class=\"live\" method=\"get\" action=\"/transfer\">");
  body.push_str(&select_input(
    "小推车",
    "cart_id",
    labels.iter().map(|(v, t)| (v.as_str(), t.as_str())),
    selected_id.as_deref(),
    None,
  ));
  body.push_str(&select_input(
    "目的地",
    "destination",
    view.return_points().iter().map(|p| (p, p)),
    destination.as_deref(),
    None,
  ));
  body.push_str("<noscript><button type=\"submit\">更新</button></noscript></form>");

  body.push_str(&format!("<p class=\"sentence\">{}</p>", escape(&view.sentence())));
  let disabled = if view.can_transport() { "" } else { " disabled" };
  body.push_str(&format!(
    "<form method=\"post\" action=\"/transfer\"><input type=\"hidden\" name=\"cart_id\" value=\"{}\">\
     <input type=\"hidden\" name=\"destination\" value=\"{}\"><button type=\"submit\"{}>运送</button></form>",
    selected_id.as_deref().unwrap_or_default(),
    escape(destination.as_deref().unwrap_or_default()),
    disabled,
  ));

  let shell = Shell {
    path: Route::Transfer.path(),
    title: Route::Transfer.title(),
    notice,
    refresh: None,
    script: Some(LIVE_SELECT_SCRIPT.to_string()),
  };
  html(StatusCode::OK, shell.render(&body))
}

#[instrument(name = "handler::transport_cart", skip(app_state, payload), fields(cart_id = %payload.cart_id, destination = %payload.destination))]
pub async fn transport_handler(app_state: web::Data<AppState>, payload: web::Form<SelectionPayload>) -> HttpResponse {
  let view = selected_view(&app_state, &payload).await;
  let keep = [("cart_id", payload.cart_id.as_str()), ("destination", payload.destination.as_str())];
  match view.transport().await {
    // The cart is still available after moving, so keep it selected.
    Ok(_) => redirect_with(TRANSFER, &keep[..1], view.take_notice().as_ref()),
    Err(_) => redirect_with(TRANSFER, &keep, view.take_notice().as_ref()),
  }
}
