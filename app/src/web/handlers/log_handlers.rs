// cartdesk/app/src/web/handlers/log_handlers.rs

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use cartdesk::views::LogRow;
use cartdesk::{LogView, Route};
use serde::Deserialize;
use std::fmt::Write;
use tracing::instrument;

use super::non_blank;
use crate::state::AppState;
use crate::web::render::{escape, html, pager, text_input, Flash, Shell};

const LOGS: &str = "/logs";

#[derive(Deserialize, Debug, Default)]
pub struct LogQuery {
  #[serde(default)]
  pub cart_code: Option<String>,
  #[serde(default)]
  pub page: Option<usize>,
}

/// Re-requests the page every `secs` with whatever is typed into the filter
/// box, submitted or not, staying on `page`.
fn poll_script(secs: u64, page: usize) -> String {
  format!(
    "setInterval(function(){{var v=document.getElementById('cart_code').value.trim();\
     var q=new URLSearchParams();if(v){{q.set('cart_code',v);}}q.set('page','{}');\
     location.replace('/logs?'+q.toString());}},{});",
    page,
    secs * 1000
  )
}

fn render_row(out: &mut String, row: &LogRow) {
  let kind = match row.kind {
    cartdesk::ActionKind::Borrow => "借用",
    cartdesk::ActionKind::Return => "归还",
    cartdesk::ActionKind::Transfer => "运送",
  };
  let _ = write!(
    out,
    "<tr><td>{time}</td><td>{code}</td><td><span class=\"tag {color}\">{kind}</span></td><td>{name}</td>\
     <td>{phone}</td><td>{dest}</td><td>{from}</td><td>{to}</td></tr>",
    time = row.created_at,
    code = escape(&row.cart_code),
    color = row.kind_color,
    kind = kind,
    name = escape(&row.borrower_name),
    phone = escape(&row.borrower_phone),
    dest = escape(&row.borrower_destination),
    from = escape(&row.from_point),
    to = escape(&row.to_point),
  );
}

#[instrument(name = "handler::list_logs", skip(app_state, query, flash))]
pub async fn list_logs_handler(
  app_state: web::Data<AppState>,
  query: web::Query<LogQuery>,
  flash: Flash,
) -> HttpResponse {
  let filter = query.cart_code.as_deref().and_then(non_blank);
  let view = LogView::mount(app_state.api.clone(), filter).await;
  let notice = view.take_notice().or(flash.0);
  let page = view.page(query.page.unwrap_or(1));

  let mut body = String::from("<h2>操作日志</h2><form method=\"get\" action=\"/logs\">");
  body.push_str(&text_input("小推车编号", "cart_code", &view.filter_input(), None));
  body.push_str(
    "<button type=\"submit\">查询</button> <a href=\"/logs\">重置</a></form>\
     <table><thead><tr><th>时间</th><th>编号</th><th>类型</th><th>借用人</th><th>电话</th>\
     <th>去往地点</th><th>起点</th><th>终点</th></tr></thead><tbody>",
  );
  for row in &page.items {
    render_row(&mut body, row);
  }
  body.push_str("</tbody></table>");
  body.push_str(&pager(LOGS, &page, &[("cart_code", filter.unwrap_or_default())]));

  let shell = Shell {
    path: Route::Logs.path(),
    title: Route::Logs.title(),
    notice,
    refresh: None,
    script: Some(poll_script(app_state.config.poll_interval.as_secs(), page.number)),
  };
  html(StatusCode::OK, shell.render(&body))
}
