// cartdesk/app/src/web/handlers/mod.rs

// Declare handler modules
pub mod admin_handlers;
pub mod backend_handlers; // JSON contract served from memory when MOCK_BACKEND is set
pub mod log_handlers;
pub mod transfer_handlers;
pub mod user_handlers;

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use cartdesk::Notice;

use super::render::{escape, html, Shell};

/// A single form posted back to `action`, with a cancel link.
pub(crate) fn form_page(
  path: &str,
  title: &str,
  action: &str,
  cancel: &str,
  fields: &str,
  notice: Option<Notice>,
  status: StatusCode,
) -> HttpResponse {
  let body = format!(
    "<h2>{title}</h2><form method=\"post\" action=\"{action}\">{fields}\
     <button type=\"submit\">确定</button> <a href=\"{cancel}\">取消</a></form>",
    title = escape(title),
    action = escape(action),
    fields = fields,
    cancel = escape(cancel),
  );
  html(status, Shell { path, title, notice, ..Default::default() }.render(&body))
}

/// Ids arrive from `<select>` elements whose empty option posts "".
pub(crate) fn parse_id(raw: &str) -> Option<i64> {
  raw.trim().parse().ok()
}

pub(crate) fn non_blank(raw: &str) -> Option<&str> {
  let trimmed = raw.trim();
  (!trimmed.is_empty()).then_some(trimmed)
}
