// cartdesk/app/src/web/render.rs

//! Page chrome shared by every handler: layout, notices, form fields and
//! redirects that carry a notice to the next page.

use actix_web::http::header::{ContentType, LOCATION};
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpRequest, HttpResponse};
use cartdesk::forms::FieldErrors;
use cartdesk::shell::{header_menu, ADMIN_TITLE};
use cartdesk::views::Page;
use cartdesk::{Notice, NoticeLevel};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::warn;

pub fn escape(input: &str) -> String {
  input
    .replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
    .replace('"', "&quot;")
    .replace('\'', "&#39;")
}

const STYLE: &str = "body{font-family:sans-serif;margin:0}header{background:#001529;color:#fff;padding:0 24px;display:flex;gap:24px;align-items:center;height:56px}\
header a{color:#ccc;text-decoration:none}header a.active{color:#fff;font-weight:bold}main{padding:24px}\
table{border-collapse:collapse;width:100%}td,th{border-bottom:1px solid #eee;padding:8px;text-align:left}\
.notice{padding:8px 12px;margin-bottom:16px}.success{background:#f6ffed}.error{background:#fff2f0}\
.field-error{color:#ff4d4f;font-size:12px}.tag{padding:2px 8px;border-radius:4px;color:#fff}\
.green{background:#52c41a}.orange{background:#fa8c16}.blue{background:#1677ff}";

/// Everything around the page body.
#[derive(Debug, Default)]
pub struct Shell<'a> {
  pub path: &'a str,
  pub title: &'a str,
  pub notice: Option<Notice>,
  /// Seconds and target of a `<meta refresh>`.
  pub refresh: Option<(u64, String)>,
  pub script: Option<String>,
}

impl Shell<'_> {
  pub fn render(&self, body: &str) -> String {
    let mut out = String::with_capacity(body.len() + 2048);
    out.push_str("<!DOCTYPE html><html lang=\"zh-CN\"><head><meta charset=\"utf-8\">");
    let _ = write!(out, "<title>{}</title><style>{}</style>", escape(self.title), STYLE);
    if let Some((secs, target)) = &self.refresh {
      let _ = write!(out, "<meta http-equiv=\"refresh\" content=\"{};url={}\">", secs, escape(target));
    }
    out.push_str("</head><body>");
    if let Some(menu) = header_menu(self.path) {
      let _ = write!(out, "<header><strong>{}</strong>", ADMIN_TITLE);
      for item in menu {
        let class = if item.route.path() == self.path { " class=\"active\"" } else { "" };
        let _ = write!(out, "<a href=\"{}\"{}>{}</a>", item.route.path(), class, item.label);
      }
      out.push_str("</header>");
    }
    out.push_str("<main>");
    if let Some(notice) = &self.notice {
      out.push_str(&notice_banner(notice));
    }
    out.push_str(body);
    out.push_str("</main>");
    if self.refresh.is_some() || self.script.is_some() {
      // Lets staff see that a polled page is current.
      let _ = write!(out, "<footer>更新于 {}</footer>", Local::now().format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(script) = &self.script {
      let _ = write!(out, "<script>{}</script>", script);
    }
    out.push_str("</body></html>");
    out
  }
}

pub fn notice_banner(notice: &Notice) -> String {
  let class = match notice.level {
    NoticeLevel::Success => "success",
    NoticeLevel::Error => "error",
  };
  format!("<div class=\"notice {}\" role=\"alert\">{}</div>", class, escape(&notice.message))
}

pub fn html(status: StatusCode, page: String) -> HttpResponse {
  HttpResponse::build(status).content_type(ContentType::html()).body(page)
}

// --- Form fields ---

fn field_error(errors: Option<&FieldErrors>, field: &str) -> String {
  match errors.and_then(|e| e.get(field)) {
    Some(message) => format!("<div class=\"field-error\">{}</div>", escape(message)),
    None => String::new(),
  }
}

pub fn text_input(label: &str, name: &str, value: &str, errors: Option<&FieldErrors>) -> String {
  format!(
    "<p><label>{label}<br><input name=\"{name}\" id=\"{name}\" value=\"{value}\"></label>{err}</p>",
    label = escape(label),
    name = name,
    value = escape(value),
    err = field_error(errors, name),
  )
}

/// A `<select>` with a leading empty option. `selected` picks the matching value.
pub fn select_input<'a, I>(
  label: &str,
  name: &str,
  options: I,
  selected: Option<&str>,
  errors: Option<&FieldErrors>,
) -> String
where
  I: IntoIterator<Item = (&'a str, &'a str)>,
{
  let mut out = format!("<p><label>{}<br><select name=\"{}\" id=\"{}\"><option value=\"\"></option>", escape(label), name, name);
  for (value, text) in options {
    let mark = if Some(value) == selected { " selected" } else { "" };
    let _ = write!(out, "<option value=\"{}\"{}>{}</option>", escape(value), mark, escape(text));
  }
  let _ = write!(out, "</select></label>{}</p>", field_error(errors, name));
  out
}

pub fn pager<T>(base: &str, page: &Page<T>, extra: &[(&str, &str)]) -> String {
  if page.total_pages <= 1 {
    return String::new();
  }
  let mut out = String::from("<nav>");
  for number in 1..=page.total_pages {
    if number == page.number {
      let _ = write!(out, " <strong>{}</strong>", number);
      continue;
    }
    let page_str = number.to_string();
    let mut params: Vec<(&str, &str)> = extra.to_vec();
    params.push(("page", page_str.as_str()));
    let _ = write!(out, " <a href=\"{}\">{}</a>", escape(&location(base, &params)), number);
  }
  let _ = write!(out, " <span>共 {} 条</span></nav>", page.total_items);
  out
}

// --- Redirects carrying a notice ---

#[derive(Debug, Default, Deserialize, Serialize)]
struct NoticeQuery {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  notice: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  error: Option<String>,
}

/// `base?k=v&...`; empty values are left out.
pub fn location(base: &str, params: &[(&str, &str)]) -> String {
  let params: Vec<(&str, &str)> = params.iter().copied().filter(|(_, v)| !v.is_empty()).collect();
  if params.is_empty() {
    return base.to_string();
  }
  match serde_urlencoded::to_string(&params) {
    Ok(query) => format!("{}?{}", base, query),
    Err(e) => {
      warn!(error = %e, "Could not encode redirect query; dropping it.");
      base.to_string()
    }
  }
}

/// 303 to `base`, with `notice` shown once on arrival.
pub fn redirect_with(base: &str, params: &[(&str, &str)], notice: Option<&Notice>) -> HttpResponse {
  let mut all: Vec<(&str, &str)> = params.to_vec();
  if let Some(notice) = notice {
    let key = match notice.level {
      NoticeLevel::Success => "notice",
      NoticeLevel::Error => "error",
    };
    all.push((key, notice.message.as_str()));
  }
  HttpResponse::build(StatusCode::SEE_OTHER).insert_header((LOCATION, location(base, &all))).finish()
}

/// The notice handed over by [`redirect_with`], if any.
#[derive(Debug, Default)]
pub struct Flash(pub Option<Notice>);

impl FromRequest for Flash {
  type Error = actix_web::Error;
  type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    // A malformed query just means no notice.
    let query: NoticeQuery = serde_urlencoded::from_str(req.query_string()).unwrap_or_default();
    let notice = match (query.error, query.notice) {
      (Some(message), _) if !message.is_empty() => Some(Notice::error(message)),
      (_, Some(message)) if !message.is_empty() => Some(Notice::success(message)),
      _ => None,
    };
    futures_util::future::ready(Ok(Flash(notice)))
  }
}
