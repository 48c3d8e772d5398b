// core/src/forms.rs

//! Client-side form validation. A form that fails validation never reaches
//! the network; each invalid field gets its own message.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::models::{
  BorrowCartRequest, Cart, CartState, CartStatus, CreateCartRequest, ReturnCartRequest, UpdateCartRequest,
};
use crate::site::ReturnPoints;

static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^1\d{10}$").expect("phone pattern is valid"));

/// Mainland mobile number: exactly 11 ASCII digits starting with `1`.
pub fn is_valid_phone(phone: &str) -> bool {
  PHONE_PATTERN.is_match(phone) && phone.is_ascii()
}

// Messages shown next to invalid fields.
pub const MSG_CODE_REQUIRED: &str = "请输入编号";
pub const MSG_CART_CODE_REQUIRED: &str = "请输入小推车编号";
pub const MSG_NAME_REQUIRED: &str = "请输入姓名";
pub const MSG_PHONE_REQUIRED: &str = "请输入手机号";
pub const MSG_PHONE_INVALID: &str = "请输入有效的11位手机号";
pub const MSG_DESTINATION_REQUIRED: &str = "请输入去往地点";
pub const MSG_RETURN_POINT_REQUIRED: &str = "请选择归还点";
pub const MSG_RETURN_POINT_UNKNOWN: &str = "归还点不在可选范围内";
pub const MSG_STATUS_REQUIRED: &str = "请选择状态";
pub const MSG_STATUS_INVALID: &str = "状态无效";

/// Invalid fields in the order they were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(&'static str, &'static str)>);

impl FieldErrors {
  pub fn push(&mut self, field: &'static str, message: &'static str) {
    self.0.push((field, message));
  }

  pub fn get(&self, field: &str) -> Option<&'static str> {
    self.0.iter().find(|(f, _)| *f == field).map(|(_, m)| *m)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
    self.0.iter().copied()
  }

  fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
    if self.is_empty() {
      Ok(value())
    } else {
      Err(self)
    }
  }
}

impl fmt::Display for FieldErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let joined: Vec<String> = self.0.iter().map(|(field, msg)| format!("{}: {}", field, msg)).collect();
    f.write_str(&joined.join("; "))
  }
}

impl std::error::Error for FieldErrors {}

fn trimmed(value: &str) -> Option<String> {
  let value = value.trim();
  if value.is_empty() {
    None
  } else {
    Some(value.to_string())
  }
}

fn check_return_point(
  errors: &mut FieldErrors,
  field: &'static str,
  value: Option<String>,
  points: &ReturnPoints,
) -> Option<String> {
  match value {
    Some(point) if !points.contains(&point) => {
      errors.push(field, MSG_RETURN_POINT_UNKNOWN);
      None
    }
    other => other,
  }
}

/// Admin "新增小推车" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateCartForm {
  pub code: String,
  pub return_point: Option<String>,
}

impl CreateCartForm {
  pub fn validate(&self, points: &ReturnPoints) -> Result<CreateCartRequest, FieldErrors> {
    let mut errors = FieldErrors::default();
    let code = trimmed(&self.code);
    if code.is_none() {
      errors.push("code", MSG_CODE_REQUIRED);
    }
    let return_point = self.return_point.as_deref().and_then(trimmed);
    let return_point = check_return_point(&mut errors, "return_point", return_point, points);
    errors.into_result(|| CreateCartRequest { code: code.unwrap_or_default(), return_point })
  }
}

/// Borrower details, shared by the admin modal and the self-service page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorrowForm {
  pub borrower_name: String,
  pub borrower_phone: String,
  pub borrower_destination: String,
}

impl BorrowForm {
  /// Admin modal: every field required, phone format not enforced.
  pub fn validate(&self) -> Result<BorrowCartRequest, FieldErrors> {
    self.validate_inner(false)
  }

  /// Self-service page: additionally requires a valid mobile number.
  pub fn validate_strict(&self) -> Result<BorrowCartRequest, FieldErrors> {
    self.validate_inner(true)
  }

  fn validate_inner(&self, check_phone_format: bool) -> Result<BorrowCartRequest, FieldErrors> {
    let mut errors = FieldErrors::default();
    let name = trimmed(&self.borrower_name);
    if name.is_none() {
      errors.push("borrower_name", MSG_NAME_REQUIRED);
    }
    let phone = trimmed(&self.borrower_phone);
    match &phone {
      None => errors.push("borrower_phone", MSG_PHONE_REQUIRED),
      Some(p) if check_phone_format && !is_valid_phone(p) => errors.push("borrower_phone", MSG_PHONE_INVALID),
      Some(_) => {}
    }
    let destination = trimmed(&self.borrower_destination);
    if destination.is_none() {
      errors.push("borrower_destination", MSG_DESTINATION_REQUIRED);
    }
    errors.into_result(|| BorrowCartRequest {
      borrower_name: name.unwrap_or_default(),
      borrower_phone: phone.unwrap_or_default(),
      borrower_destination: destination.unwrap_or_default(),
    })
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturnForm {
  pub return_point: String,
}

impl ReturnForm {
  pub fn validate(&self, points: &ReturnPoints) -> Result<ReturnCartRequest, FieldErrors> {
    let mut errors = FieldErrors::default();
    let point = trimmed(&self.return_point);
    if point.is_none() {
      errors.push("return_point", MSG_RETURN_POINT_REQUIRED);
    }
    let point = check_return_point(&mut errors, "return_point", point, points);
    errors.into_result(|| ReturnCartRequest { return_point: point.unwrap_or_default() })
  }
}

/// Admin "编辑小推车" form. Every field is sent; blanks clear the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditCartForm {
  pub code: String,
  pub status: String,
  pub borrower_name: String,
  pub borrower_phone: String,
  pub borrower_destination: String,
  pub return_point: Option<String>,
}

impl EditCartForm {
  /// Prefills the form from the cached cart.
  pub fn from_cart(cart: &Cart) -> Self {
    let (name, phone, destination) = match &cart.state {
      CartState::Borrowed(b) => (b.name.clone(), b.phone.clone(), b.destination.clone()),
      CartState::Available => Default::default(),
    };
    Self {
      code: cart.code.clone(),
      status: cart.status().as_str().to_string(),
      borrower_name: name,
      borrower_phone: phone,
      borrower_destination: destination,
      return_point: cart.return_point.clone(),
    }
  }

  /// A borrowed cart must keep full borrower details; an available cart has
  /// its borrower fields cleared.
  pub fn validate(&self, points: &ReturnPoints) -> Result<UpdateCartRequest, FieldErrors> {
    let mut errors = FieldErrors::default();
    let code = trimmed(&self.code);
    if code.is_none() {
      errors.push("code", MSG_CODE_REQUIRED);
    }

    let status = match trimmed(&self.status) {
      None => {
        errors.push("status", MSG_STATUS_REQUIRED);
        None
      }
      Some(raw) => match raw.parse::<CartStatus>() {
        Ok(status) => Some(status),
        Err(_) => {
          errors.push("status", MSG_STATUS_INVALID);
          None
        }
      },
    };

    let name = trimmed(&self.borrower_name);
    let phone = trimmed(&self.borrower_phone);
    let destination = trimmed(&self.borrower_destination);
    if status == Some(CartStatus::Borrowed) {
      if name.is_none() {
        errors.push("borrower_name", MSG_NAME_REQUIRED);
      }
      if phone.is_none() {
        errors.push("borrower_phone", MSG_PHONE_REQUIRED);
      }
      if destination.is_none() {
        errors.push("borrower_destination", MSG_DESTINATION_REQUIRED);
      }
    }

    let return_point = self.return_point.as_deref().and_then(trimmed);
    let return_point = check_return_point(&mut errors, "return_point", return_point, points);

    let borrowed = status == Some(CartStatus::Borrowed);
    let keep = |value: Option<String>| Some(if borrowed { value } else { None });
    errors.into_result(|| UpdateCartRequest {
      code,
      status,
      borrower_name: keep(name),
      borrower_phone: keep(phone),
      borrower_destination: keep(destination),
      return_point: Some(return_point),
    })
  }
}

/// Self-service forms identify the cart by the code the user typed.
pub fn cart_code_input(raw: &str) -> Result<String, FieldErrors> {
  match trimmed(raw) {
    Some(code) => Ok(code),
    None => {
      let mut errors = FieldErrors::default();
      errors.push("cart_code", MSG_CART_CODE_REQUIRED);
      Err(errors)
    }
  }
}

/// Combines two validations, keeping the errors of both.
pub fn both<A, B>(a: Result<A, FieldErrors>, b: Result<B, FieldErrors>) -> Result<(A, B), FieldErrors> {
  match (a, b) {
    (Ok(a), Ok(b)) => Ok((a, b)),
    (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
    (Err(mut first), Err(second)) => {
      first.0.extend(second.0);
      Err(first)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn phone_pattern() {
    assert!(is_valid_phone("13800000000"));
    assert!(!is_valid_phone("123"));
    assert!(!is_valid_phone("23800000000"));
    assert!(!is_valid_phone("138000000001"));
    assert!(!is_valid_phone("1380000000a"));
    assert!(!is_valid_phone("1３８00000000"));
  }

  #[test]
  fn strict_borrow_form_reports_each_field() {
    let form = BorrowForm { borrower_name: " ".into(), borrower_phone: "123".into(), borrower_destination: "".into() };
    let errors = form.validate_strict().unwrap_err();
    assert_eq!(errors.len(), 3);
    assert_eq!(errors.get("borrower_phone"), Some(MSG_PHONE_INVALID));
    assert_eq!(errors.get("borrower_name"), Some(MSG_NAME_REQUIRED));

    // The admin modal only requires presence.
    let errors = form.validate().unwrap_err();
    assert_eq!(errors.get("borrower_phone"), None);
  }

  #[test]
  fn create_form_checks_return_point_against_site_list() {
    let points = ReturnPoints::default();
    let ok = CreateCartForm { code: " CART-001 ".into(), return_point: Some("".into()) }.validate(&points).unwrap();
    assert_eq!(ok, CreateCartRequest { code: "CART-001".into(), return_point: None });

    let err = CreateCartForm { code: "".into(), return_point: Some("月球".into()) }.validate(&points).unwrap_err();
    assert_eq!(err.get("code"), Some(MSG_CODE_REQUIRED));
    assert_eq!(err.get("return_point"), Some(MSG_RETURN_POINT_UNKNOWN));
  }

  #[test]
  fn edit_form_clears_borrower_when_available() {
    let points = ReturnPoints::default();
    let form = EditCartForm {
      code: "CART-002".into(),
      status: "available".into(),
      borrower_name: "李四".into(),
      borrower_phone: "13900000000".into(),
      borrower_destination: "东门".into(),
      return_point: Some("西门".into()),
    };
    let req = form.validate(&points).unwrap();
    assert_eq!(req.status, Some(CartStatus::Available));
    assert_eq!(req.borrower_name, Some(None));
    assert_eq!(req.return_point, Some(Some("西门".into())));
  }

  #[test]
  fn edit_form_requires_borrower_when_borrowed() {
    let form = EditCartForm { code: "CART-002".into(), status: "borrowed".into(), ..Default::default() };
    let errors = form.validate(&ReturnPoints::default()).unwrap_err();
    assert_eq!(errors.len(), 3);
    assert_eq!(errors.get("borrower_destination"), Some(MSG_DESTINATION_REQUIRED));
  }

  #[test]
  fn both_keeps_every_error() {
    let form = BorrowForm { borrower_name: "".into(), ..Default::default() };
    let errors = both(cart_code_input(""), form.validate_strict()).unwrap_err();
    assert_eq!(errors.iter().next(), Some(("cart_code", MSG_CART_CODE_REQUIRED)));
    assert_eq!(errors.len(), 4);
  }

  #[test]
  fn cart_code_input_trims() {
    assert_eq!(cart_code_input("  12 ").unwrap(), "12");
    assert_eq!(cart_code_input("   ").unwrap_err().get("cart_code"), Some(MSG_CART_CODE_REQUIRED));
  }
}
