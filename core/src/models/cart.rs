// core/src/models/cart.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::timestamp;

/// The two states a cart can be in. Anything else on the wire is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartStatus {
  Available,
  Borrowed,
}

impl CartStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      CartStatus::Available => "available",
      CartStatus::Borrowed => "borrowed",
    }
  }
}

impl fmt::Display for CartStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for CartStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      "available" => Ok(CartStatus::Available),
      "borrowed" => Ok(CartStatus::Borrowed),
      other => Err(format!("unknown cart status '{}'", other)),
    }
  }
}

/// Who has the cart and where they are taking it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrower {
  pub name: String,
  pub phone: String,
  pub destination: String,
}

/// Borrow state of a cart. Borrower details exist only while borrowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartState {
  Available,
  Borrowed(Borrower),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CartWire", into = "CartWire")]
pub struct Cart {
  pub id: i64,
  pub code: String,
  pub state: CartState,
  /// Last known physical location. Independent of the borrow state.
  pub return_point: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Cart {
  pub fn status(&self) -> CartStatus {
    match self.state {
      CartState::Available => CartStatus::Available,
      CartState::Borrowed(_) => CartStatus::Borrowed,
    }
  }

  pub fn is_available(&self) -> bool {
    matches!(self.state, CartState::Available)
  }

  pub fn borrower(&self) -> Option<&Borrower> {
    match &self.state {
      CartState::Borrowed(borrower) => Some(borrower),
      CartState::Available => None,
    }
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("cart '{code}' is borrowed but has no borrower {missing}")]
pub struct CartContractError {
  pub code: String,
  pub missing: &'static str,
}

/// Flat JSON shape used by the backend.
#[derive(Serialize, Deserialize)]
struct CartWire {
  id: i64,
  code: String,
  status: CartStatus,
  #[serde(default)]
  borrower_name: Option<String>,
  #[serde(default)]
  borrower_phone: Option<String>,
  #[serde(default)]
  borrower_destination: Option<String>,
  #[serde(default)]
  return_point: Option<String>,
  #[serde(deserialize_with = "timestamp::deserialize")]
  created_at: DateTime<Utc>,
  #[serde(deserialize_with = "timestamp::deserialize")]
  updated_at: DateTime<Utc>,
}

fn non_blank(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<CartWire> for Cart {
  type Error = CartContractError;

  fn try_from(wire: CartWire) -> Result<Self, Self::Error> {
    let name = non_blank(wire.borrower_name);
    let phone = non_blank(wire.borrower_phone);
    let destination = non_blank(wire.borrower_destination);

    let state = match wire.status {
      CartStatus::Borrowed => {
        let missing = |field: &'static str| CartContractError { code: wire.code.clone(), missing: field };
        CartState::Borrowed(Borrower {
          name: name.ok_or_else(|| missing("name"))?,
          phone: phone.ok_or_else(|| missing("phone"))?,
          destination: destination.ok_or_else(|| missing("destination"))?,
        })
      }
      CartStatus::Available => {
        if name.is_some() || phone.is_some() || destination.is_some() {
          tracing::warn!(cart_code = %wire.code, "Dropping stale borrower fields on an available cart.");
        }
        CartState::Available
      }
    };

    Ok(Cart {
      id: wire.id,
      code: wire.code,
      state,
      return_point: non_blank(wire.return_point),
      created_at: wire.created_at,
      updated_at: wire.updated_at,
    })
  }
}

impl From<Cart> for CartWire {
  fn from(cart: Cart) -> Self {
    let status = cart.status();
    let (borrower_name, borrower_phone, borrower_destination) = match cart.state {
      CartState::Borrowed(b) => (Some(b.name), Some(b.phone), Some(b.destination)),
      CartState::Available => (None, None, None),
    };
    CartWire {
      id: cart.id,
      code: cart.code,
      status,
      borrower_name,
      borrower_phone,
      borrower_destination,
      return_point: cart.return_point,
      created_at: cart.created_at,
      updated_at: cart.updated_at,
    }
  }
}

// --- Request bodies ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCartRequest {
  pub code: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub return_point: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowCartRequest {
  pub borrower_name: String,
  pub borrower_phone: String,
  pub borrower_destination: String,
}

impl From<BorrowCartRequest> for Borrower {
  fn from(req: BorrowCartRequest) -> Self {
    Borrower {
      name: req.borrower_name,
      phone: req.borrower_phone,
      destination: req.borrower_destination,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnCartRequest {
  pub return_point: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCartRequest {
  pub to_return_point: String,
}

/// Partial cart override sent by the admin edit form.
///
/// Outer `None` leaves a field untouched. For the nullable fields,
/// `Some(None)` serializes as `null` and clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCartRequest {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub code: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<CartStatus>,
  #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "explicit_null")]
  pub borrower_name: Option<Option<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "explicit_null")]
  pub borrower_phone: Option<Option<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "explicit_null")]
  pub borrower_destination: Option<Option<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "explicit_null")]
  pub return_point: Option<Option<String>>,
}

// A present key (even `null`) becomes `Some(..)`; absent keys fall back to `default`.
fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
  D: Deserializer<'de>,
{
  Option::<String>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn wire(status: &str) -> serde_json::Value {
    json!({
      "id": 7,
      "code": "CART-007",
      "status": status,
      "borrower_name": "张三",
      "borrower_phone": "13800000000",
      "borrower_destination": "友园16号楼",
      "return_point": null,
      "created_at": "2024-05-01 09:00:00",
      "updated_at": "2024-05-01T09:05:00Z"
    })
  }

  #[test]
  fn borrowed_cart_carries_borrower() {
    let cart: Cart = serde_json::from_value(wire("borrowed")).unwrap();
    assert_eq!(cart.status(), CartStatus::Borrowed);
    let borrower = cart.borrower().unwrap();
    assert_eq!(borrower.name, "张三");
    assert_eq!(borrower.destination, "友园16号楼");
    assert_eq!(cart.return_point, None);
  }

  #[test]
  fn available_cart_drops_stale_borrower_fields() {
    let cart: Cart = serde_json::from_value(wire("available")).unwrap();
    assert!(cart.is_available());
    assert!(cart.borrower().is_none());

    let back = serde_json::to_value(&cart).unwrap();
    assert_eq!(back["borrower_name"], serde_json::Value::Null);
    assert_eq!(back["status"], "available");
  }

  #[test]
  fn borrowed_without_phone_is_rejected() {
    let mut value = wire("borrowed");
    value["borrower_phone"] = json!("  ");
    let err = serde_json::from_value::<Cart>(value).unwrap_err();
    assert!(err.to_string().contains("no borrower phone"), "{}", err);
  }

  #[test]
  fn unknown_status_is_rejected() {
    assert!(serde_json::from_value::<Cart>(wire("lost")).is_err());
    assert!("lost".parse::<CartStatus>().is_err());
    assert_eq!(" borrowed ".parse::<CartStatus>(), Ok(CartStatus::Borrowed));
  }

  #[test]
  fn update_request_distinguishes_clear_from_untouched() {
    let req = UpdateCartRequest {
      status: Some(CartStatus::Available),
      borrower_name: Some(None),
      ..Default::default()
    };
    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(value, json!({"status": "available", "borrower_name": null}));

    let parsed: UpdateCartRequest = serde_json::from_value(value).unwrap();
    assert_eq!(parsed.borrower_name, Some(None));
    assert_eq!(parsed.borrower_phone, None);
    assert_eq!(parsed.code, None);
  }

  #[test]
  fn create_request_omits_missing_return_point() {
    let req = CreateCartRequest { code: "CART-001".into(), return_point: None };
    assert_eq!(serde_json::to_value(&req).unwrap(), json!({"code": "CART-001"}));
  }
}
