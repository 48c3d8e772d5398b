// core/src/models/action_log.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
  Borrow,
  Return,
  Transfer,
}

impl ActionKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      ActionKind::Borrow => "borrow",
      ActionKind::Return => "return",
      ActionKind::Transfer => "transfer",
    }
  }
}

impl fmt::Display for ActionKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One immutable entry of the backend's action history.
///
/// Only the fields relevant to `kind` are populated: borrower details for a
/// borrow, `to_point` for a return, both points for a transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLog {
  pub id: i64,
  pub cart_id: i64,
  pub cart_code: String,
  #[serde(rename = "type")]
  pub kind: ActionKind,
  #[serde(default)]
  pub borrower_name: Option<String>,
  #[serde(default)]
  pub borrower_phone: Option<String>,
  #[serde(default)]
  pub borrower_destination: Option<String>,
  #[serde(default)]
  pub from_point: Option<String>,
  #[serde(default)]
  pub to_point: Option<String>,
  #[serde(deserialize_with = "timestamp::deserialize")]
  pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_type_field_into_kind() {
    let entry: ActionLog = serde_json::from_str(
      r#"{"id":1,"cart_id":3,"cart_code":"CART-003","type":"transfer","from_point":"东门","to_point":"西门","created_at":"2024-05-02 10:00:00"}"#,
    )
    .unwrap();
    assert_eq!(entry.kind, ActionKind::Transfer);
    assert_eq!(entry.from_point.as_deref(), Some("东门"));
    assert_eq!(entry.borrower_name, None);
  }
}
