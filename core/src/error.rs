// core/src/error.rs
use serde::Deserialize;
use thiserror::Error;

/// Failure of a single backend call.
#[derive(Debug, Error)]
pub enum ClientError {
  /// No usable response: connection refused, timeout, TLS failure...
  #[error("Transport error: {source}")]
  Transport {
    #[source]
    source: reqwest::Error,
  },

  /// The backend answered with a non-success status.
  #[error("Backend responded with HTTP {status}{}", message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
  Status { status: u16, message: Option<String> },

  /// The body did not match the expected contract.
  #[error("Malformed response from {operation}: {detail}")]
  Decode { operation: &'static str, detail: String },

  #[error("Invalid backend base URL '{url}': {detail}")]
  InvalidBaseUrl { url: String, detail: String },
}

/// Error payload returned by the backend, `{"error": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendErrorBody {
  pub error: String,
}

impl ClientError {
  pub fn status(&self) -> Option<u16> {
    match self {
      ClientError::Status { status, .. } => Some(*status),
      ClientError::Transport { source } => source.status().map(|s| s.as_u16()),
      _ => None,
    }
  }

  /// The backend-supplied error string, if the backend sent one.
  pub fn backend_message(&self) -> Option<&str> {
    match self {
      ClientError::Status { message, .. } => message.as_deref().filter(|m| !m.trim().is_empty()),
      _ => None,
    }
  }

  pub fn is_conflict(&self) -> bool {
    self.status() == Some(409)
  }

  /// A return rejected because the cart was not out on loan.
  ///
  /// The backend only distinguishes this conflict by its message text.
  pub fn is_not_borrowed_conflict(&self) -> bool {
    self.is_conflict()
      && self
        .backend_message()
        .map(|m| m.to_lowercase().contains("not borrowed"))
        .unwrap_or(false)
  }

  /// Message for a user-facing notice: the backend's own text, else our
  /// description of the failure.
  pub fn display_message(&self) -> String {
    match self.backend_message() {
      Some(message) => message.to_string(),
      None => self.to_string(),
    }
  }
}

impl From<reqwest::Error> for ClientError {
  fn from(source: reqwest::Error) -> Self {
    ClientError::Transport { source }
  }
}

pub type ClientResult<T, E = ClientError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::ClientError;

  fn status(status: u16, message: Option<&str>) -> ClientError {
    ClientError::Status { status, message: message.map(str::to_string) }
  }

  #[test]
  fn not_borrowed_conflict_is_detected_case_insensitively() {
    assert!(status(409, Some("Cart is NOT BORROWED")).is_not_borrowed_conflict());
    assert!(!status(409, Some("cart is already borrowed")).is_not_borrowed_conflict());
    assert!(!status(400, Some("cart not borrowed")).is_not_borrowed_conflict());
    assert!(!status(409, None).is_not_borrowed_conflict());
  }

  #[test]
  fn display_message_prefers_backend_text() {
    assert_eq!(status(500, Some("db down")).display_message(), "db down");
    assert_eq!(status(500, Some("  ")).display_message(), "Backend responded with HTTP 500");
    assert_eq!(status(404, None).to_string(), "Backend responded with HTTP 404");
    assert_eq!(status(409, Some("x")).to_string(), "Backend responded with HTTP 409: x");
  }
}
