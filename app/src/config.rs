// cartdesk/app/src/config.rs

use crate::errors::{AppError, Result}; // Use AppError specific Result
use cartdesk::site::{ReturnPoints, DEFAULT_POLL_INTERVAL};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)] // Clone is useful if parts of config are passed around
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,

  /// Root of the cart backend; `/api/...` paths are joined onto it.
  pub backend_base_url: String,
  pub request_timeout: Duration,

  /// How often admin and log pages re-fetch.
  pub poll_interval: Duration,

  /// Drop-off locations offered in every return-point selector.
  pub return_points: ReturnPoints,

  /// Serve the `/api` contract from an in-memory backend instead of
  /// talking to `backend_base_url`.
  pub mock_backend: bool,
}

fn parse_var<T>(name: &str, raw: String) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  raw
    .trim()
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", name, raw, e)))
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = parse_var::<u16>("SERVER_PORT", get_env("SERVER_PORT").unwrap_or_else(|_| "8080".to_string()))?;

    let mock_backend = parse_var::<bool>("MOCK_BACKEND", get_env("MOCK_BACKEND").unwrap_or_else(|_| "false".to_string()))?;
    let backend_base_url = get_env("BACKEND_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());

    let timeout_secs = parse_var::<u64>(
      "REQUEST_TIMEOUT_SECS",
      get_env("REQUEST_TIMEOUT_SECS").unwrap_or_else(|_| "10".to_string()),
    )?;
    let poll_secs = match get_env("POLL_INTERVAL_SECS") {
      Ok(raw) => parse_var::<u64>("POLL_INTERVAL_SECS", raw)?,
      Err(_) => DEFAULT_POLL_INTERVAL.as_secs(),
    };
    if timeout_secs == 0 || poll_secs == 0 {
      return Err(AppError::Config(
        "REQUEST_TIMEOUT_SECS and POLL_INTERVAL_SECS must be positive".to_string(),
      ));
    }

    let return_points = match get_env("RETURN_POINTS") {
      Ok(raw) => ReturnPoints::parse_list(&raw)
        .ok_or_else(|| AppError::Config("RETURN_POINTS must name at least one return point".to_string()))?,
      Err(_) => ReturnPoints::default(),
    };

    tracing::info!(
      return_points = return_points.len(),
      mock_backend,
      "Application configuration loaded successfully."
    );

    Ok(Self {
      server_host,
      server_port,
      backend_base_url,
      request_timeout: Duration::from_secs(timeout_secs),
      poll_interval: Duration::from_secs(poll_secs),
      return_points,
      mock_backend,
    })
  }

  pub fn server_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      backend_base_url: "http://127.0.0.1:8000".to_string(),
      request_timeout: Duration::from_secs(10),
      poll_interval: DEFAULT_POLL_INTERVAL,
      return_points: ReturnPoints::default(),
      mock_backend: false,
    }
  }
}
