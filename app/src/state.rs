// cartdesk/app/src/state.rs
use crate::config::AppConfig;
use cartdesk::{HttpCartApi, InMemoryBackend, SharedApi};
use std::sync::Arc;

use crate::errors::Result;

#[derive(Clone)]
pub struct AppState {
  /// What every view talks to.
  pub api: SharedApi,
  pub config: Arc<AppConfig>, // Share loaded config
  /// Set in standalone mode; also served at `/api`.
  pub mock_backend: Option<Arc<InMemoryBackend>>,
}

impl AppState {
  pub fn from_config(config: AppConfig) -> Result<Self> {
    let config = Arc::new(config);
    if config.mock_backend {
      let backend = Arc::new(InMemoryBackend::with_return_points(config.return_points.clone()));
      return Ok(Self::with_mock(config, backend));
    }
    let api = HttpCartApi::new(&config.backend_base_url, config.request_timeout)?;
    Ok(Self { api: Arc::new(api), config, mock_backend: None })
  }

  pub fn with_mock(config: Arc<AppConfig>, backend: Arc<InMemoryBackend>) -> Self {
    Self { api: backend.clone(), config, mock_backend: Some(backend) }
  }
}
