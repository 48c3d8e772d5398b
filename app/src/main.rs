// cartdesk/app/src/main.rs

use anyhow::Context;
use cartdesk_app::config::AppConfig;
use cartdesk_app::state::AppState;
use cartdesk_app::web;

use actix_web::{App, HttpServer};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  // Initialize tracing subscriber for logging
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO) // Default level
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .init();

  tracing::info!("Starting cart desk server...");

  let app_config = AppConfig::from_env().context("loading configuration")?;
  let server_address = app_config.server_address();

  let app_state = AppState::from_config(app_config).context("building the cart backend client")?;
  match &app_state.mock_backend {
    Some(_) => tracing::warn!("MOCK_BACKEND is enabled: carts live in memory and vanish on restart."),
    None => tracing::info!(backend = %app_state.config.backend_base_url, "Using remote cart backend."),
  }

  tracing::info!("Attempting to bind server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .configure(web::configure_app(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
  })
  .bind(&server_address)
  .with_context(|| format!("binding {}", server_address))?
  .run()
  .await
  .context("running HTTP server")
}
