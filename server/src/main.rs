// server/src/main.rs

mod config;
mod errors;
mod state;
mod web;

use crate::config::AppConfig;
use crate::state::AppState;

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use primebasket::{MemoryStore, Shop, Stores};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

fn init_tracing() {
  let builder = tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE);

  match std::env::var("LOG_FORMAT").as_deref() {
    Ok("json") => builder.json().init(),
    _ => builder.init(),
  }
}

async fn build_stores(app_config: &AppConfig) -> anyhow::Result<Stores> {
  let Some(database_url) = app_config.database_url.as_deref() else {
    tracing::warn!("DATABASE_URL is not set; serving from an empty in-memory store.");
    return Ok(Stores::memory(Arc::new(MemoryStore::new())));
  };

  let pool = PgPoolOptions::new()
    .max_connections(app_config.db_max_connections)
    .connect(database_url)
    .await
    .context("Failed to connect to the database")?;
  tracing::info!("Successfully connected to the database.");

  if app_config.run_migrations {
    sqlx::migrate!("./migrations")
      .run(&pool)
      .await
      .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied.");
  }

  Ok(Stores::postgres(pool))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  init_tracing();
  tracing::info!("Starting PrimeBasket server...");

  let app_config = Arc::new(AppConfig::from_env().context("Failed to load application configuration")?);
  tracing::debug!(config = ?app_config, "Configuration");

  let stores = build_stores(&app_config).await?;
  let shop = Shop::new(stores, app_config.shop_config()).context("Failed to build shop services")?;

  let app_state = AppState {
    shop: Arc::new(shop),
    config: app_config.clone(),
  };

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Binding server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .app_data(web::json_config())
      .app_data(web::query_config())
      .app_data(web::path_config())
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await?;

  Ok(())
}
