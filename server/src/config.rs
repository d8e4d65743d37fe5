// server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use primebasket::auth::tokens::MIN_SECRET_LEN;
use primebasket::{ShopConfig, TokenConfig};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// `None` runs the shop on the in-memory store.
  pub database_url: Option<String>,
  pub db_max_connections: u32,
  pub run_migrations: bool,

  pub jwt_secret: String,
  pub jwt_issuer: String,
  pub jwt_access_minutes: i64,
  pub jwt_refresh_minutes: i64,

  pub cache_ttl_secs: u64,
}

impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
      .field("db_max_connections", &self.db_max_connections)
      .field("run_migrations", &self.run_migrations)
      .field("jwt_secret", &"[REDACTED]")
      .field("jwt_issuer", &self.jwt_issuer)
      .field("jwt_access_minutes", &self.jwt_access_minutes)
      .field("jwt_refresh_minutes", &self.jwt_refresh_minutes)
      .field("cache_ttl_secs", &self.cache_ttl_secs)
      .finish()
  }
}

fn parsed_or<T>(var_name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match env::var(var_name) {
    Ok(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {}: {}", var_name, e))),
    Err(_) => Ok(default),
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = parsed_or::<u16>("SERVER_PORT", 8080)?;
    let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());
    let db_max_connections = parsed_or::<u32>("DB_MAX_CONNECTIONS", 5)?;
    let run_migrations = parsed_or::<bool>("RUN_MIGRATIONS", true)?;

    let jwt_secret = env::var("JWT_SECRET")
      .map_err(|e| AppError::Config(format!("Missing environment variable 'JWT_SECRET': {}", e)))?;
    if jwt_secret.len() < MIN_SECRET_LEN {
      return Err(AppError::Config(format!(
        "JWT_SECRET must be at least {} characters",
        MIN_SECRET_LEN
      )));
    }
    let jwt_issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| "primebasket".to_string());
    let jwt_access_minutes = parsed_or::<i64>("JWT_ACCESS_MINUTES", 5)?;
    let jwt_refresh_minutes = parsed_or::<i64>("JWT_REFRESH_MINUTES", 1440)?;
    if jwt_access_minutes <= 0 || jwt_refresh_minutes <= 0 {
      return Err(AppError::Config("Token lifetimes must be positive".to_string()));
    }

    let cache_ttl_secs = parsed_or::<u64>("CACHE_TTL_SECS", 300)?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      db_max_connections,
      run_migrations,
      jwt_secret,
      jwt_issuer,
      jwt_access_minutes,
      jwt_refresh_minutes,
      cache_ttl_secs,
    })
  }

  pub fn shop_config(&self) -> ShopConfig {
    let mut tokens = TokenConfig::new(self.jwt_secret.clone());
    tokens.issuer = self.jwt_issuer.clone();
    tokens.access_ttl = chrono::Duration::minutes(self.jwt_access_minutes);
    tokens.refresh_ttl = chrono::Duration::minutes(self.jwt_refresh_minutes);
    ShopConfig {
      tokens,
      cache_ttl: Duration::from_secs(self.cache_ttl_secs),
    }
  }
}
