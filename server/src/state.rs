// server/src/state.rs
use crate::config::AppConfig;
use primebasket::Shop;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub shop: Arc<Shop>,
  pub config: Arc<AppConfig>,
}
