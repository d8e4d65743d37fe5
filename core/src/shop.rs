// core/src/shop.rs

//! Wires stores, caches and pipelines into the three services.

use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::auth::{self, AuthService, TokenConfig, TokenService};
use crate::cache::TtlCache;
use crate::cart::{self, CartService};
use crate::catalog::CatalogService;
use crate::error::{Result, ShopError};
use crate::flow::Flows;
use crate::similarity::{TextSimilarity, Trigram};
use crate::store::{CartStore, CatalogStore, MemoryStore, PgStore, UserStore};

/// The store handles each service reads from.
#[derive(Clone)]
pub struct Stores {
  pub catalog: Arc<dyn CatalogStore>,
  pub carts: Arc<dyn CartStore>,
  pub users: Arc<dyn UserStore>,
}

impl Stores {
  pub fn memory(store: Arc<MemoryStore>) -> Self {
    Self {
      catalog: store.clone(),
      carts: store.clone(),
      users: store,
    }
  }

  pub fn postgres(pool: PgPool) -> Self {
    let store = Arc::new(PgStore::new(pool));
    Self {
      catalog: store.clone(),
      carts: store.clone(),
      users: store,
    }
  }
}

#[derive(Debug, Clone)]
pub struct ShopConfig {
  pub tokens: TokenConfig,
  pub cache_ttl: Duration,
}

impl ShopConfig {
  pub fn new(tokens: TokenConfig) -> Self {
    Self {
      tokens,
      cache_ttl: crate::cache::DEFAULT_TTL,
    }
  }
}

pub struct Shop {
  pub catalog: CatalogService,
  pub cart: CartService,
  pub auth: AuthService,
}

impl Shop {
  pub fn new(stores: Stores, config: ShopConfig) -> Result<Self> {
    Self::with_similarity(stores, config, Arc::new(Trigram))
  }

  pub fn with_similarity(stores: Stores, config: ShopConfig, similarity: Arc<dyn TextSimilarity>) -> Result<Self> {
    let tokens = Arc::new(TokenService::new(config.tokens)?);

    let flows: Arc<Flows<ShopError>> = Arc::new(Flows::new());
    cart::flows::register_cart_flows(&flows);
    auth::flows::register_auth_flows(&flows);
    info!(cache_ttl_secs = config.cache_ttl.as_secs(), "Shop services ready.");

    Ok(Self {
      catalog: CatalogService::new(stores.catalog.clone(), similarity, config.cache_ttl),
      cart: CartService::new(stores.catalog, stores.carts, flows.clone(), TtlCache::new(config.cache_ttl)),
      auth: AuthService::new(stores.users, tokens, flows),
    })
  }
}
