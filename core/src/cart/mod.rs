// core/src/cart/mod.rs

//! Session-scoped carts.
//!
//! Reads go through a per-session TTL cache. Every mutation runs its pipeline,
//! drops the session's cache entry and then rebuilds it through `get_cart`, so
//! the response of a mutation always reflects the store.

pub mod flows;

use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

use crate::cache::TtlCache;
use crate::error::{Result, ShopError};
use crate::flow::{ContextData, Flows, PipelineResult};
use crate::models::CartView;
use crate::store::{CartStore, CatalogStore};
use flows::{AddToCartCtxData, RemoveFromCartCtxData, UpdateCartCtxData};

/// Body of the add/update/remove endpoints. Missing fields are checked by the
/// pipelines so clients get the domain message instead of a parser error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartItemRequest {
  #[serde(default)]
  pub product_id: Option<i32>,
  #[serde(default)]
  pub quantity: Option<i32>,
}

pub fn cart_cache_key(session_key: &str) -> String {
  format!("cart:{}", session_key)
}

pub struct CartService {
  catalog: Arc<dyn CatalogStore>,
  carts: Arc<dyn CartStore>,
  flows: Arc<Flows<ShopError>>,
  cache: TtlCache<CartView>,
}

impl CartService {
  pub fn new(
    catalog: Arc<dyn CatalogStore>,
    carts: Arc<dyn CartStore>,
    flows: Arc<Flows<ShopError>>,
    cache: TtlCache<CartView>,
  ) -> Self {
    Self {
      catalog,
      carts,
      flows,
      cache,
    }
  }

  #[instrument(name = "CartService::get_cart", skip(self))]
  pub async fn get_cart(&self, session_key: &str) -> Result<CartView> {
    let carts = self.carts.clone();
    self
      .cache
      .get_or_try_insert_with(&cart_cache_key(session_key), || async move {
        let lines = carts.cart_lines(session_key).await?;
        Ok(CartView::from_lines(&lines))
      })
      .await
  }

  /// Drops the cached cart and reads it back from the store.
  pub async fn refresh(&self, session_key: &str) -> Result<CartView> {
    self.cache.invalidate(&cart_cache_key(session_key));
    self.get_cart(session_key).await
  }

  #[instrument(name = "CartService::add_item", skip(self))]
  pub async fn add_item(&self, session_key: &str, product_id: Option<i32>, quantity: Option<i32>) -> Result<CartView> {
    let ctx_data = ContextData::new(AddToCartCtxData {
      catalog: self.catalog.clone(),
      carts: self.carts.clone(),
      session_key: session_key.to_string(),
      product_id,
      quantity,
      updated_item: None,
    });
    self.run_and_refresh(ctx_data, session_key).await
  }

  #[instrument(name = "CartService::update_quantity", skip(self))]
  pub async fn update_quantity(
    &self,
    session_key: &str,
    product_id: Option<i32>,
    quantity: Option<i32>,
  ) -> Result<CartView> {
    let ctx_data = ContextData::new(UpdateCartCtxData {
      carts: self.carts.clone(),
      session_key: session_key.to_string(),
      product_id,
      quantity,
      updated_item: None,
    });
    self.run_and_refresh(ctx_data, session_key).await
  }

  #[instrument(name = "CartService::remove_item", skip(self))]
  pub async fn remove_item(&self, session_key: &str, product_id: Option<i32>) -> Result<CartView> {
    let ctx_data = ContextData::new(RemoveFromCartCtxData {
      carts: self.carts.clone(),
      session_key: session_key.to_string(),
      product_id,
      removed: false,
    });
    self.run_and_refresh(ctx_data, session_key).await
  }

  async fn run_and_refresh<TData>(&self, ctx_data: ContextData<TData>, session_key: &str) -> Result<CartView>
  where
    TData: 'static + Send + Sync,
  {
    match self.flows.run(ctx_data).await? {
      PipelineResult::Completed => self.refresh(session_key).await,
      PipelineResult::Stopped => Err(ShopError::Internal("cart flow stopped before completing".to_string())),
    }
  }
}
