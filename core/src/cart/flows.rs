// core/src/cart/flows.rs

//! Add, update and remove pipelines for session carts.

use std::sync::Arc;
use tracing::{event, info, warn, Level};

use crate::error::ShopError;
use crate::flow::{ContextData, Flows, Pipeline, PipelineControl};
use crate::models::{CartItem, MAX_QUANTITY, MIN_QUANTITY};
use crate::store::{CartStore, CatalogStore};

pub struct AddToCartCtxData {
  pub catalog: Arc<dyn CatalogStore>,
  pub carts: Arc<dyn CartStore>,
  pub session_key: String,
  pub product_id: Option<i32>,
  pub quantity: Option<i32>,
  pub updated_item: Option<CartItem>,
}

pub struct UpdateCartCtxData {
  pub carts: Arc<dyn CartStore>,
  pub session_key: String,
  pub product_id: Option<i32>,
  pub quantity: Option<i32>,
  pub updated_item: Option<CartItem>,
}

pub struct RemoveFromCartCtxData {
  pub carts: Arc<dyn CartStore>,
  pub session_key: String,
  pub product_id: Option<i32>,
  pub removed: bool,
}

pub(crate) fn check_quantity(quantity: i32) -> Result<i32, ShopError> {
  if (MIN_QUANTITY..=MAX_QUANTITY).contains(&quantity) {
    Ok(quantity)
  } else {
    Err(ShopError::validation(format!(
      "Quantity must be between {} and {}",
      MIN_QUANTITY, MAX_QUANTITY
    )))
  }
}

/// A zero id is treated the same as a missing one.
fn product_id_given(product_id: Option<i32>) -> bool {
  product_id.is_some_and(|id| id != 0)
}

pub(crate) fn register_cart_flows(flows: &Flows<ShopError>) {
  flows.register_pipeline(add_to_cart_pipeline());
  flows.register_pipeline(update_cart_pipeline());
  flows.register_pipeline(remove_from_cart_pipeline());
}

fn add_to_cart_pipeline() -> Pipeline<AddToCartCtxData, ShopError> {
  let mut p = Pipeline::<AddToCartCtxData, ShopError>::new(
    "add_to_cart",
    &["validate_cart_input", "fetch_product_for_cart", "upsert_cart_item"],
  );

  p.on_step("validate_cart_input", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      if !product_id_given(guard.product_id) {
        return Err(ShopError::validation("Product ID is required"));
      }
      let quantity = check_quantity(guard.quantity.unwrap_or(MIN_QUANTITY)).map_err(|e| {
        warn!(quantity = ?guard.quantity, "Add to cart with out-of-range quantity.");
        e
      })?;
      guard.quantity = Some(quantity);
      Ok(PipelineControl::Continue)
    })
  });

  p.on_step("fetch_product_for_cart", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (catalog, product_id) = {
        let guard = ctx_data.read();
        (guard.catalog.clone(), guard.product_id.unwrap_or_default())
      };
      event!(Level::DEBUG, product_id, "Fetching product for cart.");
      match catalog.get_product(product_id).await? {
        Some(_) => Ok(PipelineControl::Continue),
        None => {
          warn!(product_id, "Add to cart for unknown product.");
          Err(ShopError::not_found("Product not found"))
        }
      }
    })
  });

  p.on_step("upsert_cart_item", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (carts, session_key, product_id, quantity) = {
        let guard = ctx_data.read();
        (
          guard.carts.clone(),
          guard.session_key.clone(),
          guard.product_id.unwrap_or_default(),
          guard.quantity.unwrap_or(MIN_QUANTITY),
        )
      };
      let item = carts.upsert_add(&session_key, product_id, quantity, MAX_QUANTITY).await?;
      info!(product_id, quantity = item.quantity, "Cart item added.");
      ctx_data.write().updated_item = Some(item);
      Ok::<_, ShopError>(PipelineControl::Continue)
    })
  });

  p
}

fn update_cart_pipeline() -> Pipeline<UpdateCartCtxData, ShopError> {
  let mut p = Pipeline::<UpdateCartCtxData, ShopError>::new(
    "update_cart",
    &["validate_update_input", "set_cart_item_quantity"],
  );

  p.on_step("validate_update_input", |ctx_data: ContextData<UpdateCartCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      match (guard.product_id, guard.quantity) {
        (product_id, Some(quantity)) if product_id_given(product_id) => {
          check_quantity(quantity)?;
          Ok(PipelineControl::Continue)
        }
        _ => Err(ShopError::validation("Product ID and quantity are required")),
      }
    })
  });

  p.on_step("set_cart_item_quantity", |ctx_data: ContextData<UpdateCartCtxData>| {
    Box::pin(async move {
      let (carts, session_key, product_id, quantity) = {
        let guard = ctx_data.read();
        (
          guard.carts.clone(),
          guard.session_key.clone(),
          guard.product_id.unwrap_or_default(),
          guard.quantity.unwrap_or(MIN_QUANTITY),
        )
      };
      match carts.set_quantity(&session_key, product_id, quantity).await? {
        Some(item) => {
          info!(product_id, quantity, "Cart item quantity set.");
          ctx_data.write().updated_item = Some(item);
          Ok(PipelineControl::Continue)
        }
        None => Err(ShopError::not_found("Product not found in cart")),
      }
    })
  });

  p
}

fn remove_from_cart_pipeline() -> Pipeline<RemoveFromCartCtxData, ShopError> {
  let mut p = Pipeline::<RemoveFromCartCtxData, ShopError>::new(
    "remove_from_cart",
    &["validate_remove_input", "delete_cart_item"],
  );

  p.on_step("validate_remove_input", |ctx_data: ContextData<RemoveFromCartCtxData>| {
    Box::pin(async move {
      if !product_id_given(ctx_data.read().product_id) {
        return Err(ShopError::validation("Product ID is required"));
      }
      Ok(PipelineControl::Continue)
    })
  });

  p.on_step("delete_cart_item", |ctx_data: ContextData<RemoveFromCartCtxData>| {
    Box::pin(async move {
      let (carts, session_key, product_id) = {
        let guard = ctx_data.read();
        (guard.carts.clone(), guard.session_key.clone(), guard.product_id.unwrap_or_default())
      };
      let removed = carts.remove_item(&session_key, product_id).await?;
      // Removing an absent row is a no-op.
      event!(Level::DEBUG, product_id, removed, "Cart item remove finished.");
      ctx_data.write().removed = removed;
      Ok::<_, ShopError>(PipelineControl::Continue)
    })
  });

  p
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn quantity_bounds_are_inclusive() {
    assert_eq!(check_quantity(1).unwrap(), 1);
    assert_eq!(check_quantity(10).unwrap(), 10);
    assert!(check_quantity(0).is_err());
    assert!(check_quantity(11).is_err());
    assert!(check_quantity(-3).is_err());
  }
}
