// server/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use primebasket::cart::CartItemRequest;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::SessionKey;

fn cart_response(session: &SessionKey, body: impl serde::Serialize) -> HttpResponse {
  let mut builder = HttpResponse::Ok();
  session.set_cookie_on(&mut builder);
  builder.json(body)
}

#[instrument(name = "handler::get_cart", skip(app_state, session), fields(session = %session.as_str()))]
pub async fn get_cart_handler(app_state: web::Data<AppState>, session: SessionKey) -> Result<HttpResponse, AppError> {
  let cart = app_state.shop.cart.get_cart(session.as_str()).await?;
  Ok(cart_response(&session, cart))
}

#[instrument(
    name = "handler::add_to_cart",
    skip(app_state, session, req_payload),
    fields(session = %session.as_str(), product_id = ?req_payload.product_id, quantity = ?req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  session: SessionKey,
  req_payload: web::Json<CartItemRequest>,
) -> Result<HttpResponse, AppError> {
  let body = req_payload.into_inner();
  let cart = app_state
    .shop
    .cart
    .add_item(session.as_str(), body.product_id, body.quantity)
    .await?;
  info!(total_quantity = cart.total_quantity, "Item added to cart.");
  Ok(cart_response(&session, cart))
}

#[instrument(
    name = "handler::update_cart",
    skip(app_state, session, req_payload),
    fields(session = %session.as_str(), product_id = ?req_payload.product_id, quantity = ?req_payload.quantity)
)]
pub async fn update_cart_handler(
  app_state: web::Data<AppState>,
  session: SessionKey,
  req_payload: web::Json<CartItemRequest>,
) -> Result<HttpResponse, AppError> {
  let body = req_payload.into_inner();
  let cart = app_state
    .shop
    .cart
    .update_quantity(session.as_str(), body.product_id, body.quantity)
    .await?;
  Ok(cart_response(&session, cart))
}

#[instrument(
    name = "handler::remove_from_cart",
    skip(app_state, session, req_payload),
    fields(session = %session.as_str(), product_id = ?req_payload.product_id)
)]
pub async fn remove_from_cart_handler(
  app_state: web::Data<AppState>,
  session: SessionKey,
  req_payload: web::Json<CartItemRequest>,
) -> Result<HttpResponse, AppError> {
  let cart = app_state
    .shop
    .cart
    .remove_item(session.as_str(), req_payload.product_id)
    .await?;
  Ok(cart_response(&session, cart))
}
