// server/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use primebasket::auth::{LoginRequest, RefreshRequest, RegisterRequest, ResetPasswordRequest};
use serde_json::json;
use tracing::{error, info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(
    name = "handler::register",
    skip(app_state, req_payload),
    fields(username = %req_payload.username)
)]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
  let user = app_state.shop.auth.register(req_payload.into_inner()).await?;
  info!(user_id = user.id, "Registration complete.");
  Ok(HttpResponse::Created().json(user))
}

#[instrument(
    name = "handler::login",
    skip(app_state, req_payload),
    fields(username = %req_payload.username)
)]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
  let response = app_state.shop.auth.login(req_payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(response))
}

#[instrument(name = "handler::token_obtain", skip(app_state, req_payload), fields(username = %req_payload.username))]
pub async fn token_obtain_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
  let pair = app_state.shop.auth.obtain_tokens(req_payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(pair))
}

#[instrument(name = "handler::token_refresh", skip_all)]
pub async fn token_refresh_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RefreshRequest>,
) -> Result<HttpResponse, AppError> {
  let access = app_state.shop.auth.refresh(req_payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(access))
}

#[instrument(
    name = "handler::reset_password",
    skip(app_state, req_payload, auth_user),
    fields(username = %auth_user.user.username)
)]
pub async fn reset_password_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<ResetPasswordRequest>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  if let Err(e) = app_state
    .shop
    .auth
    .reset_password(&auth_user.user, req_payload.into_inner())
    .await
  {
    error!(username = %auth_user.user.username, error = %e, "Password reset failed.");
    return Err(e.into());
  }

  Ok(HttpResponse::Ok().json(json!({
      "status": "success",
      "code": 200,
      "message": "Password updated successfully",
      "data": [],
  })))
}

#[instrument(name = "handler::dashboard", skip(auth_user), fields(user_id = auth_user.user.id))]
pub async fn dashboard_handler(auth_user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(json!({
      "message": "Welcome to Dashboard",
      "user": auth_user.user,
  })))
}
