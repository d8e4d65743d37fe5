// server/src/web/extractors.rs

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{dev::Payload, web, FromRequest, HttpRequest, HttpResponseBuilder};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use primebasket::auth::bearer_token;
use primebasket::models::User;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "basket_session";

/// Anonymous cart identity, read from the `basket_session` cookie or minted
/// for this request.
#[derive(Debug, Clone)]
pub struct SessionKey {
  pub value: String,
  /// True when the key was created for this request and the cookie still has
  /// to be sent.
  pub fresh: bool,
}

fn well_formed(key: &str) -> bool {
  !key.is_empty() && key.len() <= 64 && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl SessionKey {
  pub fn as_str(&self) -> &str {
    &self.value
  }

  /// Adds the session cookie to a response when the key is new.
  pub fn set_cookie_on(&self, builder: &mut HttpResponseBuilder) {
    if self.fresh {
      builder.cookie(
        Cookie::build(SESSION_COOKIE, self.value.clone())
          .path("/")
          .http_only(true)
          .same_site(SameSite::Lax)
          .finish(),
      );
    }
  }
}

impl FromRequest for SessionKey {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
      if well_formed(cookie.value()) {
        return ready(Ok(SessionKey {
          value: cookie.value().to_string(),
          fresh: false,
        }));
      }
      warn!("Ignoring malformed session cookie.");
    }
    let value = Uuid::new_v4().simple().to_string();
    debug!(session = %value, "Starting new cart session.");
    ready(Ok(SessionKey { value, fresh: true }))
  }
}

/// The user behind a valid `Authorization: Bearer <access token>` header.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub user: User,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = req.app_data::<web::Data<AppState>>().cloned();
    let token = req
      .headers()
      .get(actix_web::http::header::AUTHORIZATION)
      .and_then(|value| value.to_str().ok())
      .and_then(bearer_token)
      .map(str::to_string);

    Box::pin(async move {
      let state = state.ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;
      let token = token.ok_or_else(|| {
        warn!("Request without bearer token on an authenticated route.");
        AppError::from(primebasket::ShopError::auth(
          "Authentication credentials were not provided.",
        ))
      })?;
      let user = state.shop.auth.authenticate(&token).await?;
      Ok(AuthenticatedUser { user })
    })
  }
}

#[cfg(test)]
mod tests {
  use super::well_formed;

  #[test]
  fn session_keys_are_bounded() {
    assert!(well_formed("3f2a9c0e4b6d4f1a8e7c5b3a2d1f0e9c"));
    assert!(!well_formed(""));
    assert!(!well_formed("has space"));
    assert!(!well_formed(&"a".repeat(65)));
  }
}
