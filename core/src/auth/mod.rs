// core/src/auth/mod.rs

//! Accounts: registration, sign-in, JWT issue/refresh and password changes.

pub mod flows;
pub mod password;
pub mod tokens;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::error::{Result, ShopError};
use crate::flow::{ContextData, Flows, PipelineResult};
use crate::models::User;
use crate::store::UserStore;
use flows::{LoginCtxData, RegisterCtxData, ResetPasswordCtxData};
pub use tokens::{bearer_token, Claims, TokenConfig, TokenKind, TokenPair, TokenService};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
  pub username: String,
  pub email: String,
  pub password: String,
  pub password2: String,
  pub first_name: String,
  pub last_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RefreshRequest {
  pub refresh: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResetPasswordRequest {
  pub password: String,
  pub password2: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
  pub refresh: String,
  pub access: String,
  pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessToken {
  pub access: String,
}

pub struct AuthService {
  users: Arc<dyn UserStore>,
  tokens: Arc<TokenService>,
  flows: Arc<Flows<ShopError>>,
}

fn stopped(flow: &str) -> ShopError {
  ShopError::Internal(format!("{} flow stopped before completing", flow))
}

impl AuthService {
  pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenService>, flows: Arc<Flows<ShopError>>) -> Self {
    Self { users, tokens, flows }
  }

  pub fn tokens(&self) -> &TokenService {
    &self.tokens
  }

  #[instrument(name = "AuthService::register", skip(self, request), fields(username = %request.username))]
  pub async fn register(&self, request: RegisterRequest) -> Result<User> {
    let ctx_data = ContextData::new(RegisterCtxData {
      users: self.users.clone(),
      username: request.username,
      email: request.email,
      password: request.password,
      password2: request.password2,
      first_name: request.first_name,
      last_name: request.last_name,
      password_hash: None,
      created_user: None,
    });

    match self.flows.run(ctx_data.clone()).await? {
      PipelineResult::Completed => ctx_data
        .write()
        .created_user
        .take()
        .ok_or_else(|| ShopError::Internal("registration completed without a user".to_string())),
      PipelineResult::Stopped => Err(stopped("register")),
    }
  }

  /// Checks credentials and issues a token pair. Any mismatch is reported as
  /// `Invalid Credentials` without saying which part was wrong.
  #[instrument(name = "AuthService::login", skip(self, request), fields(username = %request.username))]
  pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
    let ctx_data = ContextData::new(LoginCtxData {
      users: self.users.clone(),
      tokens: self.tokens.clone(),
      username: request.username,
      password: request.password,
      user: None,
      issued: None,
    });

    match self.flows.run(ctx_data.clone()).await? {
      PipelineResult::Completed => {
        let mut guard = ctx_data.write();
        match (guard.user.take(), guard.issued.take()) {
          (Some(user), Some(pair)) => {
            info!(user_id = user.id, "User signed in.");
            Ok(LoginResponse {
              refresh: pair.refresh,
              access: pair.access,
              user,
            })
          }
          _ => Err(ShopError::Internal("login completed without tokens".to_string())),
        }
      }
      PipelineResult::Stopped => Err(stopped("login")),
    }
  }

  /// Same credential check as `login`, returning only the tokens.
  pub async fn obtain_tokens(&self, request: LoginRequest) -> Result<TokenPair> {
    let response = self.login(request).await?;
    Ok(TokenPair {
      refresh: response.refresh,
      access: response.access,
    })
  }

  #[instrument(name = "AuthService::refresh", skip_all)]
  pub async fn refresh(&self, request: RefreshRequest) -> Result<AccessToken> {
    if request.refresh.trim().is_empty() {
      return Err(ShopError::validation("Refresh token is required."));
    }
    let (claims, access) = self.tokens.refresh_access(request.refresh.trim())?;
    // A refresh token must not outlive its account.
    if self.users.find_by_id(claims.user_id()?).await?.is_none() {
      warn!(sub = %claims.sub, "Refresh for a user that no longer exists.");
      return Err(ShopError::auth("User not found"));
    }
    Ok(AccessToken { access })
  }

  /// Resolves a bearer access token to its user.
  pub async fn authenticate(&self, access_token: &str) -> Result<User> {
    let claims = self.tokens.validate(access_token, TokenKind::Access)?;
    self
      .users
      .find_by_id(claims.user_id()?)
      .await?
      .ok_or_else(|| ShopError::auth("User not found"))
  }

  #[instrument(name = "AuthService::reset_password", skip(self, user, request), fields(user_id = user.id))]
  pub async fn reset_password(&self, user: &User, request: ResetPasswordRequest) -> Result<()> {
    let ctx_data = ContextData::new(ResetPasswordCtxData {
      users: self.users.clone(),
      user_id: user.id,
      username: user.username.clone(),
      password: request.password,
      password2: request.password2,
      password_hash: None,
    });

    match self.flows.run(ctx_data).await? {
      PipelineResult::Completed => Ok(()),
      PipelineResult::Stopped => Err(stopped("reset_password")),
    }
  }
}
