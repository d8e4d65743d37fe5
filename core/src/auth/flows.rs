// core/src/auth/flows.rs

//! Register, login and password-reset pipelines.

use std::sync::Arc;
use tracing::{event, info, warn, Level};

use super::password;
use super::tokens::{TokenPair, TokenService};
use crate::error::ShopError;
use crate::flow::{ContextData, Flows, Pipeline, PipelineControl};
use crate::models::{NewUser, User};
use crate::store::UserStore;

pub const MIN_PASSWORD_LEN: usize = 8;

pub struct RegisterCtxData {
  pub users: Arc<dyn UserStore>,
  pub username: String,
  pub email: String,
  pub password: String,
  pub password2: String,
  pub first_name: String,
  pub last_name: String,
  pub password_hash: Option<String>,
  pub created_user: Option<User>,
}

pub struct LoginCtxData {
  pub users: Arc<dyn UserStore>,
  pub tokens: Arc<TokenService>,
  pub username: String,
  pub password: String,
  pub user: Option<User>,
  pub issued: Option<TokenPair>,
}

pub struct ResetPasswordCtxData {
  pub users: Arc<dyn UserStore>,
  pub user_id: i64,
  pub username: String,
  pub password: String,
  pub password2: String,
  pub password_hash: Option<String>,
}

/// Length first, then the confirmation match.
pub(crate) fn check_new_password(password: &str, password2: &str) -> Result<(), ShopError> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(ShopError::validation(format!(
      "Password must be at least {} characters long.",
      MIN_PASSWORD_LEN
    )));
  }
  if password != password2 {
    return Err(ShopError::validation("Password fields didn't match."));
  }
  Ok(())
}

fn invalid_credentials() -> ShopError {
  ShopError::auth("Invalid Credentials")
}

pub(crate) fn register_auth_flows(flows: &Flows<ShopError>) {
  flows.register_pipeline(register_pipeline());
  flows.register_pipeline(login_pipeline());
  flows.register_pipeline(reset_password_pipeline());
}

fn register_pipeline() -> Pipeline<RegisterCtxData, ShopError> {
  let mut p = Pipeline::<RegisterCtxData, ShopError>::new(
    "register",
    &["validate_registration", "ensure_username_free", "hash_password", "create_user"],
  );

  p.on_step("validate_registration", |ctx_data: ContextData<RegisterCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      event!(Level::DEBUG, username = %guard.username, "Validating registration input.");
      if guard.username.trim().is_empty() {
        return Err(ShopError::validation("Username is required."));
      }
      if !guard.email.contains('@') {
        return Err(ShopError::validation("Enter a valid email address."));
      }
      check_new_password(&guard.password, &guard.password2)?;
      Ok(PipelineControl::Continue)
    })
  });

  p.on_step("ensure_username_free", |ctx_data: ContextData<RegisterCtxData>| {
    Box::pin(async move {
      let (users, username) = {
        let guard = ctx_data.read();
        (guard.users.clone(), guard.username.trim().to_string())
      };
      if users.find_by_username(&username).await?.is_some() {
        warn!(%username, "Registration with a taken username.");
        return Err(ShopError::validation(crate::store::USERNAME_TAKEN));
      }
      Ok::<_, ShopError>(PipelineControl::Continue)
    })
  });

  p.on_step("hash_password", |ctx_data: ContextData<RegisterCtxData>| {
    Box::pin(async move {
      let password = ctx_data.read().password.clone();
      let hash = password::hash_password(&password)?;
      ctx_data.write().password_hash = Some(hash);
      Ok::<_, ShopError>(PipelineControl::Continue)
    })
  });

  p.on_step("create_user", |ctx_data: ContextData<RegisterCtxData>| {
    Box::pin(async move {
      let (users, new_user) = {
        let guard = ctx_data.read();
        let password_hash = guard
          .password_hash
          .clone()
          .ok_or_else(|| ShopError::Internal("password hash missing before user creation".to_string()))?;
        let new_user = NewUser {
          username: guard.username.trim().to_string(),
          email: guard.email.trim().to_string(),
          first_name: guard.first_name.clone(),
          last_name: guard.last_name.clone(),
          password_hash,
        };
        (guard.users.clone(), new_user)
      };
      // The store enforces uniqueness again; two concurrent registrations can
      // both pass ensure_username_free.
      let user = users.create_user(new_user).await?;
      info!(user_id = user.id, username = %user.username, "User registered.");
      ctx_data.write().created_user = Some(user);
      Ok::<_, ShopError>(PipelineControl::Continue)
    })
  });

  p
}

fn login_pipeline() -> Pipeline<LoginCtxData, ShopError> {
  let mut p = Pipeline::<LoginCtxData, ShopError>::new(
    "login",
    &["validate_login_input", "fetch_user", "verify_password", "issue_tokens"],
  );

  p.on_step("validate_login_input", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      if guard.username.trim().is_empty() || guard.password.is_empty() {
        warn!("Login without username or password.");
        return Err(invalid_credentials());
      }
      Ok(PipelineControl::Continue)
    })
  });

  p.on_step("fetch_user", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let (users, username) = {
        let guard = ctx_data.read();
        // Stored usernames are trimmed at registration.
        (guard.users.clone(), guard.username.trim().to_string())
      };
      match users.find_by_username(&username).await? {
        Some(user) => {
          event!(Level::DEBUG, user_id = user.id, "User found for login.");
          ctx_data.write().user = Some(user);
          Ok(PipelineControl::Continue)
        }
        None => {
          warn!(%username, "Login for unknown user.");
          Err(invalid_credentials())
        }
      }
    })
  });

  p.on_step("verify_password", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      let user = guard
        .user
        .as_ref()
        .ok_or_else(|| ShopError::Internal("user missing before password check".to_string()))?;
      if !password::verify_password(&user.password_hash, &guard.password)? {
        warn!(user_id = user.id, "Password mismatch on login.");
        return Err(invalid_credentials());
      }
      Ok(PipelineControl::Continue)
    })
  });

  p.on_step("issue_tokens", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let pair = {
        let guard = ctx_data.read();
        let user = guard
          .user
          .as_ref()
          .ok_or_else(|| ShopError::Internal("user missing before token issue".to_string()))?;
        guard.tokens.issue_pair(user)?
      };
      ctx_data.write().issued = Some(pair);
      Ok::<_, ShopError>(PipelineControl::Continue)
    })
  });

  p
}

fn reset_password_pipeline() -> Pipeline<ResetPasswordCtxData, ShopError> {
  let mut p = Pipeline::<ResetPasswordCtxData, ShopError>::new(
    "reset_password",
    &["validate_new_password", "hash_password", "store_password"],
  );

  p.on_step("validate_new_password", |ctx_data: ContextData<ResetPasswordCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      info!(username = %guard.username, "Attempting password reset.");
      if let Err(e) = check_new_password(&guard.password, &guard.password2) {
        event!(Level::ERROR, username = %guard.username, error = %e, "Password reset failed: invalid data.");
        return Err(e);
      }
      Ok(PipelineControl::Continue)
    })
  });

  p.on_step("hash_password", |ctx_data: ContextData<ResetPasswordCtxData>| {
    Box::pin(async move {
      let password = ctx_data.read().password.clone();
      let hash = password::hash_password(&password)?;
      ctx_data.write().password_hash = Some(hash);
      Ok::<_, ShopError>(PipelineControl::Continue)
    })
  });

  p.on_step("store_password", |ctx_data: ContextData<ResetPasswordCtxData>| {
    Box::pin(async move {
      let (users, user_id, username, hash) = {
        let guard = ctx_data.read();
        let hash = guard
          .password_hash
          .clone()
          .ok_or_else(|| ShopError::Internal("password hash missing before store".to_string()))?;
        (guard.users.clone(), guard.user_id, guard.username.clone(), hash)
      };
      if let Err(e) = users.update_password(user_id, &hash).await {
        event!(Level::ERROR, %username, error = %e, "Password reset failed while saving.");
        return Err(e);
      }
      info!(%username, "Password updated.");
      Ok(PipelineControl::Continue)
    })
  });

  p
}
