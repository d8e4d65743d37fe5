// core/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct User {
  pub id: i64,
  pub username: String,
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
  pub username: String,
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  pub password_hash: String,
}
