// core/src/auth/tokens.rs

//! HS256 access/refresh token issue and validation.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::error::{Result, ShopError};
use crate::models::User;

pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct TokenConfig {
  /// HMAC secret, at least `MIN_SECRET_LEN` bytes.
  pub secret: String,
  pub issuer: String,
  pub access_ttl: Duration,
  pub refresh_ttl: Duration,
}

impl TokenConfig {
  pub fn new(secret: impl Into<String>) -> Self {
    Self {
      secret: secret.into(),
      issuer: "primebasket".to_string(),
      access_ttl: Duration::minutes(5),
      refresh_ttl: Duration::days(1),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
  Access,
  Refresh,
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TokenKind::Access => f.write_str("access"),
      TokenKind::Refresh => f.write_str("refresh"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
  /// User id.
  pub sub: String,
  pub username: String,
  pub token_type: TokenKind,
  pub iat: i64,
  pub exp: i64,
  pub iss: String,
}

impl Claims {
  pub fn user_id(&self) -> Result<i64> {
    self
      .sub
      .parse()
      .map_err(|_| ShopError::auth("Token has an invalid subject"))
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenPair {
  pub refresh: String,
  pub access: String,
}

#[derive(Clone)]
pub struct TokenService {
  config: TokenConfig,
  encoding_key: EncodingKey,
  decoding_key: DecodingKey,
}

impl fmt::Debug for TokenService {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TokenService")
      .field("issuer", &self.config.issuer)
      .field("access_ttl", &self.config.access_ttl)
      .field("refresh_ttl", &self.config.refresh_ttl)
      .finish_non_exhaustive()
  }
}

impl TokenService {
  /// Fails when the secret is shorter than `MIN_SECRET_LEN`.
  pub fn new(config: TokenConfig) -> Result<Self> {
    if config.secret.len() < MIN_SECRET_LEN {
      return Err(ShopError::Internal(format!(
        "token secret must be at least {} bytes",
        MIN_SECRET_LEN
      )));
    }
    Ok(Self {
      encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
      decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
      config,
    })
  }

  pub fn config(&self) -> &TokenConfig {
    &self.config
  }

  pub fn issue(&self, user: &User, kind: TokenKind) -> Result<String> {
    let now = Utc::now();
    let ttl = match kind {
      TokenKind::Access => self.config.access_ttl,
      TokenKind::Refresh => self.config.refresh_ttl,
    };
    let claims = Claims {
      sub: user.id.to_string(),
      username: user.username.clone(),
      token_type: kind,
      iat: now.timestamp(),
      exp: (now + ttl).timestamp(),
      iss: self.config.issuer.clone(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
      .map_err(|e| ShopError::Internal(format!("Token generation failed: {}", e)))
  }

  pub fn issue_pair(&self, user: &User) -> Result<TokenPair> {
    debug!(user_id = user.id, "Issuing token pair.");
    Ok(TokenPair {
      refresh: self.issue(user, TokenKind::Refresh)?,
      access: self.issue(user, TokenKind::Access)?,
    })
  }

  /// Decodes `token` and checks signature, issuer, expiry and that it is of
  /// the `expected` kind.
  pub fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&self.config.issuer]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation.leeway = 0;

    let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
      let message = match e.kind() {
        ErrorKind::ExpiredSignature => "Token is expired",
        ErrorKind::InvalidSignature => "Token signature is invalid",
        _ => "Token is invalid",
      };
      warn!(error = %e, "Token rejected.");
      ShopError::auth(message)
    })?;

    if data.claims.token_type != expected {
      warn!(got = %data.claims.token_type, want = %expected, "Token of the wrong kind.");
      return Err(ShopError::auth(format!("Token has wrong type, expected {}", expected)));
    }
    Ok(data.claims)
  }

  /// Exchanges a valid refresh token for a new access token.
  pub fn refresh_access(&self, refresh_token: &str) -> Result<(Claims, String)> {
    let claims = self.validate(refresh_token, TokenKind::Refresh)?;
    let now = Utc::now();
    let access_claims = Claims {
      sub: claims.sub.clone(),
      username: claims.username.clone(),
      token_type: TokenKind::Access,
      iat: now.timestamp(),
      exp: (now + self.config.access_ttl).timestamp(),
      iss: self.config.issuer.clone(),
    };
    let access = encode(&Header::new(Algorithm::HS256), &access_claims, &self.encoding_key)
      .map_err(|e| ShopError::Internal(format!("Token generation failed: {}", e)))?;
    Ok((access_claims, access))
  }
}

/// Strips the `Bearer ` prefix from an `Authorization` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
  header
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|t| !t.is_empty())
}
