// server/src/web/mod.rs

pub mod extractors;
pub mod handlers;
pub mod routes;


use actix_web::{error::InternalError, web, HttpResponse, ResponseError};

use primebasket::ShopError;

use crate::errors::AppError;

pub use routes::configure_app_routes;

/// Malformed JSON bodies answer with the same `{"error": ...}` shape as every
/// other failure.
pub fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().error_handler(|err, _req| {
    let response: HttpResponse = AppError::BadRequest(err.to_string()).error_response();
    InternalError::from_response(err, response).into()
  })
}

pub fn query_config() -> web::QueryConfig {
  web::QueryConfig::default().error_handler(|err, _req| {
    let response: HttpResponse = AppError::BadRequest(err.to_string()).error_response();
    InternalError::from_response(err, response).into()
  })
}

/// A path segment that does not parse (e.g. a non-numeric product id) is an
/// unknown resource.
pub fn path_config() -> web::PathConfig {
  web::PathConfig::default().error_handler(|err, _req| {
    let response: HttpResponse = AppError::from(ShopError::not_found("Not found.")).error_response();
    InternalError::from_response(err, response).into()
  })
}
