// server/src/web/routes.rs

use actix_web::{web, HttpResponse};

use crate::state::AppState;
use crate::web::handlers::{auth_handlers, cart_handlers, product_handlers};

async fn health_check_handler(app_state: web::Data<AppState>) -> HttpResponse {
  let storage = if app_state.config.database_url.is_some() {
    "postgres"
  } else {
    "memory"
  };
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok", "storage": storage }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/health", web::get().to(health_check_handler))
    .service(
      web::scope("/api")
        // Accounts
        .service(
          web::scope("/auth")
            .route("/register/", web::post().to(auth_handlers::register_handler))
            .route("/login/", web::post().to(auth_handlers::login_handler))
            .service(
              web::resource("/reset-password/")
                .route(web::put().to(auth_handlers::reset_password_handler))
                .route(web::patch().to(auth_handlers::reset_password_handler)),
            ),
        )
        .route("/token/", web::post().to(auth_handlers::token_obtain_handler))
        .route("/token/refresh/", web::post().to(auth_handlers::token_refresh_handler))
        .route("/dashboard/", web::get().to(auth_handlers::dashboard_handler))
        // Catalog and cart
        .service(
          web::scope("/shop")
            .route("/products/", web::get().to(product_handlers::list_products_handler))
            .route(
              "/products/{product_id}/",
              web::get().to(product_handlers::get_product_handler),
            )
            .route("/search/", web::get().to(product_handlers::search_handler))
            .route("/cart/", web::get().to(cart_handlers::get_cart_handler))
            .route("/cart/add/", web::post().to(cart_handlers::add_to_cart_handler))
            .route("/cart/remove/", web::post().to(cart_handlers::remove_from_cart_handler))
            .route("/cart/update/", web::post().to(cart_handlers::update_cart_handler)),
        ),
    );
}
