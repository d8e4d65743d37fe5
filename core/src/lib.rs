// src/lib.rs

//! PrimeBasket: catalog, session cart and account services for a small shop.
//!
//! The crate is storage agnostic. Services talk to the traits in [`store`];
//! `PgStore` implements them over PostgreSQL and `MemoryStore` in process.
//! Multi-step writes (cart mutations, registration, sign-in, password reset)
//! run as named-step pipelines from [`flow`], and reads are served through
//! TTL caches from [`cache`].
//!
//! Build everything through [`Shop::new`]:
//!
//! ```ignore
//! let stores = Stores::postgres(pool);
//! let shop = Shop::new(stores, ShopConfig::new(TokenConfig::new(secret)))?;
//! let page = shop.catalog.list_products("page=2", &query).await?;
//! ```

pub mod auth;
pub mod cache;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod flow;
pub mod models;
pub mod sanitize;
pub mod shop;
pub mod similarity;
pub mod store;

pub use crate::auth::{AuthService, TokenConfig, TokenService};
pub use crate::cart::CartService;
pub use crate::catalog::{CatalogService, ListQuery};
pub use crate::error::{FlowError, Result, ShopError};
pub use crate::shop::{Shop, ShopConfig, Stores};
pub use crate::similarity::{TextSimilarity, Trigram};
pub use crate::store::{MemoryStore, PgStore};
