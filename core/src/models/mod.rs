// core/src/models/mod.rs

//! Rows and wire views for the catalog, carts and accounts.

pub mod cart_item;
pub mod product;
pub mod user;

pub use cart_item::{CartItem, CartLine, CartLineView, CartView, MAX_QUANTITY, MIN_QUANTITY};
pub use product::{NewProduct, Product, ProductView};
pub use user::{NewUser, User};
