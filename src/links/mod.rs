//! # Links Module
//!
//! Per-user bookmarked links. Every route sits behind the authorization gate
//! and every query is scoped to the caller.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;
pub mod validators;


pub use routes::links_routes;
pub use store::{LinkStore, PgLinkStore};
