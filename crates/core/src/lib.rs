//! Cartwheel Core - Shared types library.
//!
//! This crate provides the vocabulary shared by every Cartwheel component:
//! - `storefront` - Cart engine and JSON API
//! - `cli` - Migrations, catalog seeding and the abandoned-cart sweep
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed ids, session keys, cart ownership, prices and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
