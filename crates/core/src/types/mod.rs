//! Core types for Cartwheel.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod owner;
pub mod price;
pub mod session;
pub mod status;

pub use id::*;
pub use owner::Owner;
pub use price::Price;
pub use session::{SessionKey, SessionKeyError};
pub use status::*;
