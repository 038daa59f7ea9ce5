//! HTTP middleware and extractors for the cart API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with `request_id` and `user_id` fields)
//! 3. Request ID (reuse or generate, echo in response)
//!
//! Cart owners are resolved per handler by the [`CartOwner`] and
//! [`MergeIdentity`] extractors.

pub mod owner;
pub mod request_id;

pub use owner::{CartOwner, MergeIdentity, SESSION_KEY_HEADER};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
