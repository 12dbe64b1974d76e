//! Session domain module.
//!
//! This module contains the authenticated-session model, the durable token
//! storage interface, and the process-wide [`SessionStore`].
//!
//! # Module Structure
//!
//! - `model`: `Session`, `UserIdentity`, `StoredTokens`
//! - `token`: local decoding of access-token expiry claims
//! - `repository`: `TokenStore` trait and an in-memory implementation
//! - `store`: `SessionStore`, the single source of truth for who is logged in
//!
//! # Usage
//!
//! ```ignore
//! use humloop_core::session::{Session, SessionStore, TokenStore};
//! ```

mod model;
mod repository;
mod store;
pub mod token;

// Re-export public API
pub use model::{Session, StoredTokens, UserIdentity};
pub use repository::{InMemoryTokenStore, TokenStore};
pub use store::SessionStore;
