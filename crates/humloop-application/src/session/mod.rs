//! Session lifecycle use cases.
//!
//! # Module Structure
//!
//! - `manager`: `SessionManager` - restore, login, logout, register

mod manager;

pub use manager::SessionManager;
