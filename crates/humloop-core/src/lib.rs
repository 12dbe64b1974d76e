//! Domain layer of the Humloop client.
//!
//! Holds the models, rules and state machines shared by every other crate.
//! Nothing in here talks to the network; transports plug in through the
//! traits in [`session`] and [`wizard`].

pub mod audio;
pub mod config;
pub mod error;
pub mod post;
pub mod profile;
pub mod session;
pub mod validation;
pub mod wizard;

// Re-export common error type
pub use error::{HumloopError, Result};
