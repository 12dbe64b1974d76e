//! Application layer for Humloop.
//!
//! Use cases that coordinate the domain core with storage and transports:
//! session lifecycle, the generation wizard driver, and publishing.

pub mod publish;
pub mod session;
pub mod wizard;

pub use publish::PostPublisher;
pub use session::SessionManager;
pub use wizard::{GenerationWizard, WizardEvent};
