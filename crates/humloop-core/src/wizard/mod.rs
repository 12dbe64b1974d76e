//! Generation wizard domain module.
//!
//! The wizard drives one AI generation run through
//! `AwaitingUpload → AwaitingDetails → Processing → {Complete | Failed}`.
//! This module holds the synchronous state machine; the async driver that
//! calls the backend lives in the application layer.
//!
//! # Module Structure
//!
//! - `model`: steps, options, results and the ticket handed to the driver
//! - `failure`: classification of backend failures into user messages
//! - `machine`: `WizardSession`, the transition functions
//! - `progress`: the simulated progress shown while processing
//! - `service`: `GenerationService`, the seam to the AI backend

mod failure;
mod machine;
mod model;
mod progress;
mod service;

pub use failure::{GenerationErrorBody, GenerationFailure};
pub use machine::{Resolution, WizardSession};
pub use model::{
    GenerationMode, GenerationOptions, GenerationResult, GenerationTicket, WizardStep,
};
pub use progress::ProcessingProgress;
pub use service::GenerationService;
