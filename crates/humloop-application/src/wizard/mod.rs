//! Async driver for the generation wizard.

mod controller;

pub use controller::{GenerationWizard, WizardEvent};
