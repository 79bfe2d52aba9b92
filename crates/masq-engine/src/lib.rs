//! State translation engine for Masquerade
//!
//! The engine mirrors state from base devices onto masquerade devices and
//! turns commands against masquerade devices into base-device actions.
//!
//! # Key Types
//!
//! - [`TranslationEngine`] - entry point for host notifications
//! - [`BindingRegistry`] - bound masquerade devices and their lifecycle state
//!
//! The pure building blocks live in their own modules: [`scale`],
//! [`format`], [`matcher`] and [`presenter`].

mod engine;
mod error;
pub mod format;
pub mod matcher;
pub mod presenter;
mod registry;
pub mod scale;

pub use engine::{Outcome, TranslationEngine};
pub use error::{EngineError, EngineResult};
pub use registry::{BindingRegistry, BindingState, InvalidTransition};
