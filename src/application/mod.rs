//! Application layer: documents, subscriptions and script replay
//!
//! This layer drives the domain store and owns file-based inputs.

pub mod document;
pub mod error;
pub mod script;

pub use document::{Document, Subscription};
pub use error::{ApplicationError, ApplicationResult};
pub use script::{Script, ScriptOutcome, ScriptRunner, Step};
