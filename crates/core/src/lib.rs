//! # Ait Core
//!
//! Domain types, collaborator traits, and error definitions for Ait, a
//! human-in-the-loop workflow that turns a query into a stored experience.
//! This crate has no runtime dependencies beyond serialization and hashing:
//! it defines the model every other crate implements against.
//!
//! ## Collaborators
//!
//! The workflow talks to three collaborators, each defined as a trait here:
//! - [`ExperienceStore`] ranks, reads, and persists experiences
//! - [`Embedder`] maps text to a vector
//! - [`Completer`] maps an ordered list of [`Turn`]s to a response
//!
//! Implementations live in `ait-memory` and `ait-providers`, and tests swap in
//! scripted stand-ins.

pub mod error;
pub mod event;
pub mod experience;
pub mod message;
pub mod provider;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, Stage, StoreError, ValidationError};
pub use event::{EventBus, WorkflowEvent};
pub use experience::{EmbeddedQuery, Experience, ExperienceId};
pub use message::Turn;
pub use provider::{Completer, Embedder};
pub use store::ExperienceStore;
