//! Workflow engine for Ait.
//!
//! Drives a single session through query → context → response → store,
//! with a human curating the context and editing the response in between.
//! The engine only talks to its collaborators through the traits in
//! `ait-core`, so tests run it against scripted stand-ins.

pub mod alert;
pub mod curator;
pub mod engine;
pub mod session;
pub mod settings;

pub use alert::AlertChannel;
pub use curator::ContextCurator;
pub use engine::{Visibility, Workflow, WorkflowOptions};
pub use session::{DraftResponse, SessionState, WorkflowState};
pub use settings::{HistoryAction, SessionSettings};
