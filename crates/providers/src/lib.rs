//! Provider implementations for Ait.
//!
//! Providers implement the `ait_core::Embedder` and `ait_core::Completer`
//! traits.

pub mod openai_compat;

pub use openai_compat::{DEFAULT_SYSTEM_PROMPT, OpenAiCompatProvider};
