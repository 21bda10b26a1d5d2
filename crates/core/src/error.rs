//! Error types for the Ait domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the workflow folds them into
//! the top-level [`Error`].

use thiserror::Error;

use crate::experience::ExperienceId;

/// The top-level error type for all Ait operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Rejected before any remote call ---
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // --- Embedding / completion provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Experience store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The session moved on (restart, new query) while this call was pending.
    #[error("Result discarded: the session changed while the call was in flight")]
    Superseded,
}

impl Error {
    /// Whether this error came from a remote collaborator.
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Provider(_))
    }

    /// Whether this error was a local precondition failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Which workflow stage a busy flag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Query,
    Context,
    Store,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Query => "query",
            Stage::Context => "context",
            Stage::Store => "store",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No API token has been provided")]
    MissingCredential,

    #[error("Query is empty")]
    EmptyQuery,

    #[error("Response is empty")]
    EmptyResponse,

    #[error("No query has been submitted")]
    NoQuery,

    #[error("Context has not been built yet")]
    ContextNotBuilt,

    #[error("No response has been generated yet")]
    NoResponse,

    #[error("The {0} stage is already in flight")]
    Busy(Stage),
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Experience not found: {0}")]
    NotFound(ExperienceId),

    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),
}
