//! Conversational turns handed to the completion provider.
//!
//! Context experiences become turns in order (oldest first), and the live
//! query is always the final turn with an empty response.

use serde::{Deserialize, Serialize};

/// One (query, response) exchange in the history sent to a completer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub query: String,
    pub response: String,
}

impl Turn {
    pub fn new(query: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            response: response.into(),
        }
    }

    /// The live query, still waiting for its response.
    pub fn pending(query: impl Into<String>) -> Self {
        Self::new(query, String::new())
    }

    pub fn is_pending(&self) -> bool {
        self.response.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_turn_has_empty_response() {
        let turn = Turn::pending("Does a pear sink in water?");
        assert!(turn.is_pending());
        assert_eq!(turn.response, "");
        assert!(!Turn::new("q", "a").is_pending());
    }
}
