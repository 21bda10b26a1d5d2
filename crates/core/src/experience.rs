//! Experience domain types.
//!
//! An experience is a finalized (query, response) exchange together with the
//! embedding of the completed exchange and the ids of the experiences that
//! were used as its context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Content identifier of an experience.
///
/// Always the lowercase hex encoding of a SHA-256 digest, so two ids compare
/// equal exactly when they name the same content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperienceId(String);

impl ExperienceId {
    /// Derive the id of a (query, response) pair.
    ///
    /// The query is length-prefixed so the boundary between the two fields
    /// is part of the digest.
    pub fn for_content(query: &str, response: &str) -> Self {
        let mut hash = Sha256::new();
        hash.update((query.len() as u64).to_le_bytes());
        hash.update(query.as_bytes());
        hash.update(response.as_bytes());
        Self(format!("{:x}", hash.finalize()))
    }

    /// Parse a canonical id, accepting upper- or lowercase hex.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(Self(s.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 hex characters, for display.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(8)]
    }
}

impl std::fmt::Display for ExperienceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored experience.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    /// Content id, assigned by the store
    pub id: ExperienceId,

    /// The query text
    pub query: String,

    /// The finalized response text
    pub response: String,

    /// Embedding of the completed exchange (empty for unembedded seed data)
    #[serde(default)]
    pub embedding: Vec<f32>,

    /// Experiences used as context when this one was generated, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_ids: Vec<ExperienceId>,

    /// When this experience was stored
    pub created_at: DateTime<Utc>,
}

impl Experience {
    pub fn new(
        query: impl Into<String>,
        response: impl Into<String>,
        embedding: Vec<f32>,
        context_ids: Vec<ExperienceId>,
    ) -> Self {
        let query = query.into();
        let response = response.into();
        Self {
            id: ExperienceId::for_content(&query, &response),
            query,
            response,
            embedding,
            context_ids,
            created_at: Utc::now(),
        }
    }
}

/// A query together with its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedQuery {
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Text that gets embedded when a response is stored: the completed exchange,
/// not the bare query.
pub fn exchange_text(query: &str, response: &str) -> String {
    format!("{query}\n\n{response}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_lowercase_hex_sha256() {
        let id = ExperienceId::for_content("Is a pear buoyant?", "No.");
        assert_eq!(id.as_str().len(), 64);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(id, ExperienceId::for_content("Is a pear buoyant?", "No."));
        assert_ne!(id, ExperienceId::for_content("Is a pear buoyant?", "Yes."));
    }

    #[test]
    fn id_of_empty_content_is_known_digest() {
        let id = ExperienceId::for_content("", "");
        assert_eq!(
            id.as_str(),
            "af5570f5a1810b7af78caf4bc70a660f0df51e42baf91d4de5b2328de0e83dfc"
        );
    }

    #[test]
    fn field_boundary_changes_the_id() {
        assert_ne!(
            ExperienceId::for_content("Hi", "there"),
            ExperienceId::for_content("Hit", "here")
        );
        assert_ne!(
            ExperienceId::for_content("", "ab"),
            ExperienceId::for_content("ab", "")
        );
    }

    #[test]
    fn parse_normalizes_case_and_rejects_garbage() {
        let id = ExperienceId::for_content("q", "r");
        let upper = id.as_str().to_ascii_uppercase();
        assert_eq!(ExperienceId::parse(&upper), Some(id.clone()));
        assert_eq!(ExperienceId::parse("not-an-id"), None);
        assert_eq!(ExperienceId::parse(&id.as_str()[..10]), None);
    }

    #[test]
    fn experience_serialization_skips_empty_context() {
        let exp = Experience::new("q", "r", vec![0.5, 0.5], vec![]);
        let json = serde_json::to_string(&exp).unwrap();
        assert!(!json.contains("context_ids"));
        let back: Experience = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, exp.id);
        assert_eq!(back.embedding, vec![0.5, 0.5]);
    }

    #[test]
    fn exchange_text_joins_with_blank_line() {
        assert_eq!(exchange_text("Q", "A"), "Q\n\nA");
    }
}
