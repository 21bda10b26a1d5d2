//! Experience store implementations for Ait.

pub mod history;
pub mod in_memory;
pub mod seed;
pub mod slots;
pub mod vector;

pub use history::HistoryStore;
pub use in_memory::InMemoryStore;
pub use seed::default_experiences;
pub use slots::{CREDENTIAL_SLOT, HISTORY_SLOT, SlotDir};
pub use vector::{cosine_similarity, rank_by_similarity};
