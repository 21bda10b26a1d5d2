//! Default dataset written on first run and restored by `reset`.
//!
//! Seed experiences carry no embedding; they rank with similarity 0 until
//! enough embedded experiences exist to outrank them.

use ait_core::experience::Experience;

const SEED: &[(&str, &str)] = &[
    (
        "What is Ait?",
        "Ait is a workspace for building a personal knowledge base one answer at a time. \
         You ask a question, choose which earlier answers to use as context, review the \
         generated reply, and store the version you are happy with.",
    ),
    (
        "How does Ait choose context for a new question?",
        "It embeds the question, ranks stored experiences by cosine similarity to that \
         embedding, and shows the closest few. You can drop any of them or widen the \
         window before a response is generated.",
    ),
    (
        "What happens when I store a response?",
        "The question and your final response are embedded together and saved with links \
         to the experiences that were used as context. The new experience can then be \
         suggested as context for later questions.",
    ),
];

/// The fixed seed dataset, oldest first.
pub fn default_experiences() -> Vec<Experience> {
    SEED.iter()
        .map(|(query, response)| Experience::new(*query, *response, Vec::new(), Vec::new()))
        .collect()
}
