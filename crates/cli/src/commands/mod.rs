//! Subcommand implementations.

pub mod history;
pub mod onboard;
pub mod session;
pub mod status;
pub mod token;

use ait_config::AppConfig;
use ait_memory::{HistoryStore, SlotDir};
use ait_providers::OpenAiCompatProvider;
use ait_workflow::{SessionSettings, Workflow, WorkflowOptions};
use std::sync::Arc;

pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Wire the history store, the provider and the saved credential into a
/// workflow.
pub fn open_workflow(config: &AppConfig) -> Result<Workflow, Box<dyn std::error::Error>> {
    let slots = SlotDir::new(config.data_dir());
    let store = Arc::new(HistoryStore::load(slots.clone())?);
    let provider = Arc::new(OpenAiCompatProvider::from_config(&config.provider)?);
    let settings = SessionSettings::with_slots(slots, config.api_key.clone())?;

    Ok(Workflow::new(
        store,
        provider.clone(),
        provider,
        settings,
        WorkflowOptions::from_config(config),
    ))
}

/// Collapse whitespace and cut to `max` characters for one-line display.
pub fn preview(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_flattens_and_truncates() {
        assert_eq!(preview("a\n  b", 10), "a b");
        assert_eq!(preview("abcdefghij", 5), "abcd…");
        assert_eq!(preview("ünïcode", 7), "ünïcode");
    }
}
