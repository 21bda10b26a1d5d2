//! `ait status` — Show configuration and store status.

use ait_config::AppConfig;
use ait_core::store::ExperienceStore;
use ait_memory::slots::{CREDENTIAL_SLOT, HISTORY_SLOT};
use ait_memory::{HistoryStore, SlotDir};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let slots = SlotDir::new(config.data_dir());

    let token = if slots.read(CREDENTIAL_SLOT)?.is_some() {
        "saved"
    } else if config.has_api_key() {
        "from config/env"
    } else {
        "missing"
    };

    println!("Ait Status");
    println!("==========");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Data dir:     {}", config.data_dir().display());
    println!("  Provider:     {} ({})", config.provider.name, config.provider.api_url);
    println!("  Chat model:   {}", config.provider.chat_model);
    println!("  Embeddings:   {}", config.provider.embedding_model);
    println!("  Temperature:  {}", config.provider.temperature);
    println!("  Window:       {}", config.workflow.context_window);
    println!("  Token:        {token}");

    if slots.read(HISTORY_SLOT)?.is_some() {
        let store = HistoryStore::load(slots)?;
        println!("  Experiences:  {}", store.len().await?);
    } else {
        println!("  Experiences:  (no history yet — seeded on first session)");
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `ait onboard` first");
    }

    Ok(())
}
