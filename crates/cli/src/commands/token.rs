//! `ait token` — Save or remove the API token.

use ait_memory::SlotDir;
use ait_workflow::SessionSettings;

pub async fn set(value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let settings = SessionSettings::with_slots(SlotDir::new(config.data_dir()), None)?;
    settings.set_credential(value)?;

    if settings.has_credential() {
        println!("🔑 Token saved.");
    } else {
        println!("🗑️  Empty token given, saved token removed.");
    }
    Ok(())
}

pub async fn clear() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let settings = SessionSettings::with_slots(SlotDir::new(config.data_dir()), None)?;
    settings.clear_credential()?;
    println!("🗑️  Saved token removed.");
    Ok(())
}
