//! `ait history` — Inspect and manage stored experiences.

use ait_core::experience::{Experience, ExperienceId};
use ait_workflow::{Visibility, Workflow};

use super::preview;

pub async fn list(count: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let workflow = super::open_workflow(&config)?;
    let count = count.unwrap_or(config.memory.recent_count);

    let recent = workflow.recent(count).await?;
    if recent.is_empty() {
        println!("   No experiences stored.");
        return Ok(());
    }

    println!("📚 Last {} experience(s)", recent.len());
    println!();
    for exp in &recent {
        print_experience(exp);
    }
    Ok(())
}

pub async fn forget(prefix: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let workflow = super::open_workflow(&config)?;

    let id = resolve_id(&workflow, prefix).await?;
    workflow.forget(&id).await?;
    workflow.on_visibility_change(Visibility::Hidden).await;
    println!("🗑️  Forgot {}", id.short());
    Ok(())
}

pub async fn clear(confirm: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !confirm {
        println!("⚠️  This will delete ALL stored experiences permanently.");
        println!("   Run with --confirm to proceed:");
        println!("   ait history clear --confirm");
        return Ok(());
    }

    let config = super::load_config()?;
    let workflow = super::open_workflow(&config)?;
    workflow.clear_history().await?;
    println!("✅ History cleared.");
    Ok(())
}

pub async fn reset(confirm: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !confirm {
        println!("⚠️  This will replace ALL stored experiences with the defaults.");
        println!("   Run with --confirm to proceed:");
        println!("   ait history reset --confirm");
        return Ok(());
    }

    let config = super::load_config()?;
    let workflow = super::open_workflow(&config)?;
    let remaining = workflow.reset_history().await?;
    println!("✅ History reset ({remaining} default experiences).");
    Ok(())
}

/// Find the single stored id starting with `prefix`.
async fn resolve_id(workflow: &Workflow, prefix: &str) -> Result<ExperienceId, Box<dyn std::error::Error>> {
    if let Some(id) = ExperienceId::parse(prefix) {
        return Ok(id);
    }

    let prefix = prefix.trim().to_ascii_lowercase();
    if prefix.len() < 4 {
        return Err("Give at least 4 characters of the experience id".into());
    }

    let matches: Vec<ExperienceId> = workflow
        .recent(usize::MAX)
        .await?
        .into_iter()
        .map(|e| e.id)
        .filter(|id| id.as_str().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [id] => Ok(id.clone()),
        [] => Err(format!("No experience with id starting with '{prefix}'").into()),
        _ => Err(format!("Id prefix '{prefix}' is ambiguous ({} matches)", matches.len()).into()),
    }
}

pub fn print_experience(exp: &Experience) {
    println!(
        "  [{}] {}",
        exp.id.short(),
        exp.created_at.format("%Y-%m-%d %H:%M")
    );
    println!("      Q: {}", preview(&exp.query, 72));
    println!("      A: {}", preview(&exp.response, 72));
    if !exp.context_ids.is_empty() {
        let ctx: Vec<&str> = exp.context_ids.iter().map(ExperienceId::short).collect();
        println!("      context: {}", ctx.join(", "));
    }
    println!();
}
