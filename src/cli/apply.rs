use anyhow::{bail, Context};
use funnelcraft_canvas::{CanvasEditor, EditCommand, SwitchOutcome};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::settings::load_config;

pub async fn run(step: String, script: PathBuf) -> anyhow::Result<()> {
    let config = load_config()?;
    let raw = tokio::fs::read_to_string(&script)
        .await
        .with_context(|| format!("Failed to read {}", script.display()))?;
    let commands: Vec<EditCommand> =
        serde_json::from_str(&raw).context("Script must be a JSON array of edit commands")?;

    let store = Arc::new(super::open_store(&config.database_url).await?);
    let mut editor = CanvasEditor::new(store, config.canvas)?;

    if !matches!(editor.switch_step(step.as_str()).await, SwitchOutcome::Loaded(_)) {
        bail!("Failed to load step {step}");
    }

    let mut applied = 0usize;
    for (index, command) in commands.into_iter().enumerate() {
        let name = command.as_str();
        let mutation = command.is_mutation();
        if editor.apply(command) {
            applied += 1;
        } else if mutation {
            warn!(index, command = name, "Command had no effect");
        } else {
            debug!(index, command = name, "Command had no effect");
        }
    }

    let saved = editor.flush().await?;
    info!(step = %step, applied, saved, "Script applied");

    println!("{}", serde_json::to_string_pretty(editor.elements())?);
    editor.close().await?;
    Ok(())
}
