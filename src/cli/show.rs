use funnelcraft_canvas::{ElementStore, StepId};

use crate::settings::load_config;

pub async fn run(step: Option<String>) -> anyhow::Result<()> {
    let config = load_config()?;
    let store = super::open_store(&config.database_url).await?;

    match step {
        Some(step) => {
            let elements = store.get_elements(&StepId::from(step)).await?;
            println!("{}", serde_json::to_string_pretty(&elements)?);
        }
        None => {
            let steps = store.list_steps().await?;
            if steps.is_empty() {
                println!("No steps stored.");
            }
            for step_id in steps {
                let count = store.get_elements(&step_id).await?.len();
                println!("{step_id}\t{count} elements");
            }
        }
    }

    Ok(())
}
