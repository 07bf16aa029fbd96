use tracing::info;

use crate::settings::load_config;

pub async fn run() -> anyhow::Result<()> {
    let config = load_config()?;
    let store = super::open_store(&config.database_url).await?;
    let steps = store.list_steps().await?;

    info!(database_url = %config.database_url, steps = steps.len(), "Element store ready");
    println!("Element store ready at {} ({} steps)", config.database_url, steps.len());
    Ok(())
}
