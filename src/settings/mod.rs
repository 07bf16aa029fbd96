//! Application settings
//!
//! Top-level configuration for the `funnelcraft` binary.

mod loader;

pub use loader::load_config;

use funnelcraft_canvas::CanvasConfig;
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite connection string for the element store
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Canvas engine settings
    #[serde(default)]
    pub canvas: CanvasConfig,
}

fn default_database_url() -> String {
    "sqlite://funnelcraft.db?mode=rwc".to_string()
}

#[cfg(test)]
mod tests {
    use super::loader::DEFAULT_CONFIG;
    use super::*;

    #[test]
    fn test_embedded_defaults_deserialize() {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.database_url, default_database_url());
        assert_eq!(config.canvas.history_limit, 50);
        assert_eq!(config.canvas.autosave_debounce_ms, 500);
        assert!(config.canvas.use_cached_steps);
    }

    #[test]
    fn test_missing_canvas_section_uses_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"database_url": "sqlite::memory:"}"#).unwrap();
        assert_eq!(config.canvas.history_limit, 50);
        assert_eq!(config.canvas.event_capacity, 256);
    }
}
