use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Merchant defaults stored as TOML. All fields are optional; CLI flags
/// take precedence over whatever is configured here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default PIX key (phone, email, CPF/CNPJ or random key).
    pub pix_key: Option<String>,
    /// Merchant name shown by the payer's bank app.
    pub merchant_name: Option<String>,
    /// Merchant city.
    pub merchant_city: Option<String>,
}

impl AppConfig {
    /// Config file path: ~/.config/pixcola/config.toml
    pub fn path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pixcola");
        config_dir.join("config.toml")
    }

    /// Load config from disk, or return defaults.
    pub fn load() -> Self {
        let path = Self::path();
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
        }
        Self::default()
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;
        tracing::info!("Config saved to {}", path.display());
        Ok(())
    }
}
