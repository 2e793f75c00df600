use anyhow::{Context, Result};
use config::{Config, Environment, File};
use navigator::analytics::prefixed_id;
use navigator::client::{ChatClientConfig, DEFAULT_HOST};
use navigator::overflow::{OverflowPromoter, DEFAULT_HEIGHT_THRESHOLD, DEFAULT_LINE_THRESHOLD};
use navigator::stream::DEFAULT_PACING;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const USER_ID_FILE: &str = "user_id";

#[derive(Debug, Clone, Deserialize)]
pub struct OverflowSettings {
    pub height: u32,
    pub lines: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsSettings {
    /// Events are only logged when no endpoint is configured
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    pub host: String,
    #[serde(default)]
    pub token: Option<String>,
    /// Overrides the server's streaming flag when set
    #[serde(default)]
    pub stream: Option<bool>,
    pub pacing_ms: u64,
    pub overflow: OverflowSettings,
    #[serde(default)]
    pub analytics: AnalyticsSettings,
}

impl CliConfig {
    /// Defaults, then `~/.config/navigator/config.toml`, then `NAVIGATOR_*` variables
    pub fn load() -> Result<Self> {
        let file = config_dir().ok().map(|dir| dir.join("config.toml"));
        Self::load_from(file)
    }

    pub fn load_from(file: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("host", DEFAULT_HOST)?
            .set_default("pacing_ms", DEFAULT_PACING.as_millis() as i64)?
            .set_default("overflow.height", DEFAULT_HEIGHT_THRESHOLD as i64)?
            .set_default("overflow.lines", DEFAULT_LINE_THRESHOLD as i64)?;

        if let Some(file) = file {
            builder = builder.add_source(File::from(file).required(false));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("NAVIGATOR")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: CliConfig = config
            .try_deserialize()
            .context("Invalid navigator configuration")?;
        tracing::debug!(host = %settings.host, "Loaded configuration");
        Ok(settings)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn client_config(&self) -> ChatClientConfig {
        ChatClientConfig {
            host: self.host.clone(),
            token: self.token.clone(),
            ..Default::default()
        }
    }

    pub fn promoter(&self) -> OverflowPromoter {
        OverflowPromoter::new(self.overflow.height, self.overflow.lines)
    }
}

pub fn config_dir() -> Result<PathBuf> {
    let home_dir =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(home_dir.join(".config").join("navigator"))
}

/// The analytics user id stored in `dir`, created on first use
pub fn user_id(dir: &Path) -> Result<String> {
    let path = dir.join(USER_ID_FILE);
    if let Ok(existing) = fs::read_to_string(&path) {
        let existing = existing.trim();
        if !existing.is_empty() {
            return Ok(existing.to_string());
        }
    }

    fs::create_dir_all(dir)?;
    let id = prefixed_id("user");
    fs::write(&path, &id).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(id)
}
