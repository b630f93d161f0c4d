use anyhow::{Context, Result};
use finance_client::domain::AmountFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strum::{Display, EnumString};

use crate::app::{FormSettings, DEFAULT_DATE_FORMAT};

const ENV_PREFIX: &str = "FINANCE";

/// Number style used when typing and showing amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum AmountLocale {
    #[default]
    PtBr,
    EnUs,
}

impl AmountLocale {
    pub fn format(self) -> AmountFormat {
        match self {
            AmountLocale::PtBr => AmountFormat::pt_br(),
            AmountLocale::EnUs => AmountFormat::en_us(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceConfig {
    /// Base URL of the finance API server, e.g. "http://localhost:3000"
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub amount_locale: AmountLocale,
    /// chrono format string for dates; ISO dates are always accepted too.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_api_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            amount_locale: AmountLocale::default(),
            date_format: default_date_format(),
        }
    }
}

impl FinanceConfig {
    pub fn config_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Cannot determine config directory")?
            .join("finance-cli")
            .join("config.toml"))
    }

    /// Load config from disk, with `FINANCE_*` environment variables on top.
    /// A missing file means defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).prefix_separator("_"))
            .build()
            .with_context(|| format!("Failed to read config at {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write config at {}", path.display()))?;
        Ok(())
    }

    pub fn form_settings(&self) -> FormSettings {
        FormSettings {
            amount_format: self.amount_locale.format(),
            date_format: self.date_format.clone(),
        }
    }
}
