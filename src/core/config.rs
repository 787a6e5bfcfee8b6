use crate::core::catalog;
use crate::core::growth::SimulationConfig;
use crate::core::price::Period;
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: Some(YahooProviderConfig {
                base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// How long fetched series stay valid.
    pub ttl_seconds: u64,
    /// Keep fetched series on disk between runs.
    pub persist: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_seconds: 3600,
            persist: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DefaultsConfig {
    pub tickers: Vec<String>,
    pub period: Period,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        DefaultsConfig {
            tickers: catalog::default_selection(),
            period: Period::FiveYears,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    /// Loads the config from the default location, or falls back to the
    /// built-in defaults when no file exists there.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "etfscope", "etfscope")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "etfscope", "etfscope")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn yahoo_base_url(&self) -> &str {
        self.providers
            .yahoo
            .as_ref()
            .map_or(DEFAULT_YAHOO_BASE_URL, |p| &p.base_url)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        // An empty document deserializes to null; treat it as all defaults.
        let config: Self = if config_str.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&config_str).with_context(|| {
                format!("Failed to parse config file: {}", path.as_ref().display())
            })?
        };
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        if self.defaults.tickers.is_empty() {
            bail!("defaults.tickers must name at least one ETF");
        }
        if let Some(ticker) = self
            .defaults
            .tickers
            .iter()
            .find(|t| !catalog::is_supported(t))
        {
            bail!("Unsupported ticker in defaults.tickers: {ticker}");
        }
        Ok(())
    }
}
