//! Configuration types for efo-explorer.
//!
//! [`Config::load`] reads `$XDG_CONFIG_HOME/efo-explorer/config.toml`,
//! creating it with hardcoded defaults if it does not yet exist, then applies
//! `EFO_EXPLORER__<SECTION>__<KEY>` environment overrides.
//! [`Config::defaults`] returns the same defaults without touching the
//! filesystem (useful in tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[ols]
base_url     = "https://www.ebi.ac.uk/ols4"
ontology     = "efo"
timeout_secs = 15
rows         = 10

[search]
debounce_ms = 300

[ui]
expand_hierarchy = false
theme            = "default"
"#;

const ENV_PREFIX: &str = "EFO_EXPLORER";

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ols: OlsConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// `[ols]` section: where and how to reach the ontology service.
#[derive(Debug, Clone, Deserialize)]
pub struct OlsConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Ontology every lookup is scoped to.
    #[serde(default = "default_ontology")]
    pub ontology: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum number of candidates requested per search.
    #[serde(default = "default_rows")]
    pub rows: u32,
}

fn default_base_url() -> String { "https://www.ebi.ac.uk/ols4".to_string() }
fn default_ontology() -> String { "efo".to_string() }
fn default_timeout_secs() -> u64 { 15 }
fn default_rows() -> u32 { 10 }

impl Default for OlsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ontology: default_ontology(),
            timeout_secs: default_timeout_secs(),
            rows: default_rows(),
        }
    }
}

impl OlsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[search]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a lookup is issued.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 { 300 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: default_debounce_ms() }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// `[ui]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    /// Show the ancestor list expanded as soon as it arrives.
    #[serde(default)]
    pub expand_hierarchy: bool,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_theme() -> String { "default".to_string() }

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            expand_hierarchy: false,
            theme: default_theme(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from the user config file, layered on top of the built-in
    /// defaults and under environment overrides. Creates the file with
    /// defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::load_from(&path)
    }

    /// Load from an explicit file path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let cfg: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.ols.base_url.trim().is_empty() {
            anyhow::bail!("ols.base_url must not be empty");
        }
        if self.ols.ontology.trim().is_empty() {
            anyhow::bail!("ols.ontology must not be empty");
        }
        if self.ols.rows == 0 {
            anyhow::bail!("ols.rows must be at least 1");
        }
        if self.ols.timeout_secs == 0 {
            anyhow::bail!("ols.timeout_secs must be at least 1");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// Location of the user config file.
pub fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("efo-explorer")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
