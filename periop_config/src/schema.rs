use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use periop_extract::ExtractionConfig;

const CONFIG_DIR: &str = "periop";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OutputConfig {
    /// Pretty-print JSON records.
    #[serde(default = "OutputConfig::default_pretty")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: Self::default_pretty(),
        }
    }
}

impl OutputConfig {
    const fn default_pretty() -> bool {
        true
    }
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load `~/periop/config.json`, falling back to built-in defaults when
    /// the file does not exist. A file that exists but does not parse is
    /// still an error.
    pub fn load_or_default() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            debug!(path = %config_path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config at {}: {e}", path.display()))?;

        debug!(
            path = %path.display(),
            rules = config.extraction.rules.len(),
            extra_rules = config.extraction.extra_rules.len(),
            "Loaded config"
        );
        Ok(config)
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    /// Write the config template to `~/periop/config.json`.
    pub fn create_config() -> anyhow::Result<PathBuf> {
        let config_path = Self::ensure_config_dir()?.join(CONFIG_FILE);
        Self::write_template(&config_path)?;
        Ok(config_path)
    }

    /// Write the config template to `path`. Never overwrites.
    pub fn write_template(path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                path.display()
            );
        }

        std::fs::write(path, CONFIG_TEMPLATE)?;
        Ok(())
    }
}

/// Starter config. `rules` is left out so the built-in table applies; the
/// one extra rule shows the rule format and fills the glucose field.
const CONFIG_TEMPLATE: &str = r#"{
  "extraction": {
    "clean_input": false,
    "extra_rules": [
      {
        "id": "lab_glucose",
        "field": "pre_operative.laboratory_values.glucose",
        "priority": 0,
        "view": "lower",
        "matcher": { "kind": "regex", "pattern": "(?:glucose|bg):?\\s*(\\d+)" },
        "format": { "kind": "template", "template": "$1 mg/dL" }
      }
    ]
  },
  "output": {
    "pretty": true
  }
}
"#;
