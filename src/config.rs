use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::coverage::GateConfig;

pub const CONFIG_FILE: &str = "covdiff.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub diff: DiffSettings,
    #[serde(default)]
    pub gate: GateConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiffSettings {
    /// Report only groups whose coverage changed (default: true)
    #[serde(default = "default_groups_diff_only")]
    pub groups_diff_only: bool,
    /// Glob patterns for files left out of both summaries
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_groups_diff_only() -> bool {
    true
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            groups_diff_only: default_groups_diff_only(),
            exclude: Vec::new(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Load an explicitly requested config, or `covdiff.toml` from `dir` when present
    pub fn load_or_default(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let default_path = dir.join(CONFIG_FILE);
        if default_path.is_file() {
            Self::load(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let drops = [
            ("gate.max_line_drop", self.gate.max_line_drop),
            ("gate.max_branch_drop", self.gate.max_branch_drop),
            ("gate.max_group_drop", self.gate.max_group_drop),
        ];

        for (key, value) in drops {
            if let Some(value) = value {
                if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                    anyhow::bail!("'{}' must be between 0 and 100, got {}", key, value);
                }
            }
        }

        Ok(())
    }
}
