//! Report configuration

use crate::error::{DriftError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "driftdoc.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub pilot_label: String,
    pub production_label: String,
    /// Initial state of the "show changes only" checkbox
    pub changes_only: bool,
    /// When false, sections without any change are left out of the report
    pub include_unchanged_sections: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Configuration Drift Report".to_string(),
            pilot_label: "Pilot".to_string(),
            production_label: "Production".to_string(),
            changes_only: false,
            include_unchanged_sections: true,
        }
    }
}

impl ReportConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DriftError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = serde_json::from_str(&content).map_err(|e| {
            DriftError::config(format!("invalid config {}: {}", path.display(), e))
        })?;
        log::debug!("Loaded report config from {}", path.display());
        Ok(config)
    }

    /// Explicit path if given, else `driftdoc.json` in `dir` if present, else defaults
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let default_path = dir.join(DEFAULT_CONFIG_FILE);
        if default_path.is_file() {
            Self::load(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write this config as pretty JSON, refusing to overwrite unless forced
    pub fn save(&self, path: &Path, force: bool) -> Result<PathBuf> {
        if path.exists() && !force {
            return Err(DriftError::config(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(path.to_path_buf())
    }
}
