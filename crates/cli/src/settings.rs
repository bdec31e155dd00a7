//! Settings file support.
//! The file is only read; every value missing from it falls back to the defaults below.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use subfix_core::RetimeConfig;
use tracing::{debug, trace};

/// Contents of a `settings.json` file.
/// Unknown sections (theme, translation, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub timing: Timing,
    pub formatting: Formatting,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub min_duration: f64,
    pub max_duration: f64,
    pub gap_between: f64,
    pub chars_per_sec: f64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            min_duration: 0.6,
            max_duration: 8.0,
            gap_between: 0.066,
            chars_per_sec: 25.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Formatting {
    pub chars_per_line: usize,
    pub max_lines: usize,
}

impl Default for Formatting {
    fn default() -> Self {
        Self {
            chars_per_line: 43,
            max_lines: 2,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        trace!("load settings path={}", path.display());
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed reading settings file {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&raw)
            .with_context(|| format!("failed parsing settings file {}", path.display()))?;
        debug!(?settings, "loaded settings");
        Ok(settings)
    }

    pub fn to_config(&self) -> RetimeConfig {
        RetimeConfig {
            min_duration: self.timing.min_duration,
            max_duration: self.timing.max_duration,
            min_gap: self.timing.gap_between,
            chars_per_sec: self.timing.chars_per_sec,
            chars_per_line: self.formatting.chars_per_line,
            max_lines: self.formatting.max_lines,
        }
    }
}
