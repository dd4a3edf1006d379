use anyhow::{Context, Result};
use neuma_clock::ClockConfig;
use neuma_core::{name_to_pitch, ConfigError, Pitch, Scale};
use neuma_lang::DecodeConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Which scale degrees resolve against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    /// Root as a note name (`C4`, `F#3`) or a MIDI number (`60`)
    pub root: String,
    pub mode: String,
    /// Explicit steps in semitones; overrides the named mode's steps
    pub intervals: Option<Vec<u32>>,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        ScaleConfig {
            root: "C4".to_string(),
            mode: "major".to_string(),
            intervals: None,
        }
    }
}

impl ScaleConfig {
    pub fn root_pitch(&self) -> std::result::Result<Pitch, ConfigError> {
        let root = self.root.trim();
        root.parse::<Pitch>()
            .ok()
            .or_else(|| name_to_pitch(root))
            .ok_or_else(|| ConfigError::InvalidRoot(self.root.clone()))
    }

    pub fn build(&self) -> std::result::Result<Scale, ConfigError> {
        let root = self.root_pitch()?;
        match &self.intervals {
            Some(intervals) => Scale::new(root, intervals.clone(), self.mode.clone()),
            None => Scale::named(root, &self.mode),
        }
    }
}

/// Settings for the `neuma` binary, read from a JSON file
///
/// Every section is optional; missing fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scale: ScaleConfig,
    pub decode: DecodeConfig,
    pub clock: ClockConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_json(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Config> {
        Ok(serde_json::from_str(content)?)
    }
}
