//! Persistent settings.
//!
//! Stored as RON under the platform config directory
//! (`~/.config/acescvt/settings.ron` on Linux). A missing file means
//! defaults; a malformed one is an error rather than being silently replaced.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::probe::DEFAULT_PROBE_VAR;
use crate::{Error, ExternalConverter, PatternTokenizer, Result};

/// Settings file name.
pub const SETTINGS_FILE: &str = "settings.ron";

/// User settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// External converter command.
    pub converter: ExternalConverter,
    /// Grouping rule.
    pub tokenizer: PatternTokenizer,
    /// Environment variable consulted for a default directory.
    pub probe_var: String,
    /// Last scanned directory.
    pub last_directory: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            converter: ExternalConverter::default(),
            tokenizer: PatternTokenizer::default(),
            probe_var: DEFAULT_PROBE_VAR.to_string(),
            last_directory: None,
        }
    }
}

impl Settings {
    /// Platform settings path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("acescvt").join(SETTINGS_FILE))
    }

    /// Loads from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    /// Parses RON text.
    pub fn from_ron(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| Error::Settings(e.to_string()))
    }

    /// Pretty RON text.
    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| Error::Settings(e.to_string()))
    }

    /// Writes to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_ron()?)?;
        debug!(path = %path.display(), "saved settings");
        Ok(())
    }
}
