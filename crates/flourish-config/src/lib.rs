//! Configuration for flourish.
//!
//! Settings live in a TOML file. Every table and field is optional; anything
//! left out keeps the stock page value.
//!
//! ```toml
//! seed = 42
//!
//! [typewriter]
//! words = ["Developer", "Engineer"]
//!
//! [typewriter.timing]
//! typing_speed_ms = 60
//!
//! [particles]
//! capacity = 30
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use flourish_core::{
    AmbientSettings, DEFAULT_WORDS, PageSettings, ParticleSettings, TypewriterTiming,
};
use flourish_effects::{
    EffectsError, PageSetup, WordList, validate_ambient, validate_particles, validate_timing,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Name of the config file inside the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to render config")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config")]
    Invalid(#[from] EffectsError),
}

/// Word list and timing of the typewriter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    pub words: Vec<String>,
    pub timing: TypewriterTiming,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            words: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
            timing: TypewriterTiming::default(),
        }
    }
}

/// Complete flourish configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fixed random seed; a fresh one is drawn per run when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub typewriter: TypewriterConfig,
    pub particles: ParticleSettings,
    pub ambient: AmbientSettings,
    pub page: PageSettings,
}

impl Config {
    /// Default config file location, e.g. `~/.config/flourish/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "flourish").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// tried and built-in defaults are used if nothing is there.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("no config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file without validating it.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every section can drive its effect.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let words = WordList::new(self.typewriter.words.iter().cloned())?;
        validate_timing(&self.typewriter.timing, &words)?;
        validate_particles(&self.particles)?;
        validate_ambient(&self.ambient)?;
        Ok(())
    }

    /// Build the page startup record from this configuration.
    pub fn page_setup(&self) -> Result<PageSetup, ConfigError> {
        Ok(PageSetup {
            words: WordList::new(self.typewriter.words.iter().cloned())?,
            timing: self.typewriter.timing,
            particles: self.particles,
            ambient: self.ambient,
            page: self.page.clone(),
        })
    }
}
