//! Engine configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::EvaluationEngineConfig;

/// Environment variable that overrides `default_profile`.
pub const PROFILE_ENV_VAR: &str = "RECITESCORE_PROFILE";

/// Top-level recitescore configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecitescoreConfig {
    /// Duration assumed when an attempt arrives without usable timing.
    #[serde(default = "default_duration_secs")]
    pub default_duration_secs: f64,
    /// Word cap per token sequence before alignment.
    #[serde(default = "default_max_words")]
    pub max_words: usize,
    /// Profile used when none is named on the command line.
    #[serde(default = "default_profile")]
    pub default_profile: String,
    /// Directory of additional TOML profiles.
    #[serde(default)]
    pub profiles_dir: Option<PathBuf>,
    /// JSON file attempt history is kept in.
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
}

fn default_duration_secs() -> f64 {
    60.0
}
fn default_max_words() -> usize {
    400
}
fn default_profile() -> String {
    "weighted-100".to_string()
}
fn default_history_file() -> PathBuf {
    PathBuf::from("./recitescore-history.json")
}

impl Default for RecitescoreConfig {
    fn default() -> Self {
        Self {
            default_duration_secs: default_duration_secs(),
            max_words: default_max_words(),
            default_profile: default_profile(),
            profiles_dir: None,
            history_file: default_history_file(),
        }
    }
}

impl RecitescoreConfig {
    pub fn engine_config(&self) -> EvaluationEngineConfig {
        EvaluationEngineConfig {
            default_duration_secs: self.default_duration_secs,
            max_words: self.max_words,
        }
    }

    /// Read and parse one config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Apply the profile override, expand `${VAR}` references, and reject
    /// values the engine cannot run with.
    fn finalize(mut self) -> Result<Self> {
        if let Some(profile) = std::env::var(PROFILE_ENV_VAR)
            .ok()
            .filter(|p| !p.trim().is_empty())
        {
            self.default_profile = profile;
        }

        self.default_profile = expand_env(&self.default_profile);
        self.profiles_dir = self.profiles_dir.map(|dir| expand_env_path(&dir));
        self.history_file = expand_env_path(&self.history_file);

        anyhow::ensure!(
            self.default_duration_secs.is_finite() && self.default_duration_secs > 0.0,
            "default_duration_secs must be positive, got {}",
            self.default_duration_secs
        );
        anyhow::ensure!(self.max_words > 0, "max_words must be at least 1");
        Ok(self)
    }
}

/// Substitute `${NAME}` with the value of environment variable `NAME`
/// (empty when unset). An unterminated `${` is kept literally.
fn expand_env(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some((before, after)) = rest.split_once("${") {
        out.push_str(before);
        match after.split_once('}') {
            Some((name, tail)) => {
                out.push_str(&std::env::var(name).unwrap_or_default());
                rest = tail;
            }
            None => {
                out.push_str("${");
                rest = after;
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

fn expand_env_path(path: &Path) -> PathBuf {
    PathBuf::from(expand_env(&path.to_string_lossy()))
}

/// Candidate config files, most specific first.
fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("recitescore.toml")];
    paths.extend(dirs_path().map(|dir| dir.join("config.toml")));
    paths
}

/// The config file to read: the explicit one (which must exist), or the
/// first default location present on disk.
fn locate(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) if path.exists() => Ok(Some(path.to_path_buf())),
        Some(path) => anyhow::bail!("config file not found: {}", path.display()),
        None => Ok(search_paths().into_iter().find(|p| p.exists())),
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `recitescore.toml` in the current directory
/// 2. `~/.config/recitescore/config.toml`
///
/// `RECITESCORE_PROFILE` overrides the default profile.
pub fn load_config() -> Result<RecitescoreConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<RecitescoreConfig> {
    let config = match locate(path)? {
        Some(found) => {
            tracing::debug!(path = %found.display(), "loading config");
            RecitescoreConfig::from_file(&found)?
        }
        None => RecitescoreConfig::default(),
    };
    config.finalize()
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config").join("recitescore"))
}
