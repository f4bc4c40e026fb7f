//! TOML scale profile parser.
//!
//! Loads profiles from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::metrics::{CompletenessGate, Metric};
use crate::profile::{ProfileSpec, ScaleProfile};

/// Intermediate TOML structure for profile files.
#[derive(Debug, Deserialize)]
struct TomlProfileFile {
    profile: ProfileSpec,
}

/// Parse a single TOML file into a `ScaleProfile`.
pub fn parse_profile(path: &Path) -> Result<ScaleProfile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile file: {}", path.display()))?;

    parse_profile_str(&content, path)
}

/// Parse a TOML string into a `ScaleProfile` (useful for testing).
pub fn parse_profile_str(content: &str, source_path: &Path) -> Result<ScaleProfile> {
    let parsed: TomlProfileFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let name = parsed.profile.name.clone();
    ScaleProfile::new(parsed.profile).with_context(|| {
        format!(
            "invalid profile '{}' in {}",
            name,
            source_path.display()
        )
    })
}

/// Recursively load all `.toml` profile files from a directory.
///
/// Files that fail to parse or validate are skipped with a warning.
pub fn load_profile_directory(dir: &Path) -> Result<Vec<ScaleProfile>> {
    let mut profiles = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        paths.push(entry?.path());
    }
    paths.sort();

    for path in paths {
        if path.is_dir() {
            profiles.extend(load_profile_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_profile(&path) {
                Ok(profile) => profiles.push(profile),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(profiles)
}

/// Resolve a profile by file path, built-in name, or name inside `profiles_dir`.
pub fn resolve_profile(name_or_path: &str, profiles_dir: Option<&Path>) -> Result<ScaleProfile> {
    let path = Path::new(name_or_path);
    if path.is_file() {
        return parse_profile(path);
    }

    if let Some(profile) = ScaleProfile::builtin(name_or_path) {
        return Ok(profile);
    }

    if let Some(dir) = profiles_dir.filter(|d| d.is_dir()) {
        if let Some(profile) = load_profile_directory(dir)?
            .into_iter()
            .find(|p| p.name() == name_or_path)
        {
            return Ok(profile);
        }
    }

    anyhow::bail!(
        "unknown profile '{}' (built-in profiles: {})",
        name_or_path,
        ScaleProfile::BUILTIN_NAMES.join(", ")
    )
}

/// A warning from profile validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The profile name (if applicable).
    pub profile: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Check a set of valid profiles for suspicious but legal configurations.
pub fn validate_profiles(profiles: &[ScaleProfile]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_names = HashSet::new();
    for profile in profiles {
        if !seen_names.insert(profile.name()) {
            warnings.push(ValidationWarning {
                profile: Some(profile.name().to_string()),
                message: format!("duplicate profile name: {}", profile.name()),
            });
        }
        if ScaleProfile::builtin(profile.name()).is_some_and(|builtin| builtin != *profile) {
            warnings.push(ValidationWarning {
                profile: Some(profile.name().to_string()),
                message: "name shadows a built-in profile; the built-in wins when resolved by name"
                    .into(),
            });
        }
    }

    for profile in profiles {
        let allots = |metric| profile.allotment(metric).is_some();

        if allots(Metric::Prosody) && !allots(Metric::Fluency) && !allots(Metric::Accuracy) {
            warnings.push(ValidationWarning {
                profile: Some(profile.name().to_string()),
                message: "prosody is derived from fluency and accuracy, neither of which is scored"
                    .into(),
            });
        }

        if *profile.completeness_gate() != CompletenessGate::None && !allots(Metric::Completeness) {
            warnings.push(ValidationWarning {
                profile: Some(profile.name().to_string()),
                message: "completeness_gate is set but completeness has no points".into(),
            });
        }

        if profile.pass_percentage() == 0.0 {
            warnings.push(ValidationWarning {
                profile: Some(profile.name().to_string()),
                message: "pass_percentage is 0; every attempt passes".into(),
            });
        }
    }

    warnings
}
