//! The `recitescore validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(profile_path: PathBuf) -> Result<()> {
    let profiles = if profile_path.is_dir() {
        recitescore_core::parser::load_profile_directory(&profile_path)?
    } else {
        vec![recitescore_core::parser::parse_profile(&profile_path)?]
    };

    if profiles.is_empty() {
        anyhow::bail!("no valid profiles found in {}", profile_path.display());
    }

    for profile in &profiles {
        println!(
            "Profile: {} ({} metrics, max {})",
            profile.name(),
            profile.allotments().len(),
            profile.overall_max()
        );
    }

    let warnings = recitescore_core::parser::validate_profiles(&profiles);
    for w in &warnings {
        let prefix = w
            .profile
            .as_ref()
            .map(|name| format!("  [{name}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("All profiles valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
