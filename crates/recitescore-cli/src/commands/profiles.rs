//! The `recitescore profiles` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use recitescore_core::config::load_config_from;
use recitescore_core::parser::load_profile_directory;
use recitescore_core::ScaleProfile;

pub fn execute(config: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config.as_deref())?;

    let mut profiles: Vec<(ScaleProfile, &str)> = ScaleProfile::builtins()
        .into_iter()
        .map(|p| (p, "built-in"))
        .collect();
    if let Some(dir) = config.profiles_dir.as_deref().filter(|d| d.is_dir()) {
        profiles.extend(
            load_profile_directory(dir)?
                .into_iter()
                .map(|p| (p, "profiles_dir")),
        );
    }

    let mut table = Table::new();
    table.set_header(vec!["Name", "Source", "Max", "Pass", "Allotments"]);
    for (profile, source) in &profiles {
        let allotments: Vec<String> = profile
            .allotments()
            .iter()
            .map(|a| format!("{} {}", a.label(), a.points))
            .collect();
        let name = if profile.name() == config.default_profile {
            format!("{} (default)", profile.name())
        } else {
            profile.name().to_string()
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(source),
            Cell::new(profile.overall_max()),
            Cell::new(format!("{}%", profile.pass_percentage())),
            Cell::new(allotments.join(", ")),
        ]);
    }
    println!("{table}");

    Ok(())
}
