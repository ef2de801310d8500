use perinote_core::config::loader::{ConfigLoader, default_config_path};
use perinote_core::periodic::{Granularity, format};

use crate::GlobalArgs;

pub fn run(global: &GlobalArgs) {
    let config = global.config.as_deref();
    let rc = match ConfigLoader::load(config, global.profile.as_deref()) {
        Ok(rc) => rc,
        Err(e) => {
            println!("FAIL pnote doctor");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    };

    let mut lines = vec![
        format!(
            "path: {}",
            config.map_or_else(
                || default_config_path().display().to_string(),
                |p| p.display().to_string()
            )
        ),
        format!("profile: {}", rc.active_profile),
        format!("vault_root: {}", rc.vault_root.display()),
        format!("week_start: {:?}", rc.periodic.week_start),
    ];
    let mut problems = Vec::new();
    if !rc.vault_root.is_dir() {
        problems.push(format!("vault_root {} is not a directory", rc.vault_root.display()));
    }

    for granularity in Granularity::ALL {
        let settings = rc.periodic.get(granularity);
        if !settings.enabled {
            lines.push(format!("{granularity}: disabled"));
            continue;
        }

        let fmt = settings.effective_format(granularity);
        let folder = match settings.normalized_folder() {
            "" => "/",
            folder => folder,
        };
        let status = match format::validate_format(fmt, granularity) {
            Ok(()) if format::is_format_ambiguous(fmt, granularity) => "ambiguous",
            Ok(()) => "ok",
            Err(e) => {
                problems.push(format!("{granularity}: {e}"));
                "invalid"
            }
        };
        lines.push(format!("{granularity}: folder={folder} format={fmt} [{status}]"));
    }

    println!("{} pnote doctor", if problems.is_empty() { "OK  " } else { "FAIL" });
    for line in &lines {
        println!("{line}");
    }
    for problem in &problems {
        println!("problem: {problem}");
    }
    if !problems.is_empty() {
        std::process::exit(1);
    }
}
