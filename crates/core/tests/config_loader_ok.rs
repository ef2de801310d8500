use perinote_core::config::loader::ConfigLoader;
use perinote_core::periodic::{Granularity, WeekStart};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn write_file(path: &PathBuf, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn load_default_profile_ok() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("config.toml");
    let toml = r#"
version = 1
profile = "default"

[profiles.default]
vault_root = "/tmp/vault"
excluded_folders = ["Templates"]
week_start = "sunday"

[profiles.default.periodic.day]
enabled = true
folder = "Journal"
format = "YYYY-MM-DD"
template_path = "Templates/daily.md"

[profiles.default.periodic.month]
enabled = true
folder = "Journal/Months"
"#;

    write_file(&cfg_path, toml);

    let rc = ConfigLoader::load(Some(&cfg_path), None).expect("should load");
    assert_eq!(rc.active_profile, "default");
    assert_eq!(rc.vault_root.display().to_string(), "/tmp/vault");
    assert_eq!(rc.excluded_folders, vec![PathBuf::from("/tmp/vault/Templates")]);

    let periodic = &rc.periodic;
    assert_eq!(periodic.week_start, WeekStart::Sunday);
    assert_eq!(periodic.enabled_granularities(), vec![Granularity::Day, Granularity::Month]);
    assert_eq!(periodic.day.folder, "Journal");
    assert_eq!(periodic.day.template(), Some("Templates/daily.md"));
    assert_eq!(periodic.month.effective_format(Granularity::Month), "YYYY-MM");
    assert!(!periodic.week.enabled);

    assert_eq!(rc.logging.level, "info");
    assert!(rc.logging.file.is_none());
}

#[test]
fn load_with_profile_override_ok() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("perinote/config.toml");
    let toml = r#"
version = 1
profile = "default"

[profiles.default]
vault_root = "/tmp/def"

[profiles.work]
vault_root = "/tmp/work"

[profiles.work.periodic.week]
enabled = true
"#;
    write_file(&cfg_path, toml);

    let rc = ConfigLoader::load(Some(&cfg_path), Some("work")).expect("should load");
    assert_eq!(rc.active_profile, "work");
    assert_eq!(rc.vault_root.display().to_string(), "/tmp/work");
    assert_eq!(rc.periodic.week_start, WeekStart::Monday);
    assert_eq!(rc.periodic.enabled_granularities(), vec![Granularity::Week]);
}

#[test]
fn load_logging_section_ok() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("config.toml");
    let toml = r#"
version = 1

[profiles.default]
vault_root = "/tmp/vault"

[logging]
level = "debug"
file_level = "trace"
file = "/tmp/perinote.log"
"#;
    write_file(&cfg_path, toml);

    let rc = ConfigLoader::load(Some(&cfg_path), None).expect("should load");
    assert_eq!(rc.active_profile, "default");
    assert_eq!(rc.logging.level, "debug");
    assert_eq!(rc.logging.file_level.as_deref(), Some("trace"));
    assert_eq!(rc.logging.file, Some(PathBuf::from("/tmp/perinote.log")));
}
