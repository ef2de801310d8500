#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// A vault on disk plus a config file pointing at it.
pub struct TestVault {
    dir: TempDir,
    pub config: PathBuf,
}

impl TestVault {
    /// Day notes in `Journal`, week notes in `Journal/Weeks`, month notes in
    /// `Journal/Months`.
    pub fn new() -> Self {
        Self::with_periodic(
            r#"
[profiles.default.periodic.day]
enabled = true
folder = "Journal"
format = "YYYY-MM-DD"
template_path = "Templates/daily.md"

[profiles.default.periodic.week]
enabled = true
folder = "Journal/Weeks"

[profiles.default.periodic.month]
enabled = true
folder = "Journal/Months"
"#,
        )
    }

    pub fn with_periodic(periodic: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let vault = dir.path().join("vault");
        fs::create_dir_all(&vault).unwrap();

        let config = dir.path().join("config.toml");
        let content = format!(
            r#"
version = 1
profile = "default"

[profiles.default]
vault_root = "{}"
excluded_folders = ["Templates"]

[logging]
level = "warn"
{}"#,
            vault.display(),
            periodic
        );
        fs::write(&config, content).unwrap();
        Self { dir, config }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("vault")
    }

    pub fn write(&self, path: &str, content: &str) -> &Self {
        let full = self.root().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
        self
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pnote"));
        cmd.arg("--config").arg(&self.config).env_remove("RUST_LOG");
        cmd
    }

    /// Add keys to the `[logging]` table.
    pub fn append_logging(&self, keys: &str) -> &Self {
        let content = fs::read_to_string(&self.config).unwrap();
        let level = "level = \"warn\"\n";
        let content = content.replacen(level, &format!("{level}{keys}"), 1);
        fs::write(&self.config, content).unwrap();
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config
    }
}
