// builder for creating temporary test projects

use crate::error::Result;
use crate::utils::changelog::ChangelogConfig;
use crate::utils::changelog_file::ChangelogFile;
use crate::utils::config::{CONFIG_FILE_NAME, ChlogConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// builder for a project directory with a manifest, changelog and config file
#[derive(Debug, Clone)]
pub struct TestProjectBuilder {
    version: Option<String>,
    changelog: Option<String>,
    changelog_path: String,
    config: Option<String>,
}

impl TestProjectBuilder {
    pub fn new() -> Self {
        Self {
            version: Some("0.1.0".to_string()),
            changelog: None,
            changelog_path: "CHANGELOG.md".to_string(),
            config: None,
        }
    }

    /// package version written to `Cargo.toml`
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// do not write a `Cargo.toml`
    pub fn without_manifest(mut self) -> Self {
        self.version = None;
        self
    }

    pub fn changelog(mut self, content: impl Into<String>) -> Self {
        self.changelog = Some(content.into());
        self
    }

    /// changelog location relative to the project root
    pub fn changelog_path(mut self, path: impl Into<String>) -> Self {
        self.changelog_path = path.into();
        self
    }

    /// raw content of `chlog.toml`
    pub fn config(mut self, content: impl Into<String>) -> Self {
        self.config = Some(content.into());
        self
    }

    pub fn build(self) -> Result<TestProject> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        if let Some(version) = &self.version {
            let manifest = format!(
                "[package]\nname = \"test_project\"\nversion = \"{}\"\nedition = \"2024\"\n",
                version
            );
            fs::write(root.join("Cargo.toml"), manifest)?;
        }

        if let Some(config) = &self.config {
            fs::write(root.join(CONFIG_FILE_NAME), config)?;
        }

        let changelog_path = root.join(&self.changelog_path);
        if let Some(content) = &self.changelog {
            if let Some(parent) = changelog_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&changelog_path, content)?;
        }

        Ok(TestProject {
            temp_dir,
            changelog_path,
        })
    }
}

impl Default for TestProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// a project in a temporary directory, removed on drop
pub struct TestProject {
    temp_dir: TempDir,
    changelog_path: PathBuf,
}

impl TestProject {
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn changelog_path(&self) -> &Path {
        &self.changelog_path
    }

    /// current changelog content, empty when the file does not exist
    pub fn read_changelog(&self) -> String {
        fs::read_to_string(&self.changelog_path).unwrap_or_default()
    }

    pub fn write_changelog(&self, content: &str) -> Result<()> {
        fs::write(&self.changelog_path, content)?;
        Ok(())
    }

    /// configuration resolved the same way the cli does it
    pub fn config(&self) -> Result<ChangelogConfig> {
        ChlogConfig::load(self.path())?.changelog.resolve(self.path())
    }

    pub fn changelog_file(&self) -> Result<ChangelogFile> {
        ChangelogFile::new(self.config()?)
    }
}
