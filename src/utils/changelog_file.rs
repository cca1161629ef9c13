use crate::error::{Error, Result};
use crate::utils::changelog::{
    Changelog, ChangelogConfig, ChangelogParser, ChangelogVersion, initial_changelog,
    patch_changelog, render_changelog, render_version,
};
use crate::utils::filesystem::{read_if_exists, write_atomic};
use std::path::Path;

/// query and update operations on the changelog file named by a configuration.
///
/// every call re-reads and re-parses the file, nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct ChangelogFile {
    config: ChangelogConfig,
    parser: ChangelogParser,
}

impl ChangelogFile {
    pub fn new(config: ChangelogConfig) -> Result<Self> {
        config.validate()?;
        let parser = ChangelogParser::new(&config)?;
        Ok(Self { config, parser })
    }

    pub fn config(&self) -> &ChangelogConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// read and parse the current file
    pub fn read(&self) -> Result<Changelog> {
        let path = self.path();
        let content = read_if_exists(path)?.ok_or_else(|| Error::FileReadError {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "changelog file not found"),
        })?;
        Ok(self.parser.parse(&content))
    }

    /// a section by label; the unreleased term finds the unreleased section
    pub fn get(&self, version: &str) -> Result<ChangelogVersion> {
        self.read()?
            .get_version(version)
            .cloned()
            .ok_or_else(|| Error::VersionNotFound {
                version: version.to_string(),
            })
    }

    /// the section for the configured project version
    pub fn get_current(&self) -> Result<ChangelogVersion> {
        self.get(&self.config.version)
    }

    /// the most recent released section
    pub fn get_latest(&self) -> Result<ChangelogVersion> {
        self.read()?
            .latest()
            .cloned()
            .ok_or_else(|| Error::VersionNotFound {
                version: "latest".to_string(),
            })
    }

    pub fn get_unreleased(&self) -> Result<ChangelogVersion> {
        self.get(&self.config.unreleased_term)
    }

    /// released sections in file order
    pub fn get_all(&self) -> Result<Vec<ChangelogVersion>> {
        Ok(self.read()?.versions)
    }

    /// whether `get(version)` would find a section
    pub fn has(&self, version: &str) -> Result<bool> {
        Ok(self.read()?.has_version(version))
    }

    /// markdown of one section
    pub fn get_text(&self, version: &str, with_header: bool) -> Result<String> {
        let version_section = self.get(version)?;
        Ok(self.render_section(&version_section, with_header))
    }

    pub fn render_section(&self, version_section: &ChangelogVersion, with_header: bool) -> String {
        render_version(version_section, &self.config, with_header)
    }

    /// markdown of every released section, newest first
    pub fn get_all_text(&self, with_header: bool) -> Result<String> {
        let sections: Vec<String> = self
            .get_all()?
            .iter()
            .map(|v| self.render_section(v, with_header))
            .collect();
        Ok(sections.join("\n\n"))
    }

    /// create the file with an empty unreleased section.
    ///
    /// a missing or blank file is initialized; anything else is left alone.
    pub fn initialize(&self) -> Result<Changelog> {
        let path = self.path();
        if let Some(content) = read_if_exists(path)?
            && !content.trim().is_empty()
        {
            return Err(Error::AlreadyInitialized {
                path: path.to_path_buf(),
            });
        }

        let changelog = initial_changelog(&self.config);
        write_atomic(path, &render_changelog(&changelog, &self.config))?;
        tracing::info!(path = %path.display(), "changelog initialized");
        Ok(changelog)
    }

    /// release the unreleased section as `version` and write the file
    pub fn patch(&self, version: &str) -> Result<Changelog> {
        let changelog = self.read()?;
        let patched = patch_changelog(&changelog, version, &self.config)?;
        write_atomic(self.path(), &render_changelog(&patched, &self.config))?;
        tracing::info!(
            path = %self.path().display(),
            version = %version,
            "changelog patched"
        );
        Ok(patched)
    }

    /// release the unreleased section as the configured project version
    pub fn patch_current(&self) -> Result<Changelog> {
        self.patch(&self.config.version)
    }
}
