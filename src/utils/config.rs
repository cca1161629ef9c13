use super::changelog::{ChangelogConfig, HeaderTemplate};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "chlog.toml";

/// main configuration for chlog, read from `chlog.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChlogConfig {
    /// changelog-related configuration
    #[serde(default)]
    pub changelog: ChangelogSettings,
}

/// changelog options as written in the config file; unset keys use defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogSettings {
    pub groups: Option<Vec<String>>,

    /// header format with `{version}` and `{date}` placeholders
    pub header: Option<String>,

    pub header_pattern: Option<String>,

    pub item_prefix: Option<String>,

    pub keep_unreleased_section: Option<bool>,

    pub patch_empty: Option<bool>,

    /// changelog path, relative to the project directory
    pub path: Option<PathBuf>,

    /// overrides the version from `Cargo.toml`
    pub version: Option<String>,

    pub unreleased_term: Option<String>,
}

impl ChlogConfig {
    /// load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| Error::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: ChlogConfig = toml::from_str(&contents).map_err(|e| Error::TomlParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// load `chlog.toml` from the project directory, or defaults when there is none
    pub fn load<P: AsRef<Path>>(project_dir: P) -> Result<Self> {
        match Self::find_config_file(&project_dir) {
            Some(config_path) => {
                tracing::debug!(path = %config_path.display(), "loading configuration");
                Self::load_from_file(&config_path)
            }
            None => Ok(Self::default()),
        }
    }

    /// find configuration file in the project directory
    pub fn find_config_file<P: AsRef<Path>>(project_dir: P) -> Option<PathBuf> {
        let config_path = project_dir.as_ref().join(CONFIG_FILE_NAME);

        if config_path.is_file() {
            Some(config_path)
        } else {
            None
        }
    }
}

impl ChangelogSettings {
    /// build the changelog configuration for a project directory.
    ///
    /// the version falls back to the one in the project's `Cargo.toml`.
    pub fn resolve<P: AsRef<Path>>(&self, project_dir: P) -> Result<ChangelogConfig> {
        let project_dir = project_dir.as_ref();
        let mut config = ChangelogConfig::default();

        if let Some(groups) = &self.groups {
            config = config.groups(groups.iter().cloned());
        }
        if let Some(header) = &self.header {
            config = config.header_template(HeaderTemplate::from_format(header.clone()));
        }
        if let Some(pattern) = &self.header_pattern {
            config = config.header_pattern(pattern)?;
        }
        if let Some(prefix) = &self.item_prefix {
            config = config.item_prefix(prefix.clone());
        }
        if let Some(keep) = self.keep_unreleased_section {
            config = config.keep_unreleased_section(keep);
        }
        if let Some(allow) = self.patch_empty {
            config = config.patch_empty(allow);
        }
        if let Some(term) = &self.unreleased_term {
            config = config.unreleased_term(term.clone());
        }

        config = match &self.path {
            Some(path) => config.path(project_dir.join(path)),
            None => config.path(ChangelogConfig::default_path_in(project_dir)),
        };

        let version = match &self.version {
            Some(version) => version.clone(),
            None => project_version(project_dir)?.ok_or_else(|| Error::InvalidConfig {
                reason: format!(
                    "no version configured and none found in {}",
                    project_dir.join("Cargo.toml").display()
                ),
            })?,
        };

        let config = config.version(version);
        config.validate()?;
        Ok(config)
    }
}

/// version of the package (or workspace) in `<project_dir>/Cargo.toml`
pub fn project_version<P: AsRef<Path>>(project_dir: P) -> Result<Option<String>> {
    let manifest_path = project_dir.as_ref().join("Cargo.toml");
    if !manifest_path.is_file() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&manifest_path).map_err(|e| Error::FileReadError {
        path: manifest_path.clone(),
        source: e,
    })?;
    let manifest: toml::Value = toml::from_str(&contents).map_err(|e| Error::TomlParseError {
        path: manifest_path.clone(),
        source: e,
    })?;

    // `version.workspace = true` is a table, so it falls through to the workspace version
    let package_version = manifest
        .get("package")
        .and_then(|p| p.get("version"))
        .and_then(|v| v.as_str());
    let workspace_version = manifest
        .get("workspace")
        .and_then(|w| w.get("package"))
        .and_then(|p| p.get("version"))
        .and_then(|v| v.as_str());

    Ok(package_version.or(workspace_version).map(str::to_string))
}
