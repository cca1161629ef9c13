// changelog mutations

use super::config::{ChangelogConfig, normalize_label};
use super::types::{Changelog, ChangelogGroup, ChangelogVersion};
use crate::error::{Error, Result};

pub const INITIAL_FRONT_MATTER: &str = "# Changelog";

/// a fresh changelog: front matter plus an unreleased section with every
/// configured group present but empty
pub fn initial_changelog(config: &ChangelogConfig) -> Changelog {
    let mut unreleased = ChangelogVersion::unreleased(&config.unreleased_term);
    for group in &config.groups {
        unreleased.add_group(group);
    }

    Changelog {
        front_matter: Some(INITIAL_FRONT_MATTER.to_string()),
        unreleased: Some(unreleased),
        versions: Vec::new(),
        links: Vec::new(),
    }
}

/// promote the unreleased section to a released `version` section.
///
/// the released section keeps only non-empty groups and is placed first
/// among released versions. With `keep_unreleased_section` an empty
/// unreleased section stays on top.
pub fn patch_changelog(
    changelog: &Changelog,
    version: &str,
    config: &ChangelogConfig,
) -> Result<Changelog> {
    let unreleased = changelog
        .unreleased
        .as_ref()
        .ok_or_else(|| Error::MissingUnreleasedSection {
            path: config.path.clone(),
        })?;

    let label = normalize_label(version);
    if label.is_empty() {
        return Err(Error::InvalidConfig {
            reason: "release version must not be empty".to_string(),
        });
    }
    if config.is_unreleased_label(label) {
        return Err(Error::InvalidConfig {
            reason: format!(
                "release version must differ from the unreleased term '{}'",
                config.unreleased_term
            ),
        });
    }

    if !config.patch_empty && unreleased.is_empty() {
        return Err(Error::EmptyReleaseNotAllowed {
            version: label.to_string(),
        });
    }

    if changelog.has_released(label) {
        return Err(Error::DuplicateVersion {
            version: label.to_string(),
        });
    }

    let mut released = ChangelogVersion::new(label);
    released.groups = unreleased
        .groups
        .iter()
        .filter(|g| !g.is_empty())
        .cloned()
        .collect::<Vec<ChangelogGroup>>();

    tracing::info!(
        version = %released.label,
        items = released.item_count(),
        keep_unreleased = config.keep_unreleased_section,
        "patching unreleased section"
    );

    let mut versions = Vec::with_capacity(changelog.versions.len() + 1);
    versions.push(released);
    versions.extend(changelog.versions.iter().cloned());

    let unreleased = config
        .keep_unreleased_section
        .then(|| ChangelogVersion::unreleased(&config.unreleased_term));

    Ok(Changelog {
        front_matter: changelog.front_matter.clone(),
        unreleased,
        versions,
        links: changelog.links.clone(),
    })
}
