// changelog data structures

use super::config::{labels_match, normalize_label};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// a named bucket of items inside one version section (e.g. "Added")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogGroup {
    pub name: String,
    pub items: Vec<String>,
}

impl ChangelogGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// represents a version section in the changelog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogVersion {
    /// version token without brackets, e.g. "1.0.0" or "Unreleased"
    pub label: String,
    pub is_unreleased: bool,
    /// header line as found in the file; `None` for sections created in memory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_line: Option<String>,
    pub groups: Vec<ChangelogGroup>,
}

impl ChangelogVersion {
    /// a released version section without groups
    pub fn new(label: &str) -> Self {
        Self {
            label: normalize_label(label).to_string(),
            is_unreleased: false,
            header_line: None,
            groups: Vec::new(),
        }
    }

    /// an unreleased section without groups
    pub fn unreleased(term: &str) -> Self {
        Self {
            is_unreleased: true,
            ..Self::new(term)
        }
    }

    pub fn with_header_line(mut self, line: impl Into<String>) -> Self {
        self.header_line = Some(line.into());
        self
    }

    pub fn with_group(mut self, name: &str, items: &[&str]) -> Self {
        let index = self.add_group(name);
        self.groups[index]
            .items
            .extend(items.iter().map(|i| i.to_string()));
        self
    }

    pub fn group(&self, name: &str) -> Option<&ChangelogGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// items of a group, empty when the group is absent
    pub fn items(&self, name: &str) -> &[String] {
        self.group(name).map(|g| g.items.as_slice()).unwrap_or(&[])
    }

    /// add a group if absent and return its index
    pub fn add_group(&mut self, name: &str) -> usize {
        match self.groups.iter().position(|g| g.name == name) {
            Some(index) => index,
            None => {
                self.groups.push(ChangelogGroup::new(name));
                self.groups.len() - 1
            }
        }
    }

    /// true when no group holds an item
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(ChangelogGroup::is_empty)
    }

    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }

    pub fn matches(&self, label: &str) -> bool {
        labels_match(&self.label, label)
    }

    /// the label as a semantic version, when it is one
    pub fn semver(&self) -> Option<Version> {
        Version::parse(self.label.trim_start_matches('v')).ok()
    }

    /// reorder groups by rank, keeping the relative order of equal ranks
    pub fn sort_groups_by<F>(&mut self, rank: F)
    where
        F: Fn(&str) -> usize,
    {
        self.groups.sort_by_key(|g| rank(&g.name));
    }

    /// append the groups and items of another section of the same version
    pub fn merge(&mut self, other: ChangelogVersion) {
        for group in other.groups {
            let index = self.add_group(&group.name);
            self.groups[index].items.extend(group.items);
        }
    }
}

/// represents a complete changelog file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changelog {
    /// text preceding the first version header
    pub front_matter: Option<String>,
    pub unreleased: Option<ChangelogVersion>,
    /// released versions, newest first
    pub versions: Vec<ChangelogVersion>,
    /// link reference definitions found after the first header, in file order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
}

impl Changelog {
    pub fn new() -> Self {
        Self::default()
    }

    /// add a parsed section, merging it into an earlier section of the same version
    pub fn add_version(&mut self, version_section: ChangelogVersion) {
        if version_section.is_unreleased {
            match self.unreleased.as_mut() {
                Some(existing) => {
                    tracing::warn!(
                        label = %version_section.label,
                        "merging duplicate unreleased section"
                    );
                    existing.merge(version_section);
                }
                None => self.unreleased = Some(version_section),
            }
            return;
        }

        match self
            .versions
            .iter_mut()
            .find(|v| v.matches(&version_section.label))
        {
            Some(existing) => {
                tracing::warn!(
                    label = %version_section.label,
                    "merging duplicate version section"
                );
                existing.merge(version_section);
            }
            None => self.versions.push(version_section),
        }
    }

    /// all sections in file order, unreleased first
    pub fn entries(&self) -> impl Iterator<Item = &ChangelogVersion> {
        self.unreleased.iter().chain(self.versions.iter())
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut ChangelogVersion> {
        self.unreleased.iter_mut().chain(self.versions.iter_mut())
    }

    /// find a section by label, including the unreleased one
    pub fn get_version(&self, label: &str) -> Option<&ChangelogVersion> {
        self.entries().find(|v| v.matches(label))
    }

    pub fn has_version(&self, label: &str) -> bool {
        self.get_version(label).is_some()
    }

    /// check released versions only
    pub fn has_released(&self, label: &str) -> bool {
        self.versions.iter().any(|v| v.matches(label))
    }

    /// most recent released version
    pub fn latest(&self) -> Option<&ChangelogVersion> {
        self.versions.first()
    }

    pub fn released(&self) -> &[ChangelogVersion] {
        &self.versions
    }

    /// released versions ordered newest first by semantic version.
    ///
    /// labels that are not semantic versions sort after those that are,
    /// in descending string order.
    pub fn sorted_versions(&self) -> Vec<&ChangelogVersion> {
        let mut sorted: Vec<_> = self.versions.iter().collect();
        sorted.sort_by(|a, b| compare_labels(b, a));
        sorted
    }

    pub fn is_empty(&self) -> bool {
        self.front_matter.is_none()
            && self.unreleased.is_none()
            && self.versions.is_empty()
            && self.links.is_empty()
    }
}

fn compare_labels(a: &ChangelogVersion, b: &ChangelogVersion) -> Ordering {
    match (a.semver(), b.semver()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.label.cmp(&b.label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_group_is_idempotent() {
        let mut version = ChangelogVersion::new("1.0.0");
        let first = version.add_group("Added");
        let second = version.add_group("Added");
        assert_eq!(first, second);
        assert_eq!(version.groups.len(), 1);
        assert!(version.is_empty());
    }

    #[test]
    fn test_label_is_normalized() {
        let version = ChangelogVersion::new("[1.0.0]");
        assert_eq!(version.label, "1.0.0");
        assert!(version.matches("1.0.0"));
        assert!(version.matches("[1.0.0]"));

        let unreleased = ChangelogVersion::unreleased("[Unreleased]");
        assert_eq!(unreleased.label, "Unreleased");
        assert!(unreleased.is_unreleased);
    }

    #[test]
    fn test_duplicate_sections_are_merged() {
        let mut changelog = Changelog::new();
        changelog.add_version(ChangelogVersion::new("1.0.0").with_group("Added", &["a"]));
        changelog.add_version(
            ChangelogVersion::new("1.0.0")
                .with_group("Added", &["b"])
                .with_group("Fixed", &["c"]),
        );

        assert_eq!(changelog.versions.len(), 1);
        let version = changelog.get_version("1.0.0").unwrap();
        assert_eq!(version.items("Added"), ["a", "b"]);
        assert_eq!(version.items("Fixed"), ["c"]);
    }

    #[test]
    fn test_sorted_versions() {
        let mut changelog = Changelog::new();
        for label in ["0.9.0", "1.10.0", "legacy", "1.2.0", "v2.0.0"] {
            changelog.add_version(ChangelogVersion::new(label));
        }

        let labels: Vec<_> = changelog
            .sorted_versions()
            .iter()
            .map(|v| v.label.as_str())
            .collect();
        assert_eq!(labels, ["v2.0.0", "1.10.0", "1.2.0", "0.9.0", "legacy"]);
    }

    #[test]
    fn test_latest_skips_unreleased() {
        let mut changelog = Changelog::new();
        changelog.add_version(ChangelogVersion::unreleased("[Unreleased]"));
        assert!(changelog.latest().is_none());

        changelog.add_version(ChangelogVersion::new("0.2.0"));
        changelog.add_version(ChangelogVersion::new("0.1.0"));
        assert_eq!(changelog.latest().unwrap().label, "0.2.0");
        assert_eq!(changelog.entries().count(), 3);
    }
}
