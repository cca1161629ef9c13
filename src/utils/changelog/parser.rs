// changelog parser

use super::config::ChangelogConfig;
use super::types::{Changelog, ChangelogVersion};
use crate::error::{Error, Result};
use regex::Regex;
use std::fs;
use std::path::Path;

/// line-oriented changelog parser for one configuration.
///
/// parsing never fails: lines that are neither headers, group headings,
/// items nor item continuations are skipped.
#[derive(Debug, Clone)]
pub struct ChangelogParser {
    header: Regex,
    config: ChangelogConfig,
}

/// parse a changelog file
pub fn parse_changelog<P: AsRef<Path>>(path: P, config: &ChangelogConfig) -> Result<Changelog> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| Error::FileReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_changelog_str(&content, config)
}

/// parse changelog text; fails only when the configured header pattern is invalid
pub fn parse_changelog_str(content: &str, config: &ChangelogConfig) -> Result<Changelog> {
    Ok(ChangelogParser::new(config)?.parse(content))
}

impl ChangelogParser {
    pub fn new(config: &ChangelogConfig) -> Result<Self> {
        Ok(Self {
            header: config.header_regex()?,
            config: config.clone(),
        })
    }

    pub fn parse(&self, content: &str) -> Changelog {
        let mut changelog = Changelog::new();
        let mut front_matter: Vec<&str> = Vec::new();
        let mut current_version: Option<ChangelogVersion> = None;
        let mut current_group: Option<usize> = None;
        // an item was the last line read, so indented lines continue it
        let mut in_item = false;

        for raw_line in content.lines() {
            let line = raw_line.trim_end();

            if let Some(token) = self.version_token(line) {
                if let Some(prev) = current_version.take() {
                    changelog.add_version(prev);
                }

                let version = if self.config.is_unreleased_label(token) {
                    ChangelogVersion::unreleased(token)
                } else {
                    ChangelogVersion::new(token)
                };
                current_version = Some(version.with_header_line(line));
                current_group = None;
                in_item = false;
                continue;
            }

            let Some(version_section) = current_version.as_mut() else {
                front_matter.push(line);
                continue;
            };

            if line.is_empty() {
                in_item = false;
                continue;
            }

            if let Some(name) = self.group_heading(line) {
                current_group = Some(version_section.add_group(name));
                in_item = false;
                continue;
            }

            if let Some(item) = self.item_text(line) {
                // items outside of a group are dropped
                in_item = match current_group {
                    Some(index) if !item.is_empty() => {
                        version_section.groups[index].items.push(item.to_string());
                        true
                    }
                    _ => false,
                };
                continue;
            }

            if in_item && line.starts_with([' ', '\t']) {
                if let Some(index) = current_group
                    && let Some(last) = version_section.groups[index].items.last_mut()
                {
                    last.push('\n');
                    last.push_str(line);
                }
                continue;
            }

            if is_link_definition(line) {
                changelog.links.push(line.to_string());
                in_item = false;
                continue;
            }

            // unrecognized line format (description text)
            // be lenient and skip
            in_item = false;
        }

        if let Some(version_section) = current_version {
            changelog.add_version(version_section);
        }

        let front_matter = front_matter.join("\n");
        let front_matter = front_matter.trim_end();
        if !front_matter.trim().is_empty() {
            changelog.front_matter = Some(front_matter.to_string());
        }

        for version_section in changelog.entries_mut() {
            version_section.sort_groups_by(|name| self.config.group_rank(name));
        }

        tracing::debug!(
            versions = changelog.versions.len(),
            has_unreleased = changelog.unreleased.is_some(),
            has_front_matter = changelog.front_matter.is_some(),
            links = changelog.links.len(),
            "parsed changelog"
        );

        changelog
    }

    fn version_token<'a>(&self, line: &'a str) -> Option<&'a str> {
        ChangelogConfig::header_token(&self.header, line)
    }

    /// `### Name`, or a configured group name on its own unindented line,
    /// plain or emphasized
    fn group_heading<'a>(&self, line: &'a str) -> Option<&'a str> {
        if let Some(rest) = line.strip_prefix("###") {
            if rest.starts_with('#') {
                return None;
            }
            let name = rest.trim();
            return (!name.is_empty()).then_some(name);
        }

        if line.starts_with(char::is_whitespace) {
            return None;
        }

        let name = ["**", "__"]
            .iter()
            .find_map(|&marker| line.strip_prefix(marker)?.strip_suffix(marker))
            .unwrap_or(line)
            .trim();

        self.config.is_known_group(name).then_some(name)
    }

    fn item_text<'a>(&self, line: &'a str) -> Option<&'a str> {
        let rest = line.strip_prefix(self.config.item_prefix.as_str())?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        Some(rest.trim())
    }
}

/// markdown link reference definition, e.g. `[1.0.0]: https://…`
fn is_link_definition(line: &str) -> bool {
    line.strip_prefix('[')
        .and_then(|rest| rest.split_once("]:"))
        .is_some_and(|(label, target)| {
            !label.is_empty() && !label.contains(']') && !target.trim().is_empty()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn parse(content: &str) -> Changelog {
        parse_changelog_str(content, &ChangelogConfig::default()).unwrap()
    }

    #[test]
    fn test_parse_keep_a_changelog() {
        let changelog = parse(
            "# Changelog\n\
             All notable changes to this project.\n\
             \n\
             ## [Unreleased]\n\
             \n\
             ### Added\n\
             - new flag\n\
             \n\
             ## [1.1.0] - 2024-03-01\n\
             \n\
             ### Fixed\n\
             - crash on empty input\n\
             - wrong exit code\n\
             \n\
             ## [1.0.0] - 2024-01-01\n\
             \n\
             ### Added\n\
             - initial release\n",
        );

        assert_eq!(
            changelog.front_matter.as_deref(),
            Some("# Changelog\nAll notable changes to this project.")
        );

        let unreleased = changelog.unreleased.as_ref().unwrap();
        assert!(unreleased.is_unreleased);
        assert_eq!(unreleased.items("Added"), ["new flag"]);

        assert_eq!(changelog.versions.len(), 2);
        assert_eq!(changelog.versions[0].label, "1.1.0");
        assert_eq!(
            changelog.versions[0].header_line.as_deref(),
            Some("## [1.1.0] - 2024-03-01")
        );
        assert_eq!(
            changelog.versions[0].items("Fixed"),
            ["crash on empty input", "wrong exit code"]
        );
        assert_eq!(changelog.versions[1].items("Added"), ["initial release"]);
    }

    #[test]
    fn test_unreleased_term_is_case_insensitive() {
        let changelog = parse("## [unreleased]\n### Added\n- foo\n");
        assert!(changelog.unreleased.is_some());
        assert!(changelog.versions.is_empty());
    }

    #[test]
    fn test_items_before_group_are_dropped() {
        let changelog = parse("## [1.0.0]\n- orphan\n### Added\n- kept\n");
        let version = changelog.get_version("1.0.0").unwrap();
        assert_eq!(version.groups.len(), 1);
        assert_eq!(version.items("Added"), ["kept"]);
    }

    #[test]
    fn test_unknown_groups_are_kept_after_known_ones() {
        let changelog = parse("## [1.0.0]\n### Internal\n- refactor\n### Fixed\n- bug\n### Added\n- feature\n");
        let names: Vec<_> = changelog.versions[0]
            .groups
            .iter()
            .map(|g| g.name.as_str())
            .collect();
        assert_eq!(names, ["Added", "Fixed", "Internal"]);
    }

    #[test]
    fn test_empty_groups_are_present() {
        let changelog = parse("## [Unreleased]\n### Added\n\n### Fixed\n");
        let unreleased = changelog.unreleased.unwrap();
        assert_eq!(unreleased.groups.len(), 2);
        assert!(unreleased.is_empty());
    }

    #[test]
    fn test_emphasized_group_heading() {
        let changelog = parse("## [1.0.0]\n**Fixed**\n- bug\n**Not a group**\n- still fixed\n");
        let version = &changelog.versions[0];
        assert_eq!(version.groups.len(), 1);
        assert_eq!(version.items("Fixed"), ["bug", "still fixed"]);
    }

    #[test]
    fn test_continuation_lines() {
        let changelog = parse("## [1.0.0]\n### Added\n- parent\n  - nested\n  wrapped text\n\n  detached\n- next\n");
        assert_eq!(
            changelog.versions[0].items("Added"),
            ["parent\n  - nested\n  wrapped text", "next"]
        );
    }

    #[test]
    fn test_indented_group_name_continues_item() {
        let changelog = parse("## [1.0.0]\n### Added\n- parent\n  Fixed\n  **Removed**\n- next\n");
        let version = &changelog.versions[0];
        assert_eq!(version.groups.len(), 1);
        assert_eq!(
            version.items("Added"),
            ["parent\n  Fixed\n  **Removed**", "next"]
        );
    }

    #[test]
    fn test_link_definitions_are_kept() {
        let changelog = parse(
            "## [Unreleased]\n\
             ### Added\n\
             - new\n\
             \n\
             ## [1.0.0]\n\
             ### Added\n\
             - first\n\
             \n\
             [Unreleased]: https://example.com/compare/v1.0.0...HEAD\n\
             [1.0.0]: https://example.com/releases/v1.0.0\n\
             [not a link]\n",
        );

        assert_eq!(
            changelog.links,
            [
                "[Unreleased]: https://example.com/compare/v1.0.0...HEAD",
                "[1.0.0]: https://example.com/releases/v1.0.0",
            ]
        );
        assert_eq!(changelog.versions[0].items("Added"), ["first"]);
    }

    #[test]
    fn test_custom_item_prefix() {
        let config = ChangelogConfig::new().item_prefix("*");
        let changelog =
            parse_changelog_str("## [1.0.0]\n### Added\n* star\n- dash\n*bold*\n", &config)
                .unwrap();
        assert_eq!(changelog.versions[0].items("Added"), ["star"]);
    }

    #[test]
    fn test_custom_header_pattern() {
        let config = ChangelogConfig::new()
            .header_pattern(r"^## Release (\S+)")
            .unwrap()
            .unreleased_term("Next");
        let changelog = parse_changelog_str(
            "## Release Next\n### Added\n- a\n## Release 2.0\n### Removed\n- b\n## [1.0.0]\n### Added\n- c\n",
            &config,
        )
        .unwrap();

        assert!(changelog.unreleased.is_some());
        assert_eq!(changelog.versions.len(), 1);
        // "## [1.0.0]" does not match the custom pattern, so its lines belong to 2.0
        assert_eq!(changelog.versions[0].label, "2.0");
        assert_eq!(changelog.versions[0].items("Added"), ["c"]);
    }

    #[test]
    fn test_no_headers_is_all_front_matter() {
        let changelog = parse("just some notes\n- not an item\n");
        assert!(changelog.unreleased.is_none());
        assert!(changelog.versions.is_empty());
        assert_eq!(
            changelog.front_matter.as_deref(),
            Some("just some notes\n- not an item")
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n  \n").is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let changelog = parse("## [1.0.0]\r\n### Added\r\n- windows\r\n");
        assert_eq!(changelog.versions[0].items("Added"), ["windows"]);
        assert_eq!(changelog.versions[0].header_line.as_deref(), Some("## [1.0.0]"));
    }

    #[test]
    #[traced_test]
    fn test_duplicate_unreleased_is_merged() {
        let changelog = parse("## [Unreleased]\n### Added\n- a\n## [Unreleased]\n### Added\n- b\n");
        assert_eq!(changelog.unreleased.unwrap().items("Added"), ["a", "b"]);
        assert!(logs_contain("merging duplicate unreleased section"));
    }

    #[test]
    fn test_parse_changelog_missing_file() {
        let result = parse_changelog("/nonexistent/CHANGELOG.md", &ChangelogConfig::default());
        assert!(matches!(result, Err(Error::FileReadError { .. })));
    }
}
