// changelog markdown renderer

use super::config::ChangelogConfig;
use super::types::{Changelog, ChangelogGroup, ChangelogVersion};

/// render a whole changelog.
///
/// front matter, sections and the link definitions are separated by one
/// blank line and the output ends with a single newline. An empty changelog
/// renders as "".
pub fn render_changelog(changelog: &Changelog, config: &ChangelogConfig) -> String {
    let mut blocks: Vec<String> = Vec::new();

    if let Some(front_matter) = &changelog.front_matter {
        blocks.push(front_matter.clone());
    }

    blocks.extend(
        changelog
            .entries()
            .map(|version_section| render_version(version_section, config, true)),
    );

    if !changelog.links.is_empty() {
        blocks.push(changelog.links.join("\n"));
    }

    if blocks.is_empty() {
        return String::new();
    }

    let mut output = blocks.join("\n\n");
    output.push('\n');
    output
}

/// render one version section, optionally without its header line
pub fn render_version(
    version_section: &ChangelogVersion,
    config: &ChangelogConfig,
    with_header: bool,
) -> String {
    let mut blocks: Vec<String> = Vec::new();

    if with_header {
        blocks.push(header_line(version_section, config));
    }

    let mut groups: Vec<&ChangelogGroup> = version_section.groups.iter().collect();
    groups.sort_by_key(|g| config.group_rank(&g.name));

    for group in groups {
        let mut block = format!("### {}", group.name);
        for item in &group.items {
            block.push('\n');
            block.push_str(&config.item_prefix);
            block.push(' ');
            block.push_str(item);
        }
        blocks.push(block);
    }

    blocks.join("\n\n")
}

/// header line of a section; sections read from a file keep their original line
pub fn header_line(version_section: &ChangelogVersion, config: &ChangelogConfig) -> String {
    if let Some(line) = &version_section.header_line {
        return line.clone();
    }

    if version_section.is_unreleased {
        format!("## {}", config.unreleased_term.trim())
    } else {
        format!("## {}", config.header_template.apply(&version_section.label))
    }
}
